use std::ops::Range;

use crate::ast::{ConfigMap, ConfigValue, Scalar};
use crate::error::{ParseError, ParseResult};
use crate::extract::{extract, ChartDialect};
use crate::tokenizer::{tokenize, Token};

/// A located and parsed chart configuration.
///
/// Spans are absolute byte ranges into the source document; patch-mode
/// regeneration splices new literal text over them and leaves every other
/// byte alone.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedChart {
    pub dialect: ChartDialect,
    /// The code region the configuration was found in.
    pub region: Range<usize>,
    /// The configuration object literal.
    pub config_span: Range<usize>,
    /// The companion `data = {...}` literal (Chart.js), when present.
    pub data_span: Option<Range<usize>>,
    pub config: ConfigValue,
}

/// Locate and parse the chart configuration embedded in a document.
pub fn parse_document(source: &str) -> ParseResult<ParsedChart> {
    let extraction = extract(source)?;
    let code = &source[extraction.region.clone()];
    let base = extraction.region.start;

    match extraction.dialect {
        ChartDialect::ChartJs => {
            // A companion `data = {...}` binding earlier in the region may be
            // referenced by name inside the configuration literal; it is the
            // single reference the literal grammar admits.
            let data = match find_binding(code, "data") {
                Some(open) => {
                    let span = balanced_object(code, open)?;
                    let value = LiteralParser::new(&code[span.clone()])?.parse()?;
                    Some((span, value))
                }
                None => None,
            };

            let open = find_binding(code, "config").ok_or(ParseError::NoChartConfig)?;
            let span = balanced_object(code, open)?;
            let mut parser = LiteralParser::new(&code[span.clone()])?;
            if let Some((_, value)) = &data {
                parser = parser.with_companion("data", value);
            }
            let config = parser.parse()?;

            Ok(ParsedChart {
                dialect: extraction.dialect,
                region: extraction.region,
                config_span: base + span.start..base + span.end,
                data_span: data.map(|(s, _)| base + s.start..base + s.end),
                config,
            })
        }
        ChartDialect::ECharts | ChartDialect::Unknown => {
            let open = find_binding(code, "option")
                .or_else(|| find_call_argument(code, "setOption"))
                .ok_or(ParseError::NoChartConfig)?;
            let span = balanced_object(code, open)?;
            let config = LiteralParser::new(&code[span.clone()])?.parse()?;

            Ok(ParsedChart {
                dialect: extraction.dialect,
                region: extraction.region,
                config_span: base + span.start..base + span.end,
                data_span: None,
                config,
            })
        }
    }
}

/// Parse a standalone configuration literal.
pub fn parse_literal(source: &str) -> ParseResult<ConfigValue> {
    LiteralParser::new(source)?.parse()
}

/// Recursive-descent parser over the constrained data-literal grammar.
///
/// Objects, arrays, strings, numbers, booleans and null only. Identifiers in
/// value position are rejected — the literal is never evaluated — with one
/// documented exception: the companion binding substituted by name.
pub struct LiteralParser<'src, 'data> {
    tokens: Vec<(Token<'src>, Range<usize>)>,
    pos: usize,
    source_len: usize,
    companion: Option<(&'data str, &'data ConfigValue)>,
}

impl<'src, 'data> LiteralParser<'src, 'data> {
    pub fn new(source: &'src str) -> ParseResult<Self> {
        Ok(Self {
            tokens: tokenize(source)?,
            pos: 0,
            source_len: source.len(),
            companion: None,
        })
    }

    pub fn with_companion(mut self, name: &'data str, value: &'data ConfigValue) -> Self {
        self.companion = Some((name, value));
        self
    }

    pub fn parse(mut self) -> ParseResult<ConfigValue> {
        let value = self.parse_value()?;
        if let Some((token, span)) = self.tokens.get(self.pos) {
            return Err(ParseError::unexpected_token(
                span.start,
                "end of literal",
                token.describe(),
            ));
        }
        Ok(value)
    }

    fn parse_value(&mut self) -> ParseResult<ConfigValue> {
        let (token, span) = match self.tokens.get(self.pos) {
            Some(entry) => entry.clone(),
            None => return Err(ParseError::unexpected_eof(self.source_len)),
        };

        match token {
            Token::LBrace => self.parse_mapping(),
            Token::LBracket => self.parse_sequence(),
            Token::Str(s) => {
                self.pos += 1;
                Ok(ConfigValue::Scalar(Scalar::Str(s)))
            }
            Token::Number(n) => {
                self.pos += 1;
                Ok(ConfigValue::Scalar(Scalar::Num(n)))
            }
            Token::True => {
                self.pos += 1;
                Ok(ConfigValue::Scalar(Scalar::Bool(true)))
            }
            Token::False => {
                self.pos += 1;
                Ok(ConfigValue::Scalar(Scalar::Bool(false)))
            }
            Token::Null => {
                self.pos += 1;
                Ok(ConfigValue::Scalar(Scalar::Null))
            }
            Token::Ident(name) => {
                if let Some((companion, value)) = self.companion {
                    if name == companion {
                        self.pos += 1;
                        return Ok(value.clone());
                    }
                }
                Err(ParseError::disallowed_reference(name, span.start))
            }
            other => Err(ParseError::unexpected_token(
                span.start,
                "a value",
                other.describe(),
            )),
        }
    }

    fn parse_mapping(&mut self) -> ParseResult<ConfigValue> {
        self.expect(Token::LBrace)?;
        let mut map = ConfigMap::new();
        loop {
            if self.check(&Token::RBrace) {
                break;
            }
            let key = self.parse_key()?;
            self.expect(Token::Colon)?;
            let value = self.parse_value()?;
            // Duplicate keys: last one wins, matching the source semantics.
            map.insert(key, value);
            if !self.match_token(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBrace)?;
        Ok(ConfigValue::Mapping(map))
    }

    fn parse_sequence(&mut self) -> ParseResult<ConfigValue> {
        self.expect(Token::LBracket)?;
        let mut items = Vec::new();
        loop {
            if self.check(&Token::RBracket) {
                break;
            }
            items.push(self.parse_value()?);
            if !self.match_token(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBracket)?;
        Ok(ConfigValue::Sequence(items))
    }

    fn parse_key(&mut self) -> ParseResult<String> {
        let (token, span) = match self.tokens.get(self.pos) {
            Some(entry) => entry.clone(),
            None => return Err(ParseError::unexpected_eof(self.source_len)),
        };
        match token {
            Token::Str(s) => {
                self.pos += 1;
                Ok(s)
            }
            Token::Ident(name) => {
                self.pos += 1;
                Ok(name.to_string())
            }
            Token::Number(n) => {
                self.pos += 1;
                Ok(crate::generate::format_number(n))
            }
            other => Err(ParseError::unexpected_token(
                span.start,
                "a mapping key",
                other.describe(),
            )),
        }
    }

    fn check(&self, expected: &Token<'_>) -> bool {
        matches!(self.tokens.get(self.pos), Some((token, _)) if token == expected)
    }

    fn match_token(&mut self, expected: &Token<'_>) -> bool {
        if self.check(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token<'static>) -> ParseResult<()> {
        if self.match_token(&expected) {
            return Ok(());
        }
        let (found, pos) = match self.tokens.get(self.pos) {
            Some((token, span)) => (token.describe(), span.start),
            None => ("end of literal".to_string(), self.source_len),
        };
        Err(ParseError::unexpected_token(pos, expected.describe(), found))
    }
}

/// Offset of the `{` opening the literal bound as `name = {...}`, scanning
/// only code outside strings and comments. Property assignments
/// (`thing.name = ...`) and comparisons (`name == ...`) do not count.
pub(crate) fn find_binding(code: &str, name: &str) -> Option<usize> {
    let bytes = code.as_bytes();
    scan_outside_literals(code, |i| {
        if !code[i..].starts_with(name) {
            return None;
        }
        if i > 0 && (is_ident_byte(bytes[i - 1]) || bytes[i - 1] == b'.') {
            return None;
        }
        let after = i + name.len();
        if after < bytes.len() && is_ident_byte(bytes[after]) {
            return None;
        }
        let mut j = skip_ws(bytes, after);
        if j >= bytes.len() || bytes[j] != b'=' {
            return None;
        }
        if j + 1 < bytes.len() && bytes[j + 1] == b'=' {
            return None;
        }
        j = skip_ws(bytes, j + 1);
        (j < bytes.len() && bytes[j] == b'{').then_some(j)
    })
}

/// Offset of the `{` passed as the first argument of `name(...)`.
pub(crate) fn find_call_argument(code: &str, name: &str) -> Option<usize> {
    let bytes = code.as_bytes();
    scan_outside_literals(code, |i| {
        if !code[i..].starts_with(name) {
            return None;
        }
        if i > 0 && is_ident_byte(bytes[i - 1]) {
            return None;
        }
        let after = i + name.len();
        if after < bytes.len() && is_ident_byte(bytes[after]) {
            return None;
        }
        let mut j = skip_ws(bytes, after);
        if j >= bytes.len() || bytes[j] != b'(' {
            return None;
        }
        j = skip_ws(bytes, j + 1);
        (j < bytes.len() && bytes[j] == b'{').then_some(j)
    })
}

/// Range of the balanced `{...}` starting at `open`, skipping braces inside
/// strings and comments.
pub(crate) fn balanced_object(code: &str, open: usize) -> ParseResult<Range<usize>> {
    let bytes = code.as_bytes();
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'"' | b'\'' | b'`') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                    i += 1;
                }
                i += 1;
            }
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(open..i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }
    Err(ParseError::UnbalancedLiteral { pos: open })
}

/// Walk `code`, invoking `visit` at every byte offset that lies outside
/// string literals and comments; the first `Some` claims the match.
fn scan_outside_literals<T>(code: &str, mut visit: impl FnMut(usize) -> Option<T>) -> Option<T> {
    let bytes = code.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'"' | b'\'' | b'`') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                i += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                    i += 1;
                }
                i += 2;
            }
            _ => {
                if let Some(found) = visit(i) {
                    return Some(found);
                }
                i += 1;
            }
        }
    }
    None
}

fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$'
}

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}
