use logos::Logos;
use std::ops::Range;

use crate::error::{ParseError, ParseResult};

/// Lexical grammar of a configuration literal.
///
/// This is the constrained data-literal subset of the scripting language the
/// two dialects are written in: structural punctuation, strings in either
/// quote style, numbers, booleans, null, and bare identifiers. Identifiers are
/// legal as mapping keys; in value position the parser rejects them (except
/// the single documented companion-data substitution).
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*[^*]*\*+([^/*][^*]*\*+)*/")]
pub enum Token<'src> {
    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token("true")]
    True,

    #[token("false")]
    False,

    #[token("null")]
    Null,

    #[regex(r"-?(?:0|[1-9][0-9]*)(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[regex(r#""(?:[^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    #[regex(r#"'(?:[^'\\]|\\.)*'"#, |lex| unescape(lex.slice()))]
    Str(String),

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*", |lex| lex.slice())]
    Ident(&'src str),
}

impl<'src> Token<'src> {
    /// Short description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::LBracket => "'['".to_string(),
            Token::RBracket => "']'".to_string(),
            Token::Colon => "':'".to_string(),
            Token::Comma => "','".to_string(),
            Token::True => "'true'".to_string(),
            Token::False => "'false'".to_string(),
            Token::Null => "'null'".to_string(),
            Token::Number(n) => format!("number {n}"),
            Token::Str(_) => "string".to_string(),
            Token::Ident(name) => format!("identifier '{name}'"),
        }
    }
}

/// Tokenize a literal; the first unreadable character is a hard error.
pub fn tokenize(source: &str) -> ParseResult<Vec<(Token<'_>, Range<usize>)>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);
    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => {
                return Err(ParseError::LexerError {
                    pos: lexer.span().start,
                })
            }
        }
    }
    Ok(tokens)
}

/// Decode a quoted string slice, including its quotes.
fn unescape(slice: &str) -> Option<String> {
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000C}'),
            'v' => out.push('\u{000B}'),
            '0' => out.push('\0'),
            'u' => {
                let high = read_hex4(&mut chars)?;
                let code = if (0xD800..=0xDBFF).contains(&high) {
                    // Surrogate pair: expect an immediately following \uXXXX.
                    if chars.next()? != '\\' || chars.next()? != 'u' {
                        return None;
                    }
                    let low = read_hex4(&mut chars)?;
                    0x10000 + ((high - 0xD800) << 10) + (low.checked_sub(0xDC00)?)
                } else {
                    high
                };
                out.push(char::from_u32(code)?);
            }
            'x' => {
                let hi = chars.next()?.to_digit(16)?;
                let lo = chars.next()?.to_digit(16)?;
                out.push(char::from_u32(hi * 16 + lo)?);
            }
            '\n' => {} // line continuation
            other => out.push(other),
        }
    }
    Some(out)
}

fn read_hex4(chars: &mut std::str::Chars<'_>) -> Option<u32> {
    let mut value = 0;
    for _ in 0..4 {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_literal_punctuation_and_scalars() {
        let tokens = tokenize(r#"{ legend: { show: true }, count: -3.5 }"#).unwrap();
        let kinds: Vec<_> = tokens.into_iter().map(|(t, _)| t).collect();
        assert!(kinds.contains(&Token::Ident("legend")));
        assert!(kinds.contains(&Token::True));
        assert!(kinds.contains(&Token::Number(-3.5)));
    }

    #[test]
    fn both_quote_styles_decode_escapes() {
        let tokens = tokenize(r#"'a\'b' "c\nd" "中""#).unwrap();
        let strings: Vec<_> = tokens
            .into_iter()
            .filter_map(|(t, _)| match t {
                Token::Str(s) => Some(s),
                _ => None,
            })
            .collect();
        assert_eq!(strings, vec!["a'b".to_string(), "c\nd".to_string(), "中".to_string()]);
    }

    #[test]
    fn comments_are_skipped() {
        let tokens = tokenize("{ // trailing\n /* block */ }").unwrap();
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn unreadable_character_is_an_error() {
        let err = tokenize("{ @ }").unwrap_err();
        assert_eq!(err, ParseError::LexerError { pos: 2 });
    }
}
