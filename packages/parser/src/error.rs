use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("input document is empty")]
    EmptyInput,

    #[error("no recognizable chart configuration in document")]
    NoChartConfig,

    #[error("unbalanced configuration literal starting at {pos}")]
    UnbalancedLiteral { pos: usize },

    #[error("reference to '{name}' at {pos} is not allowed in a configuration literal")]
    DisallowedReference { name: String, pos: usize },

    #[error("unexpected token at {pos}: expected {expected}, found {found}")]
    UnexpectedToken {
        pos: usize,
        expected: String,
        found: String,
    },

    #[error("unexpected end of configuration literal at {pos}")]
    UnexpectedEof { pos: usize },

    #[error("unreadable character at {pos}")]
    LexerError { pos: usize },
}

impl ParseError {
    pub fn unexpected_token(
        pos: usize,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::UnexpectedToken {
            pos,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unexpected_eof(pos: usize) -> Self {
        Self::UnexpectedEof { pos }
    }

    pub fn disallowed_reference(name: impl Into<String>, pos: usize) -> Self {
        Self::DisallowedReference {
            name: name.into(),
            pos,
        }
    }
}
