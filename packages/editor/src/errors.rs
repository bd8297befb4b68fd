//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditError {
    #[error("parse error: {0}")]
    Parse(#[from] chartpatch_parser::ParseError),

    #[error("edited configuration failed validation: {0}")]
    Validation(String),
}
