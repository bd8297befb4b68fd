pub mod ast;
pub mod error;
pub mod extract;
pub mod generate;
pub mod parser;
pub mod series;
pub mod theme;
pub mod tokenizer;
pub mod validate;

#[cfg(test)]
mod tests_roundtrip;

pub use ast::{ConfigMap, ConfigValue, Scalar};
pub use error::{ParseError, ParseResult};
pub use extract::{detect_dialect, extract, ChartDialect, Extraction};
pub use generate::{generate_canonical, generate_patch, write_literal};
pub use parser::{parse_document, parse_literal, LiteralParser, ParsedChart};
pub use series::{extract_series, SeriesInfo, DEFAULT_SERIES_COLOR};
pub use theme::{extract_theme, Theme};
pub use validate::{is_recognized_type, validate, Validation};
