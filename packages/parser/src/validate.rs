use serde::{Deserialize, Serialize};

use crate::ast::ConfigValue;

/// Series types the engine understands, across both dialects.
pub const RECOGNIZED_TYPES: &[&str] = &[
    "line",
    "bar",
    "pie",
    "scatter",
    "effectScatter",
    "radar",
    "tree",
    "treemap",
    "sunburst",
    "boxplot",
    "candlestick",
    "heatmap",
    "funnel",
    "gauge",
    "sankey",
    "graph",
    "pictorialBar",
    "themeRiver",
    // Chart.js kinds
    "doughnut",
    "polarArea",
    "bubble",
];

pub fn is_recognized_type(kind: &str) -> bool {
    RECOGNIZED_TYPES.contains(&kind)
}

/// Structural well-formedness verdict. Never an error: invalid input yields
/// `valid: false` plus at least one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Check a configuration for structural completeness: a mapping with a
/// non-empty series container whose entries are mappings, each carrying a
/// recognized type and a sequence-valued data field.
pub fn validate(config: &ConfigValue) -> Validation {
    let mut errors = Vec::new();

    if config.as_mapping().is_none() {
        return Validation {
            valid: false,
            errors: vec!["configuration must be a mapping".to_string()],
        };
    }

    match config.series_entries() {
        Some(entries) if !entries.is_empty() => {
            let top_kind = config.get("type").and_then(ConfigValue::as_str);
            for (index, entry) in entries.iter().enumerate() {
                if entry.as_mapping().is_none() {
                    errors.push(format!("series {index} must be a mapping"));
                    continue;
                }
                match entry.get("type").and_then(ConfigValue::as_str).or(top_kind) {
                    None => errors.push(format!("series {index} is missing a type")),
                    Some(kind) if !is_recognized_type(kind) => {
                        errors.push(format!("series {index} has unrecognized type '{kind}'"))
                    }
                    Some(_) => {}
                }
                if entry
                    .get("data")
                    .and_then(ConfigValue::as_sequence)
                    .is_none()
                {
                    errors.push(format!("series {index} is missing a data sequence"));
                }
            }
        }
        _ => errors.push("configuration must contain at least one series".to_string()),
    }

    Validation {
        valid: errors.is_empty(),
        errors,
    }
}
