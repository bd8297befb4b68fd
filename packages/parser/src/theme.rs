use serde::{Deserialize, Serialize};

use crate::ast::ConfigValue;
use crate::extract::find_ci;

pub const DEFAULT_BACKGROUND_COLOR: &str = "#ffffff";
pub const DEFAULT_TEXT_COLOR: &str = "#333333";
pub const DEFAULT_GRID_COLOR: &str = "#e0e0e0";

/// Derived visual-styling summary of a chart document. Recomputed after
/// every successful edit; never a source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub background_color: String,
    pub text_color: String,
    pub grid_color: String,
    pub color_palette: Vec<String>,
    /// Stylesheet carried over verbatim from the source document.
    pub custom_css: Option<String>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            text_color: DEFAULT_TEXT_COLOR.to_string(),
            grid_color: DEFAULT_GRID_COLOR.to_string(),
            color_palette: Vec::new(),
            custom_css: None,
        }
    }
}

/// Project the theme out of a configuration and its source document.
///
/// Precedence per field: explicit configuration value, else the documented
/// default. The palette falls back to colors collected from each series'
/// explicit style color, in series order; series without an explicit color
/// are skipped, not defaulted.
pub fn extract_theme(source: &str, config: &ConfigValue) -> Theme {
    let mut theme = Theme::default();

    if let Some(background) = config.get("backgroundColor").and_then(ConfigValue::as_str) {
        theme.background_color = background.to_string();
    }
    if let Some(text) = config
        .get_path(&["textStyle", "color"])
        .and_then(ConfigValue::as_str)
    {
        theme.text_color = text.to_string();
    }
    if let Some(grid) = config
        .get_path(&["grid", "borderColor"])
        .and_then(ConfigValue::as_str)
    {
        theme.grid_color = grid.to_string();
    }

    if let Some(palette) = config.get("color").and_then(ConfigValue::as_sequence) {
        theme.color_palette = palette
            .iter()
            .filter_map(ConfigValue::as_str)
            .map(str::to_string)
            .collect();
    } else if let Some(entries) = config.series_entries() {
        theme.color_palette = entries
            .iter()
            .filter_map(series_style_color)
            .map(str::to_string)
            .collect();
    }

    theme.custom_css = stylesheet(source);
    theme
}

fn series_style_color(entry: &ConfigValue) -> Option<&str> {
    entry
        .get_path(&["itemStyle", "color"])
        .or_else(|| entry.get_path(&["lineStyle", "color"]))
        .and_then(ConfigValue::as_str)
}

/// The first `<style>` block of the document, trimmed.
fn stylesheet(source: &str) -> Option<String> {
    let open = find_ci(source, "<style", 0)?;
    let tag_end = source[open..].find('>')?;
    let content_start = open + tag_end + 1;
    let close = find_ci(source, "</style", content_start)?;
    let css = source[content_start..close].trim();
    (!css.is_empty()).then(|| css.to_string())
}
