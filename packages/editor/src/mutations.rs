//! # Edit Catalog
//!
//! The deterministic edits a chart configuration supports.
//!
//! ## Design Principles
//!
//! 1. **Pure on the tree**: every edit is a plain transform over the
//!    configuration value; document text is only touched by the explicitly
//!    text-level edits (size, heading).
//! 2. **Dialect-aware**: the same intent maps onto the option shape
//!    (ECharts) or the dataset shape (Chart.js).
//! 3. **No partial artifacts**: an edit either fully applies or the engine
//!    returns the original document untouched.

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

use chartpatch_parser::{ChartDialect, ConfigValue};

/// Independent visibility toggles. Unset flags leave current state unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    pub show_data_label: Option<bool>,
    pub show_legend: Option<bool>,
    pub show_grid: Option<bool>,
    pub show_tooltip: Option<bool>,
}

/// Container dimensions in pixels. Size belongs to layout, not data, so this
/// edit rewrites the document's styling region rather than the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// One catalog edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Edit {
    ChangeColor { color: String },
    ChangeType { kind: String },
    ChangeDisplay { options: DisplayOptions },
    ChangeSize { size: SizeOptions },
    ChangeTitle { title: String, subtitle: Option<String> },
}

impl Edit {
    /// Apply the tree-level part of this edit.
    pub fn apply_config(&self, config: &mut ConfigValue, dialect: ChartDialect) {
        match self {
            Edit::ChangeColor { color } => apply_color(config, dialect, color),
            Edit::ChangeType { kind } => apply_type(config, dialect, kind),
            Edit::ChangeDisplay { options } => apply_display(config, dialect, options),
            Edit::ChangeTitle { title, subtitle } => {
                apply_title(config, dialect, title, subtitle.as_deref())
            }
            Edit::ChangeSize { .. } => {}
        }
    }

    /// Apply the text-level part of this edit.
    pub fn apply_text(&self, document: &str) -> String {
        match self {
            Edit::ChangeSize { size } => {
                let mut out = document.to_string();
                if let Some(width) = size.width {
                    out = width_pattern()
                        .replace_all(&out, NoExpand(&format!("width: {width}px")))
                        .into_owned();
                }
                if let Some(height) = size.height {
                    out = height_pattern()
                        .replace_all(&out, NoExpand(&format!("height: {height}px")))
                        .into_owned();
                }
                out
            }
            Edit::ChangeTitle { title, .. } if !title.is_empty() => heading_pattern()
                .replace(document, NoExpand(&format!("<h1>{title}</h1>")))
                .into_owned(),
            _ => document.to_string(),
        }
    }
}

fn apply_color(config: &mut ConfigValue, dialect: ChartDialect, color: &str) {
    match dialect {
        ChartDialect::ChartJs => {
            let fill = translucent_fill(color);
            if let Some(datasets) = config
                .get_mut("data")
                .and_then(|data| data.get_mut("datasets"))
                .and_then(ConfigValue::as_sequence_mut)
            {
                for dataset in datasets {
                    dataset.set("borderColor", ConfigValue::from(color));
                    dataset.set("backgroundColor", ConfigValue::from(fill.clone()));
                    if dataset.get("pointBackgroundColor").is_some() {
                        dataset.set("pointBackgroundColor", ConfigValue::from(color));
                    }
                }
            }
        }
        _ => {
            config.set(
                "color",
                ConfigValue::Sequence(vec![ConfigValue::from(color)]),
            );
            if let Some(series) = config
                .get_mut("series")
                .and_then(ConfigValue::as_sequence_mut)
            {
                for entry in series {
                    if let Some(style) = entry.ensure_mapping("itemStyle") {
                        style.set("color", ConfigValue::from(color));
                    }
                }
            }
        }
    }
}

fn apply_type(config: &mut ConfigValue, dialect: ChartDialect, kind: &str) {
    match dialect {
        ChartDialect::ChartJs => {
            config.set("type", ConfigValue::from(kind));
        }
        _ => {
            if let Some(series) = config
                .get_mut("series")
                .and_then(ConfigValue::as_sequence_mut)
            {
                for entry in series {
                    entry.set("type", ConfigValue::from(kind));
                    if kind == "line" {
                        entry.set("smooth", ConfigValue::from(true));
                    } else {
                        entry.remove("smooth");
                    }
                    if kind == "pie" {
                        entry.set(
                            "radius",
                            ConfigValue::Sequence(vec![
                                ConfigValue::from("40%"),
                                ConfigValue::from("70%"),
                            ]),
                        );
                        entry.set(
                            "center",
                            ConfigValue::Sequence(vec![
                                ConfigValue::from("50%"),
                                ConfigValue::from("50%"),
                            ]),
                        );
                    } else {
                        entry.remove("radius");
                        entry.remove("center");
                    }
                }
            }
        }
    }
}

fn apply_display(config: &mut ConfigValue, dialect: ChartDialect, options: &DisplayOptions) {
    match dialect {
        ChartDialect::ChartJs => {
            if options.show_data_label.is_some() {
                debug!("data labels are not supported for the dataset dialect; flag ignored");
            }
            if let Some(show) = options.show_legend {
                if let Some(legend) = config
                    .ensure_mapping("options")
                    .and_then(|o| o.ensure_mapping("plugins"))
                    .and_then(|p| p.ensure_mapping("legend"))
                {
                    legend.set("display", ConfigValue::from(show));
                }
            }
            if let Some(show) = options.show_grid {
                for axis in ["x", "y"] {
                    if let Some(grid) = config
                        .ensure_mapping("options")
                        .and_then(|o| o.ensure_mapping("scales"))
                        .and_then(|s| s.ensure_mapping(axis))
                        .and_then(|a| a.ensure_mapping("grid"))
                    {
                        grid.set("display", ConfigValue::from(show));
                    }
                }
            }
            if let Some(show) = options.show_tooltip {
                if let Some(tooltip) = config
                    .ensure_mapping("options")
                    .and_then(|o| o.ensure_mapping("plugins"))
                    .and_then(|p| p.ensure_mapping("tooltip"))
                {
                    tooltip.set("enabled", ConfigValue::from(show));
                }
            }
        }
        _ => {
            if let Some(show) = options.show_data_label {
                if let Some(series) = config
                    .get_mut("series")
                    .and_then(ConfigValue::as_sequence_mut)
                {
                    for entry in series {
                        if let Some(label) = entry.ensure_mapping("label") {
                            label.set("show", ConfigValue::from(show));
                        }
                    }
                }
            }
            if let Some(show) = options.show_legend {
                if let Some(legend) = config.ensure_mapping("legend") {
                    legend.set("show", ConfigValue::from(show));
                }
            }
            if let Some(show) = options.show_grid {
                if let Some(grid) = config.ensure_mapping("grid") {
                    grid.set("show", ConfigValue::from(show));
                }
            }
            if let Some(show) = options.show_tooltip {
                if let Some(tooltip) = config.ensure_mapping("tooltip") {
                    tooltip.set("show", ConfigValue::from(show));
                }
            }
        }
    }
}

fn apply_title(config: &mut ConfigValue, dialect: ChartDialect, title: &str, subtitle: Option<&str>) {
    // The dataset dialect keeps its title in markup only; the heading rewrite
    // in `apply_text` covers it.
    if dialect == ChartDialect::ChartJs {
        return;
    }
    if let Some(title_map) = config.ensure_mapping("title") {
        title_map.set("text", ConfigValue::from(title));
        if let Some(subtitle) = subtitle {
            title_map.set("subtext", ConfigValue::from(subtitle));
        }
    }
}

/// Semi-transparent companion fill derived from a line color.
pub(crate) fn translucent_fill(color: &str) -> String {
    if let Some(hex) = color.strip_prefix('#') {
        if hex.len() >= 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return format!("rgba({r}, {g}, {b}, 0.2)");
            }
        }
    }
    if color.starts_with("rgb(") {
        return color.replacen("rgb", "rgba", 1).replacen(')', ", 0.2)", 1);
    }
    color.to_string()
}

fn width_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"width:\s*\d+px").expect("width pattern"))
}

fn height_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"height:\s*\d+px").expect("height pattern"))
}

fn heading_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<h1[^>]*>.*?</h1>").expect("heading pattern"))
}
