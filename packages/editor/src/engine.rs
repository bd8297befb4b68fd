//! # Modification Engine
//!
//! Fail-soft application of catalog edits to a whole document: parse, edit
//! the tree, validate, regenerate in patch mode, re-check. Any failure along
//! the way returns the input document byte-identical — the engine never
//! raises and never yields a partially-mutated artifact.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use chartpatch_parser::{
    generate_patch, parse_document, validate, ChartDialect, ConfigValue,
};

use crate::mutations::{DisplayOptions, Edit, SizeOptions};

/// Title payload of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleOptions {
    pub title: String,
    pub subtitle: Option<String>,
}

/// A set of edits applied in one pass, in the fixed order color → type →
/// display → title → size, so later edits never revert earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditBatch {
    pub color: Option<String>,
    pub kind: Option<String>,
    pub display: Option<DisplayOptions>,
    pub title: Option<TitleOptions>,
    pub size: Option<SizeOptions>,
}

impl EditBatch {
    pub fn is_empty(&self) -> bool {
        self.color.is_none()
            && self.kind.is_none()
            && self.display.is_none()
            && self.title.is_none()
            && self.size.is_none()
    }

    /// The batch as ordered catalog edits.
    pub fn to_edits(&self) -> Vec<Edit> {
        let mut edits = Vec::new();
        if let Some(color) = &self.color {
            edits.push(Edit::ChangeColor { color: color.clone() });
        }
        if let Some(kind) = &self.kind {
            edits.push(Edit::ChangeType { kind: kind.clone() });
        }
        if let Some(options) = self.display {
            edits.push(Edit::ChangeDisplay { options });
        }
        if let Some(title) = &self.title {
            edits.push(Edit::ChangeTitle {
                title: title.title.clone(),
                subtitle: title.subtitle.clone(),
            });
        }
        if let Some(size) = self.size {
            edits.push(Edit::ChangeSize { size });
        }
        edits
    }
}

/// Compact configuration view for host UI chrome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigSummary {
    pub kind: String,
    pub color: String,
    pub has_data_label: bool,
    pub has_legend: bool,
    pub has_grid: bool,
}

/// Set the dominant color of every series.
pub fn change_color(document: &str, color: &str) -> String {
    apply_catalog(
        document,
        &[Edit::ChangeColor {
            color: color.to_string(),
        }],
    )
}

/// Switch every series to the given chart type.
pub fn change_type(document: &str, kind: &str) -> String {
    apply_catalog(
        document,
        &[Edit::ChangeType {
            kind: kind.to_string(),
        }],
    )
}

/// Toggle display elements; unset flags keep their current state.
pub fn change_display(document: &str, options: DisplayOptions) -> String {
    apply_catalog(document, &[Edit::ChangeDisplay { options }])
}

/// Rewrite the container dimensions. Purely text-level; works even on
/// documents the parser rejects.
pub fn change_size(document: &str, size: SizeOptions) -> String {
    Edit::ChangeSize { size }.apply_text(document)
}

/// Update the chart title: the configuration's title fields and the
/// document's heading region in the same call.
pub fn change_title(document: &str, title: &str, subtitle: Option<&str>) -> String {
    let edit = Edit::ChangeTitle {
        title: title.to_string(),
        subtitle: subtitle.map(str::to_string),
    };
    let with_heading = edit.apply_text(document);
    match patch_config(&with_heading, std::slice::from_ref(&edit)) {
        Some(patched) => patched,
        None => with_heading,
    }
}

/// Apply a batch in the fixed catalog order. An unparseable document is
/// returned unchanged.
pub fn apply_batch(document: &str, batch: &EditBatch) -> String {
    if batch.is_empty() {
        return document.to_string();
    }

    let edits = batch.to_edits();
    let tree_edits: Vec<Edit> = edits
        .iter()
        .filter(|edit| !matches!(edit, Edit::ChangeSize { .. }))
        .cloned()
        .collect();

    let mut output = if tree_edits.is_empty() {
        // Still demand a parseable document before text-level rewrites.
        if parse_document(document).is_err() {
            warn!("batch target could not be parsed; returning it unchanged");
            return document.to_string();
        }
        document.to_string()
    } else {
        match patch_config(document, &tree_edits) {
            Some(patched) => patched,
            None => return document.to_string(),
        }
    };

    // Text-level passes, in catalog order: heading, then sizes.
    for edit in &edits {
        output = edit.apply_text(&output);
    }

    debug!(
        changed = (output != document),
        "batch applied ({} edit(s))",
        edits.len()
    );
    output
}

/// Whether the document carries a configuration this engine can edit.
pub fn is_valid_chart_document(document: &str) -> bool {
    parse_document(document).is_ok()
}

/// Compact summary of the configuration, or `None` when it cannot be parsed.
pub fn config_summary(document: &str) -> Option<ConfigSummary> {
    let parsed = parse_document(document).ok()?;
    let config = &parsed.config;

    match parsed.dialect {
        ChartDialect::ChartJs => {
            let dataset = config
                .get_path(&["data", "datasets"])
                .and_then(ConfigValue::as_sequence)
                .and_then(|datasets| datasets.first());
            let color = dataset
                .and_then(|d| {
                    first_color(d.get("borderColor")).or_else(|| first_color(d.get("backgroundColor")))
                })
                .unwrap_or(chartpatch_parser::DEFAULT_SERIES_COLOR)
                .to_string();
            Some(ConfigSummary {
                kind: config
                    .get("type")
                    .and_then(ConfigValue::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
                color,
                has_data_label: true,
                has_legend: config
                    .get_path(&["options", "plugins", "legend", "display"])
                    .and_then(ConfigValue::as_bool)
                    != Some(false),
                has_grid: config
                    .get_path(&["options", "scales", "x", "grid", "display"])
                    .and_then(ConfigValue::as_bool)
                    != Some(false),
            })
        }
        _ => {
            let first_series = config
                .get("series")
                .and_then(ConfigValue::as_sequence)
                .and_then(|series| series.first());
            let color = config
                .get("color")
                .and_then(ConfigValue::as_sequence)
                .and_then(|palette| palette.first())
                .and_then(ConfigValue::as_str)
                .or_else(|| {
                    first_series
                        .and_then(|s| s.get_path(&["itemStyle", "color"]))
                        .and_then(ConfigValue::as_str)
                })
                .unwrap_or(chartpatch_parser::DEFAULT_SERIES_COLOR)
                .to_string();
            Some(ConfigSummary {
                kind: first_series
                    .and_then(|s| s.get("type"))
                    .and_then(ConfigValue::as_str)
                    .unwrap_or("unknown")
                    .to_string(),
                color,
                has_data_label: first_series
                    .and_then(|s| s.get_path(&["label", "show"]))
                    .and_then(ConfigValue::as_bool)
                    != Some(false),
                has_legend: config
                    .get_path(&["legend", "show"])
                    .and_then(ConfigValue::as_bool)
                    != Some(false),
                has_grid: config
                    .get_path(&["grid", "show"])
                    .and_then(ConfigValue::as_bool)
                    != Some(false),
            })
        }
    }
}

/// Border/background colors may be a single string or a per-point array.
fn first_color(value: Option<&ConfigValue>) -> Option<&str> {
    let value = value?;
    value
        .as_str()
        .or_else(|| value.as_sequence()?.first()?.as_str())
}

fn apply_catalog(document: &str, edits: &[Edit]) -> String {
    match patch_config(document, edits) {
        Some(patched) => patched,
        None => document.to_string(),
    }
}

/// Parse, edit the tree, validate, regenerate, re-check. `None` means "leave
/// the document alone".
fn patch_config(document: &str, edits: &[Edit]) -> Option<String> {
    let parsed = match parse_document(document) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(%err, "document could not be parsed; leaving it unchanged");
            return None;
        }
    };

    let mut config = parsed.config.clone();
    for edit in edits {
        edit.apply_config(&mut config, parsed.dialect);
    }

    let verdict = validate(&config);
    if !verdict.valid {
        warn!(
            errors = ?verdict.errors,
            "edited configuration failed validation; leaving the document unchanged"
        );
        return None;
    }

    let patched = generate_patch(document, &parsed, &config);
    if let Err(err) = parse_document(&patched) {
        warn!(%err, "regenerated document does not re-parse; leaving it unchanged");
        return None;
    }
    Some(patched)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<html>
<body>
  <h1>Old Heading</h1>
  <div id="chart" style="width: 800px; height: 600px;"></div>
  <script>
    const chart = echarts.init(document.getElementById('chart'));
    const option = {
      series: [
        { type: 'line', name: 'a', data: [1, 2, 3] },
        { type: 'line', name: 'b', data: [4, 5, 6] }
      ]
    };
    chart.setOption(option);
  </script>
</body>
</html>"#;

    #[test]
    fn change_color_round_trips_through_the_document() {
        let output = change_color(DOC, "#123456");
        let parsed = parse_document(&output).unwrap();
        let palette = parsed.config.get("color").and_then(ConfigValue::as_sequence).unwrap();
        assert_eq!(palette[0].as_str(), Some("#123456"));
        assert!(output.contains("<h1>Old Heading</h1>"));
    }

    #[test]
    fn malformed_documents_come_back_byte_identical() {
        let malformed = "<script>const option = { series: [ ;</script>";
        assert_eq!(change_color(malformed, "#fff"), malformed);
        assert_eq!(change_type(malformed, "pie"), malformed);
        assert_eq!(
            apply_batch(
                malformed,
                &EditBatch {
                    color: Some("#fff".to_string()),
                    ..EditBatch::default()
                }
            ),
            malformed
        );
    }

    #[test]
    fn size_edit_works_without_a_parseable_configuration() {
        let html = "<div style=\"width: 300px\"></div>";
        let resized = change_size(
            html,
            SizeOptions {
                width: Some(500),
                height: None,
            },
        );
        assert_eq!(resized, "<div style=\"width: 500px\"></div>");
    }

    #[test]
    fn batch_applies_in_fixed_order_without_reverts() {
        let batch = EditBatch {
            color: Some("#ff0000".to_string()),
            kind: Some("bar".to_string()),
            display: Some(DisplayOptions {
                show_legend: Some(true),
                ..DisplayOptions::default()
            }),
            title: Some(TitleOptions {
                title: "Fresh Title".to_string(),
                subtitle: None,
            }),
            size: Some(SizeOptions {
                width: Some(1000),
                height: Some(700),
            }),
        };
        let output = apply_batch(DOC, &batch);

        let config = parse_document(&output).unwrap().config;
        assert_eq!(
            config.get_path(&["title", "text"]).and_then(ConfigValue::as_str),
            Some("Fresh Title")
        );
        assert_eq!(
            config.get_path(&["legend", "show"]).and_then(ConfigValue::as_bool),
            Some(true)
        );
        for entry in config.series_entries().unwrap() {
            assert_eq!(entry.get("type").and_then(ConfigValue::as_str), Some("bar"));
            assert_eq!(
                entry.get_path(&["itemStyle", "color"]).and_then(ConfigValue::as_str),
                Some("#ff0000")
            );
        }
        assert!(output.contains("<h1>Fresh Title</h1>"));
        assert!(output.contains("width: 1000px"));
        assert!(output.contains("height: 700px"));
    }

    #[test]
    fn summary_reflects_the_configuration() {
        let summary = config_summary(DOC).unwrap();
        assert_eq!(summary.kind, "line");
        assert!(summary.has_legend);
        assert!(summary.has_grid);
        assert!(config_summary("<p>nope</p>").is_none());
    }

    #[test]
    fn validity_probe() {
        assert!(is_valid_chart_document(DOC));
        assert!(!is_valid_chart_document(""));
    }
}
