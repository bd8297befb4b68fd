//! # Document Handle
//!
//! An editable chart document: the original text plus the model derived from
//! it. A `ChartDocument` is exclusively owned by one editing session and is
//! only mutated through the edit catalog (or a whole-configuration
//! replacement); it is replaced wholesale when a new document is loaded.
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Parse → Edit → Regenerate
//!   ↓      ↓       ↓        ↓
//! Text  Config  Batch    Text'
//! ```

use tracing::debug;

use chartpatch_parser::{
    extract_series, extract_theme, generate_patch, parse_document, validate, ChartDialect,
    ConfigValue, ParsedChart, SeriesInfo, Theme, Validation,
};

use crate::engine;
use crate::engine::EditBatch;
use crate::errors::EditError;
use crate::history::{ChangeSet, EditHistory, EditOrigin, EditRecord};

/// Editable chart document.
#[derive(Debug, Clone)]
pub struct ChartDocument {
    text: String,
    parsed: ParsedChart,
    theme: Theme,
    version: u64,
    history: EditHistory,
}

impl ChartDocument {
    /// Parse a document into an editable handle.
    pub fn parse(text: impl Into<String>) -> Result<Self, EditError> {
        let text = text.into();
        let parsed = parse_document(&text)?;
        let theme = extract_theme(&text, &parsed.config);
        Ok(Self {
            history: EditHistory::new(&text),
            text,
            parsed,
            theme,
            version: 0,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn dialect(&self) -> ChartDialect {
        self.parsed.dialect
    }

    pub fn config(&self) -> &ConfigValue {
        &self.parsed.config
    }

    /// Derived theme; recomputed after every successful edit.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Positional series views borrowing the configuration tree.
    pub fn series(&self) -> Vec<SeriesInfo<'_>> {
        extract_series(&self.parsed.config)
    }

    pub fn validate(&self) -> Validation {
        validate(&self.parsed.config)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn history(&self) -> &[EditRecord] {
        self.history.records()
    }

    /// Apply a batch through the modification engine.
    ///
    /// Fail-soft: when the batch cannot be applied the document is left
    /// untouched and `false` is returned. The version bumps and a history
    /// record is appended only when the text actually changed.
    pub fn apply(
        &mut self,
        batch: EditBatch,
        origin: EditOrigin,
        instruction: &str,
        applied_by: &str,
    ) -> bool {
        let next = engine::apply_batch(&self.text, &batch);
        if next == self.text {
            debug!("batch left the document unchanged");
            return false;
        }
        if self.replace_text(next).is_err() {
            // The engine re-checks its own output, so this cannot fire; keep
            // the old state rather than a partially-updated one regardless.
            return false;
        }
        self.version += 1;
        self.history
            .record(origin, instruction, ChangeSet::Batch(batch), applied_by);
        true
    }

    /// Replace the whole configuration, e.g. with one produced by the
    /// instruction-resolution pipeline.
    pub fn replace_config(
        &mut self,
        config: ConfigValue,
        origin: EditOrigin,
        instruction: &str,
        applied_by: &str,
    ) -> Result<(), EditError> {
        let verdict = validate(&config);
        if !verdict.valid {
            return Err(EditError::Validation(verdict.errors.join("; ")));
        }
        let next = generate_patch(&self.text, &self.parsed, &config);
        self.replace_text(next)?;
        self.version += 1;
        self.history
            .record(origin, instruction, ChangeSet::ReplaceConfig, applied_by);
        Ok(())
    }

    fn replace_text(&mut self, text: String) -> Result<(), EditError> {
        let parsed = parse_document(&text)?;
        self.theme = extract_theme(&text, &parsed.config);
        self.parsed = parsed;
        self.text = text;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<script>
const chart = echarts.init(document.getElementById('chart'));
const option = { series: [{ type: 'line', name: 'a', data: [1, 2] }] };
chart.setOption(option);
</script>"#;

    #[test]
    fn parse_builds_the_derived_views() {
        let doc = ChartDocument::parse(DOC).unwrap();
        assert_eq!(doc.dialect(), ChartDialect::ECharts);
        assert_eq!(doc.series().len(), 1);
        assert!(doc.validate().valid);
        assert_eq!(doc.version(), 0);
        assert!(doc.history().is_empty());
    }

    #[test]
    fn apply_updates_text_model_and_history_together() {
        let mut doc = ChartDocument::parse(DOC).unwrap();
        let changed = doc.apply(
            EditBatch {
                color: Some("#abcdef".to_string()),
                ..EditBatch::default()
            },
            EditOrigin::Local,
            "make it blue",
            "user-7",
        );
        assert!(changed);
        assert_eq!(doc.version(), 1);
        assert_eq!(doc.history().len(), 1);
        assert_eq!(doc.history()[0].instruction, "make it blue");
        // The theme is recomputed from the edited configuration.
        assert_eq!(doc.theme().color_palette, vec!["#abcdef"]);
        assert_eq!(doc.series()[0].color, "#abcdef");
    }

    #[test]
    fn failed_batches_leave_everything_untouched() {
        let mut doc = ChartDocument::parse(DOC).unwrap();
        let before = doc.text().to_string();
        // Unrecognized type fails validation inside the engine.
        let changed = doc.apply(
            EditBatch {
                kind: Some("hologram".to_string()),
                ..EditBatch::default()
            },
            EditOrigin::Local,
            "try something odd",
            "user-7",
        );
        assert!(!changed);
        assert_eq!(doc.text(), before);
        assert_eq!(doc.version(), 0);
        assert!(doc.history().is_empty());
    }

    #[test]
    fn replace_config_validates_before_touching_the_document() {
        let mut doc = ChartDocument::parse(DOC).unwrap();
        let err = doc.replace_config(
            ConfigValue::null(),
            EditOrigin::Ai,
            "replace with junk",
            "assistant",
        );
        assert!(matches!(err, Err(EditError::Validation(_))));
        assert_eq!(doc.version(), 0);

        let replacement =
            chartpatch_parser::parse_literal("{ series: [{ type: 'pie', data: [9] }] }").unwrap();
        doc.replace_config(replacement.clone(), EditOrigin::Ai, "pie instead", "assistant")
            .unwrap();
        assert_eq!(doc.config(), &replacement);
        assert_eq!(doc.version(), 1);
        assert_eq!(doc.history().len(), 1);
    }
}
