//! # Chartpatch Editor
//!
//! Round-trip editing engine for chart documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: document text → ConfigValue         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: document lifecycle + edit catalog   │
//! │  - Parse documents into editable handles    │
//! │  - Apply catalog edits with validation      │
//! │  - Regenerate in patch mode (byte-precise)  │
//! │  - Record history in memory                 │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ renderer: ConfigValue → live surface        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The document text is the source of truth**: the tree is re-derived
//!    after every successful edit.
//! 2. **Fail-soft**: the catalog always yields a usable document; the worst
//!    case is "edit had no visible effect", surfaced via logging.
//! 3. **No partial artifacts**: validation and a regeneration re-check gate
//!    every text replacement.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chartpatch_editor::{ChartDocument, EditBatch, EditOrigin};
//!
//! let mut doc = ChartDocument::parse(html)?;
//!
//! let batch = EditBatch {
//!     color: Some("#336699".to_string()),
//!     kind: Some("bar".to_string()),
//!     ..EditBatch::default()
//! };
//! doc.apply(batch, EditOrigin::Local, "blue bars please", "user-1");
//!
//! let html = doc.text();
//! ```

mod document;
pub mod engine;
mod errors;
mod history;
mod mutations;

pub use document::ChartDocument;
pub use engine::{
    apply_batch, change_color, change_display, change_size, change_title, change_type,
    config_summary, is_valid_chart_document, ConfigSummary, EditBatch, TitleOptions,
};
pub use errors::EditError;
pub use history::{ChangeSet, EditHistory, EditOrigin, EditRecord, IdGenerator};
pub use mutations::{DisplayOptions, Edit, SizeOptions};

// Re-export the parser surface editors usually need alongside.
pub use chartpatch_parser::{ChartDialect, ConfigValue, Theme, Validation};
