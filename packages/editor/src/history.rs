//! In-memory record of applied edits. Nothing here persists; the hosting
//! application owns durable storage.

use chrono::{DateTime, Utc};
use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::engine::EditBatch;

/// Where an edit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditOrigin {
    /// Direct manipulation in the host UI.
    Local,
    /// Resolved from a natural-language instruction outside this core.
    Ai,
}

/// What a record changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChangeSet {
    /// A catalog batch.
    Batch(EditBatch),
    /// The whole configuration was replaced.
    ReplaceConfig,
}

/// One history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub origin: EditOrigin,
    pub instruction: String,
    pub changes: ChangeSet,
    pub applied_by: String,
}

/// Append-only edit history for one document.
#[derive(Debug, Clone)]
pub struct EditHistory {
    records: Vec<EditRecord>,
    ids: IdGenerator,
}

impl EditHistory {
    pub fn new(seed_text: &str) -> Self {
        Self {
            records: Vec::new(),
            ids: IdGenerator::from_text(seed_text),
        }
    }

    pub fn record(
        &mut self,
        origin: EditOrigin,
        instruction: &str,
        changes: ChangeSet,
        applied_by: &str,
    ) -> &EditRecord {
        let record = EditRecord {
            id: self.ids.new_id(),
            timestamp: Utc::now(),
            origin,
            instruction: instruction.to_string(),
            changes,
            applied_by: applied_by.to_string(),
        };
        self.records.push(record);
        self.records.last().expect("record just pushed")
    }

    pub fn records(&self) -> &[EditRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Sequential ID generator seeded from the document text via CRC32.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    pub fn from_text(text: &str) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(text.as_bytes());
        Self {
            seed: format!("{:x}", hasher.finalize()),
            count: 0,
        }
    }

    /// Generate next sequential ID.
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_and_share_the_seed() {
        let mut ids = IdGenerator::from_text("<html>doc</html>");
        let a = ids.new_id();
        let b = ids.new_id();
        assert!(a.ends_with("-1"));
        assert!(b.ends_with("-2"));
        assert!(a.starts_with(ids.seed()));

        // Same text always seeds the same generator.
        let again = IdGenerator::from_text("<html>doc</html>");
        assert_eq!(ids.seed(), again.seed());
    }

    #[test]
    fn records_accumulate_in_order() {
        let mut history = EditHistory::new("doc");
        history.record(EditOrigin::Local, "make it red", ChangeSet::Batch(EditBatch::default()), "user-1");
        history.record(EditOrigin::Ai, "switch to pie", ChangeSet::ReplaceConfig, "assistant");

        assert_eq!(history.len(), 2);
        assert_eq!(history.records()[0].origin, EditOrigin::Local);
        assert_eq!(history.records()[1].instruction, "switch to pie");
        assert_ne!(history.records()[0].id, history.records()[1].id);
    }

    #[test]
    fn records_serialize() {
        let mut history = EditHistory::new("doc");
        let record = history
            .record(EditOrigin::Local, "i", ChangeSet::ReplaceConfig, "u")
            .clone();
        let json = serde_json::to_string(&record).unwrap();
        let back: EditRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
