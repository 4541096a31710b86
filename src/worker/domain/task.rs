//! Outbound task messages.

use super::TaskMessageId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A unit of work sent to a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerTask {
    /// Correlation identifier, unique per send.
    pub id: TaskMessageId,
    /// Prompt text describing the work.
    pub text: String,
    /// Free-form metadata (step id, attempt number, ...).
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl WorkerTask {
    /// Creates a task with a fresh correlation identifier.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_id(TaskMessageId::new(), text)
    }

    /// Creates a task with an explicit correlation identifier.
    #[must_use]
    pub fn with_id(id: TaskMessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Returns a copy of this task with `addendum` appended to its text.
    ///
    /// The correlation identifier is preserved.
    #[must_use]
    pub fn with_appended_text(&self, addendum: &str) -> Self {
        let mut next = self.clone();
        next.text.push_str("\n\n");
        next.text.push_str(addendum);
        next
    }
}
