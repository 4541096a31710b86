//! A task submitted by a caller.

use crate::conversation::domain::ConversationId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One unit of work submitted to a conversation.
///
/// Metadata entries are merged into the conversation context before
/// planning, so keys such as `maxLoops` apply to this and later tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    /// Conversation the task belongs to.
    pub conversation_id: ConversationId,
    /// Free task text.
    pub text: String,
    /// Free-form metadata.
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl TaskRequest {
    /// Creates a request without metadata.
    #[must_use]
    pub fn new(conversation_id: ConversationId, text: impl Into<String>) -> Self {
        Self {
            conversation_id,
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
}
