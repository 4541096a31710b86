//! Append-only conversation context snapshots.

use super::{ConversationId, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Metadata key holding the per-conversation retry budget.
pub const MAX_LOOPS_KEY: &str = "maxLoops";

/// A single `{role, text}` entry in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author of the message.
    pub role: Role,
    /// Message text.
    pub text: String,
}

impl ChatMessage {
    /// Creates a message with the given role.
    #[must_use]
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    /// Creates a system message.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    /// Creates a worker message.
    #[must_use]
    pub fn worker(text: impl Into<String>) -> Self {
        Self::new(Role::Worker, text)
    }
}

/// Immutable snapshot of a conversation's history and metadata.
///
/// Adding a message returns a new snapshot; existing snapshots held by
/// in-flight steps are never affected.
///
/// # Examples
///
/// ```
/// use ensemble::conversation::domain::{ChatMessage, ConversationContext, ConversationId};
///
/// let base = ConversationContext::new(ConversationId::new());
/// let next = base.with_message(ChatMessage::user("summarise the news"));
/// assert!(base.history().is_empty());
/// assert_eq!(next.history().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    id: ConversationId,
    history: Vec<ChatMessage>,
    #[serde(default)]
    metadata: BTreeMap<String, Value>,
}

impl ConversationContext {
    /// Creates an empty context for the conversation.
    #[must_use]
    pub const fn new(id: ConversationId) -> Self {
        Self {
            id,
            history: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Sets a metadata entry, consuming the builder.
    #[must_use]
    pub fn with_metadata_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Merges metadata entries, later values replacing earlier ones.
    #[must_use]
    pub fn with_metadata(mut self, entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        self.metadata.extend(entries);
        self
    }

    /// Replaces the whole metadata map, keeping the history.
    #[must_use]
    pub fn with_metadata_replaced(mut self, metadata: BTreeMap<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns a copy of this snapshot with `message` appended.
    #[must_use]
    pub fn with_message(&self, message: ChatMessage) -> Self {
        let mut next = self.clone();
        next.history.push(message);
        next
    }

    /// Returns the conversation identifier.
    #[must_use]
    pub const fn id(&self) -> ConversationId {
        self.id
    }

    /// Returns the ordered message history.
    #[must_use]
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Returns the most recent message, if any.
    #[must_use]
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.history.last()
    }

    /// Returns the free-form metadata map.
    #[must_use]
    pub const fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    /// Returns the `maxLoops` retry budget when present and well-formed.
    ///
    /// Accepts a JSON number or a numeric string. Non-positive values are
    /// clamped to one so every task gets at least a single pass.
    #[must_use]
    pub fn max_loops(&self) -> Option<u32> {
        let raw = match self.metadata.get(MAX_LOOPS_KEY)? {
            Value::Number(number) => number.as_i64()?,
            Value::String(text) => text.trim().parse::<i64>().ok()?,
            _ => return None,
        };
        Some(u32::try_from(raw.max(1)).unwrap_or(u32::MAX))
    }
}
