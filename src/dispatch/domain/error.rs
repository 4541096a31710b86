//! Error types for plan execution.

use crate::conversation::domain::ConversationId;
use crate::reasoning::ports::BackendError;
use crate::worker::domain::TaskMessageId;
use crate::worker::ports::TransportError;
use thiserror::Error;

/// Why a single step did not produce a result.
///
/// Step failures are retried within the plan's attempt budget and only
/// reach the caller wrapped in a [`ConversationFailure`].
#[derive(Debug, Clone, Error)]
pub enum StepFailure {
    /// The worker answered with a failure.
    #[error("worker reported failure: {0}")]
    Worker(String),

    /// The worker or backend did not answer in time.
    #[error("step timed out after {timeout_ms} ms")]
    Timeout {
        /// The elapsed budget in milliseconds.
        timeout_ms: u64,
    },

    /// The worker could not be reached.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Local execution on the reasoning backend failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The worker kept asking for clarification past the round limit.
    #[error("clarification limit of {rounds} rounds exceeded")]
    ClarificationExhausted {
        /// The configured round limit.
        rounds: u32,
    },
}

/// A reply arrived for a message id the dispatcher is not tracking.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("no step is awaiting a reply to message {message_id}")]
pub struct CorrelationMiss {
    /// The unmatched outbound message id.
    pub message_id: TaskMessageId,
}

/// The only error surfaced to callers of a conversation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("conversation {conversation_id} failed: {reason}")]
pub struct ConversationFailure {
    /// The failed conversation.
    pub conversation_id: ConversationId,
    /// Human-readable reason.
    pub reason: String,
}

impl ConversationFailure {
    /// Creates a failure for `conversation_id`.
    #[must_use]
    pub fn new(conversation_id: ConversationId, reason: impl Into<String>) -> Self {
        Self {
            conversation_id,
            reason: reason.into(),
        }
    }
}
