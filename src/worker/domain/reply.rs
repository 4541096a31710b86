//! Worker replies.

use crate::conversation::domain::ConversationContext;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Metadata key marking a result as explicitly satisfactory.
pub const SATISFIED_KEY: &str = "satisfied";

/// Textual output of a completed step plus structured metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutput {
    /// Result text.
    pub text: String,
    /// Structured metadata reported alongside the text.
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl StepOutput {
    /// Creates an output with no metadata.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
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

    /// Marks the output as explicitly satisfactory.
    #[must_use]
    pub fn satisfied(self) -> Self {
        self.with_metadata(SATISFIED_KEY, Value::Bool(true))
    }
}

/// A worker's request for more input before it can complete a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarificationRequest {
    /// Question to forward to another worker.
    pub question: String,
    /// Capability names able to answer, in preference order.
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Skill tags able to answer.
    #[serde(default)]
    pub skills: Vec<String>,
}

impl ClarificationRequest {
    /// Creates a clarification request with no target hints.
    #[must_use]
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            capabilities: Vec::new(),
            skills: Vec::new(),
        }
    }

    /// Adds capability hints.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: impl IntoIterator<Item = String>) -> Self {
        self.capabilities.extend(capabilities);
        self
    }

    /// Adds skill hints.
    #[must_use]
    pub fn with_skills(mut self, skills: impl IntoIterator<Item = String>) -> Self {
        self.skills.extend(skills);
        self
    }
}

/// The single eventual reply to a [`super::WorkerTask`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerReply {
    /// The worker finished the task.
    Completed {
        /// Step output.
        output: StepOutput,
        /// Context snapshot after the worker's turn, when the worker
        /// maintains one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<ConversationContext>,
    },
    /// The worker could not finish the task.
    Failed {
        /// Human-readable failure reason.
        reason: String,
    },
    /// The worker needs a question answered first.
    ClarificationNeeded(ClarificationRequest),
}

impl WorkerReply {
    /// Creates a completed reply with plain text output.
    #[must_use]
    pub fn completed(text: impl Into<String>) -> Self {
        Self::Completed {
            output: StepOutput::new(text),
            context: None,
        }
    }

    /// Creates a completed reply carrying structured output.
    #[must_use]
    pub const fn completed_with(output: StepOutput) -> Self {
        Self::Completed {
            output,
            context: None,
        }
    }

    /// Creates a failed reply.
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Creates a clarification request reply.
    #[must_use]
    pub const fn clarification(request: ClarificationRequest) -> Self {
        Self::ClarificationNeeded(request)
    }
}
