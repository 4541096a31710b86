//! Telemetry events and timestamped records.

use crate::conversation::domain::ConversationId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A discrete orchestration event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// A plan was accepted for execution.
    PlanComputed {
        /// Step identifiers in declaration order.
        steps: Vec<String>,
        /// `(step, dependency)` edges.
        dependencies: Vec<(String, String)>,
    },
    /// A step was sent to a worker or executed locally.
    StepDispatched {
        /// The dispatched step.
        step_id: String,
        /// Capability of the chosen worker, or `local`.
        capability: String,
        /// Outbound task message id.
        correlation_id: String,
    },
    /// A step finished successfully.
    StepCompleted {
        /// The completed step.
        step_id: String,
    },
    /// The final answer was assembled.
    AggregateCompleted {
        /// Length of the final text in bytes.
        length: usize,
    },
    /// Something went wrong; the run may still recover.
    Error {
        /// Human-readable description.
        message: String,
    },
}

impl TelemetryEvent {
    /// Returns the snake-case event name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PlanComputed { .. } => "plan_computed",
            Self::StepDispatched { .. } => "step_dispatched",
            Self::StepCompleted { .. } => "step_completed",
            Self::AggregateCompleted { .. } => "aggregate_completed",
            Self::Error { .. } => "error",
        }
    }

    /// Creates an error event.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// An event stamped with its conversation and emission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Conversation the event belongs to.
    pub conversation_id: ConversationId,
    /// Emission time.
    pub at: DateTime<Utc>,
    /// The event payload.
    #[serde(flatten)]
    pub event: TelemetryEvent,
}
