//! Error types for plan construction and planning.

use super::StepId;
use crate::reasoning::ports::BackendError;
use thiserror::Error;

/// Errors returned while building or validating a plan.
///
/// Every variant is recoverable: callers fall back to heuristic planning or
/// direct execution.
#[derive(Debug, Clone, Error)]
pub enum PlanningError {
    /// The structured plan text could not be parsed.
    #[error("malformed plan response: {0}")]
    MalformedPlan(String),

    /// The plan parsed but contains no usable steps.
    #[error("plan contains no steps")]
    EmptyPlan,

    /// A step has no description.
    #[error("step {0} has an empty description")]
    EmptyDescription(StepId),

    /// Two steps share an identifier.
    #[error("duplicate step id {0}")]
    DuplicateStep(StepId),

    /// A step depends on an identifier not present in the plan.
    #[error("step {step} depends on unknown step {dependency}")]
    UnknownDependency {
        /// The step declaring the dependency.
        step: StepId,
        /// The missing dependency.
        dependency: StepId,
    },

    /// The dependency relation contains a cycle.
    #[error("dependency cycle detected at step {0}")]
    Cycle(StepId),

    /// The planning prompt could not be rendered.
    #[error("failed to render planning prompt: {0}")]
    Prompt(String),

    /// The reasoning backend did not answer in time.
    #[error("reasoning backend timed out after {timeout_ms} ms")]
    Timeout {
        /// The elapsed budget in milliseconds.
        timeout_ms: u64,
    },

    /// The reasoning backend failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}
