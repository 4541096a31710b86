//! Domain model for plan execution.

mod aggregate;
mod answer;
mod error;
mod satisfaction;
mod state;

pub use aggregate::aggregate;
pub use answer::{DispatchOutcome, FinalAnswer};
pub use error::{ConversationFailure, CorrelationMiss, StepFailure};
pub use satisfaction::{DONE_MARKER, is_satisfactory};
pub use state::{ExecutionState, Refinement};
