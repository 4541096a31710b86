//! Planner port.

use crate::conversation::domain::ConversationContext;
use crate::plan::domain::{Plan, PlanningError};
use async_trait::async_trait;

/// Result type for planning operations.
pub type PlanningResult<T> = Result<T, PlanningError>;

/// Turns task text into an executable [`Plan`].
///
/// Implementations are interchangeable; the coordinator treats any
/// [`PlanningError`] as recoverable.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Planner: Send + Sync {
    /// Builds a plan for `task` in the given conversation.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError`] when no valid plan can be produced.
    async fn create_plan(&self, task: &str, context: &ConversationContext)
    -> PlanningResult<Plan>;
}
