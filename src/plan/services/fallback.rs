//! Composition of a primary planner with a backup.

use crate::conversation::domain::ConversationContext;
use crate::plan::domain::Plan;
use crate::plan::ports::{Planner, PlanningResult};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Tries `primary` first and falls back to `secondary` on any
/// [`crate::plan::domain::PlanningError`].
///
/// Typically wraps a [`super::ReasoningPlanner`] around a
/// [`super::HeuristicPlanner`].
#[derive(Clone)]
pub struct FallbackPlanner {
    primary: Arc<dyn Planner>,
    secondary: Arc<dyn Planner>,
}

impl FallbackPlanner {
    /// Creates a planner that prefers `primary`.
    #[must_use]
    pub const fn new(primary: Arc<dyn Planner>, secondary: Arc<dyn Planner>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl Planner for FallbackPlanner {
    async fn create_plan(
        &self,
        task: &str,
        context: &ConversationContext,
    ) -> PlanningResult<Plan> {
        match self.primary.create_plan(task, context).await {
            Ok(plan) => Ok(plan),
            Err(err) => {
                warn!(
                    conversation_id = %context.id(),
                    error = %err,
                    "primary planner failed, falling back"
                );
                self.secondary.create_plan(task, context).await
            }
        }
    }
}
