//! Planning through a reasoning backend.

use super::{parse_plan_response, render_planning_prompt};
use crate::conversation::domain::{ChatMessage, ConversationContext};
use crate::plan::domain::{Plan, PlanningError};
use crate::plan::ports::{Planner, PlanningResult};
use crate::reasoning::ports::ReasoningBackend;
use crate::registry::services::CapabilityRegistry;
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// System prompt sent with every planning request.
pub const PLANNER_SYSTEM_PROMPT: &str =
    "You are a planning assistant. You decompose tasks into dependency-ordered steps and reply with JSON only.";

/// Asks a reasoning backend for a structured plan and parses the answer.
#[derive(Clone)]
pub struct ReasoningPlanner<C>
where
    C: Clock + Send + Sync,
{
    registry: Arc<CapabilityRegistry>,
    backend: Arc<dyn ReasoningBackend>,
    clock: Arc<C>,
    timeout: Duration,
}

impl<C> ReasoningPlanner<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a reasoning-backed planner with a per-call timeout.
    #[must_use]
    pub const fn new(
        registry: Arc<CapabilityRegistry>,
        backend: Arc<dyn ReasoningBackend>,
        clock: Arc<C>,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            backend,
            clock,
            timeout,
        }
    }
}

#[async_trait]
impl<C> Planner for ReasoningPlanner<C>
where
    C: Clock + Send + Sync,
{
    #[instrument(skip(self, task, context), fields(conversation_id = %context.id()))]
    async fn create_plan(
        &self,
        task: &str,
        context: &ConversationContext,
    ) -> PlanningResult<Plan> {
        let capabilities = self.registry.list_registered_capabilities();
        let prompt = render_planning_prompt(task, &capabilities)?;

        let completion = tokio::time::timeout(
            self.timeout,
            self.backend.complete(
                vec![ChatMessage::user(prompt)],
                PLANNER_SYSTEM_PROMPT.to_owned(),
            ),
        )
        .await
        .map_err(|_| PlanningError::Timeout {
            timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
        })??;

        debug!(length = completion.len(), "planning completion received");
        parse_plan_response(&completion, context.id(), task, &*self.clock)
    }
}
