//! Conversation-level entry point.

use crate::config::OrchestratorConfig;
use crate::conversation::domain::{ChatMessage, ConversationContext, ConversationId};
use crate::coordinator::domain::TaskRequest;
use crate::dispatch::domain::{ConversationFailure, DispatchOutcome};
use crate::dispatch::services::{Dispatcher, LOCAL_SYSTEM_PROMPT};
use crate::plan::domain::Plan;
use crate::plan::ports::Planner;
use crate::plan::services::{FallbackPlanner, HeuristicPlanner, ReasoningPlanner};
use crate::reasoning::ports::{BackendError, BackendResult, ReasoningBackend, StreamChunk};
use crate::registry::services::CapabilityRegistry;
use crate::telemetry::domain::{TelemetryEvent, TelemetryRecord};
use crate::telemetry::ports::TelemetrySink;
use dashmap::DashMap;
use mockable::Clock;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, instrument, warn};

/// Accepts tasks, plans them and drives them to a final answer.
///
/// The coordinator keeps the latest context snapshot of every conversation
/// it has answered. A per-conversation async lock serialises submissions
/// that share a conversation id.
pub struct Coordinator<C>
where
    C: Clock + Send + Sync + 'static,
{
    registry: Arc<CapabilityRegistry>,
    planner: Arc<dyn Planner>,
    dispatcher: Dispatcher<C>,
    backend: Arc<dyn ReasoningBackend>,
    telemetry: Arc<dyn TelemetrySink>,
    clock: Arc<C>,
    config: OrchestratorConfig,
    histories: DashMap<ConversationId, ConversationContext>,
    locks: DashMap<ConversationId, Arc<Mutex<()>>>,
}

impl<C> Coordinator<C>
where
    C: Clock + Send + Sync + 'static,
{
    /// Creates a coordinator around an explicit planner.
    #[must_use]
    pub fn new(
        registry: Arc<CapabilityRegistry>,
        planner: Arc<dyn Planner>,
        backend: Arc<dyn ReasoningBackend>,
        telemetry: Arc<dyn TelemetrySink>,
        clock: Arc<C>,
        config: OrchestratorConfig,
    ) -> Self {
        let dispatcher = Dispatcher::new(
            Arc::clone(&registry),
            Arc::clone(&backend),
            Arc::clone(&telemetry),
            Arc::clone(&clock),
            config.clone(),
        );
        Self {
            registry,
            planner,
            dispatcher,
            backend,
            telemetry,
            clock,
            config,
            histories: DashMap::new(),
            locks: DashMap::new(),
        }
    }

    /// Creates a coordinator that plans with the reasoning backend and falls
    /// back to keyword heuristics.
    #[must_use]
    pub fn with_default_planner(
        registry: Arc<CapabilityRegistry>,
        backend: Arc<dyn ReasoningBackend>,
        telemetry: Arc<dyn TelemetrySink>,
        clock: Arc<C>,
        config: OrchestratorConfig,
    ) -> Self {
        let reasoning = ReasoningPlanner::new(
            Arc::clone(&registry),
            Arc::clone(&backend),
            Arc::clone(&clock),
            config.backend_timeout(),
        );
        let heuristic = HeuristicPlanner::new(Arc::clone(&registry), Arc::clone(&clock));
        let planner = FallbackPlanner::new(Arc::new(reasoning), Arc::new(heuristic));
        Self::new(registry, Arc::new(planner), backend, telemetry, clock, config)
    }

    /// Returns the shared capability registry workers register with.
    #[must_use]
    pub const fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    /// Returns the configuration in force.
    #[must_use]
    pub const fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Returns the stored context of a conversation, if it has one.
    #[must_use]
    pub fn history(&self, conversation_id: ConversationId) -> Option<ConversationContext> {
        self.histories
            .get(&conversation_id)
            .map(|entry| entry.value().clone())
    }

    /// Drops the stored history of a conversation.
    ///
    /// A turn still running for the conversation keeps its lock, so a
    /// later submission waits for it.
    pub fn forget(&self, conversation_id: ConversationId) {
        self.histories.remove(&conversation_id);
        self.release_lock(conversation_id);
    }

    /// Plans and executes one task.
    ///
    /// A planning failure is recovered by running the task as a single
    /// direct step. Request metadata applies to this task only. On success
    /// the answer's messages become the conversation's stored history.
    ///
    /// # Errors
    ///
    /// Returns [`ConversationFailure`] when the task text is blank or when
    /// execution exhausts its recovery options.
    #[instrument(skip_all, fields(conversation_id = %request.conversation_id))]
    pub async fn submit(&self, request: TaskRequest) -> DispatchOutcome {
        let conversation_id = request.conversation_id;
        if request.text.trim().is_empty() {
            return Err(ConversationFailure::new(conversation_id, "task text is empty"));
        }

        let turn = self.conversation_lock(conversation_id).lock_owned().await;
        let outcome = self.run_turn(&request).await;
        drop(turn);
        self.release_lock(conversation_id);
        outcome
    }

    /// Streams a direct reply from the reasoning backend, bypassing planning
    /// and dispatch.
    ///
    /// The conversation's stored history precedes `text`. Streamed replies
    /// are not added to the history.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the backend fails or does not start
    /// streaming within the backend timeout.
    pub async fn chat_stream(
        &self,
        conversation_id: ConversationId,
        text: &str,
    ) -> BackendResult<mpsc::Receiver<StreamChunk>> {
        let context = self
            .history(conversation_id)
            .unwrap_or_else(|| ConversationContext::new(conversation_id))
            .with_message(ChatMessage::user(text));
        let timeout = self.config.backend_timeout();
        tokio::time::timeout(
            timeout,
            self.backend
                .complete_stream(context.history().to_vec(), LOCAL_SYSTEM_PROMPT.to_owned()),
        )
        .await
        .map_err(|_| {
            BackendError::Unavailable(format!(
                "no stream within {} ms",
                self.config.backend_timeout_ms
            ))
        })?
    }

    fn conversation_lock(&self, conversation_id: ConversationId) -> Arc<Mutex<()>> {
        Arc::clone(self.locks.entry(conversation_id).or_default().value())
    }

    /// Removes the conversation's lock once nobody holds or awaits it.
    fn release_lock(&self, conversation_id: ConversationId) {
        self.locks.remove_if(&conversation_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    #[cfg(test)]
    pub(crate) fn tracked_locks(&self) -> usize {
        self.locks.len()
    }

    async fn run_turn(&self, request: &TaskRequest) -> DispatchOutcome {
        let conversation_id = request.conversation_id;
        let stored = self
            .history(conversation_id)
            .unwrap_or_else(|| ConversationContext::new(conversation_id));
        let stored_metadata = stored.metadata().clone();
        let context = stored
            .with_metadata(request.metadata.clone())
            .with_message(ChatMessage::user(request.text.clone()));

        let plan = match self.planner.create_plan(&request.text, &context).await {
            Ok(plan) => plan,
            Err(err) => {
                warn!(error = %err, "planning failed, running the task directly");
                self.emit(
                    conversation_id,
                    TelemetryEvent::error(format!("planning failed: {err}")),
                );
                Plan::direct(conversation_id, &request.text, self.clock.as_ref())
            }
        };
        info!(plan_id = %plan.id(), steps = plan.steps().len(), "task planned");

        let outcome = self.dispatcher.execute(plan, context).await;
        match &outcome {
            Ok(answer) => {
                let history = answer.context.clone().with_metadata_replaced(stored_metadata);
                self.histories.insert(conversation_id, history);
            }
            Err(failure) => debug!(reason = %failure.reason, "history left unchanged"),
        }
        outcome
    }

    fn emit(&self, conversation_id: ConversationId, event: TelemetryEvent) {
        self.telemetry.emit(TelemetryRecord {
            conversation_id,
            at: self.clock.utc(),
            event,
        });
    }
}
