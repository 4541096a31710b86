//! Shared world state for orchestration BDD scenarios.

use std::collections::BTreeMap;
use std::sync::Arc;

use ensemble::conversation::domain::{ConversationContext, ConversationId};
use ensemble::dispatch::domain::DispatchOutcome;
use ensemble::plan::domain::{ExecutionStrategy, PlanStep};
use ensemble::reasoning::adapters::memory::ScriptedReasoningBackend;
use ensemble::registry::services::CapabilityRegistry;
use ensemble::telemetry::adapters::memory::InMemoryTelemetrySink;
use ensemble::worker::adapters::memory::ScriptedWorker;
use rstest::fixture;

/// Scenario world for orchestration behaviour tests.
pub struct OrchestrationWorld {
    pub registry: Arc<CapabilityRegistry>,
    pub backend: ScriptedReasoningBackend,
    pub telemetry: InMemoryTelemetrySink,
    pub workers: BTreeMap<String, ScriptedWorker>,
    pub conversation: ConversationContext,
    pub strategy: ExecutionStrategy,
    pub steps: Vec<PlanStep>,
    pub outcome: Option<DispatchOutcome>,
}

impl OrchestrationWorld {
    /// Creates a world with an empty registry and a silent backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(CapabilityRegistry::new()),
            backend: ScriptedReasoningBackend::new(),
            telemetry: InMemoryTelemetrySink::new(),
            workers: BTreeMap::new(),
            conversation: ConversationContext::new(ConversationId::new()),
            strategy: ExecutionStrategy::Sequential,
            steps: Vec::new(),
            outcome: None,
        }
    }

    /// Returns the final answer text, failing if the run failed.
    pub fn answer_text(&self) -> Result<&str, eyre::Report> {
        let outcome = self
            .outcome
            .as_ref()
            .ok_or_else(|| eyre::eyre!("plan has not been executed"))?;
        outcome
            .as_ref()
            .map(|answer| answer.text.as_str())
            .map_err(|failure| eyre::eyre!("unexpected failure: {failure}"))
    }
}

impl Default for OrchestrationWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> OrchestrationWorld {
    OrchestrationWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
