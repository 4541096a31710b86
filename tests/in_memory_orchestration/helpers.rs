//! Shared builders for in-memory orchestration tests.

use std::sync::Arc;

use ensemble::config::OrchestratorConfig;
use ensemble::conversation::domain::{ConversationContext, ConversationId};
use ensemble::dispatch::services::Dispatcher;
use ensemble::plan::domain::{ExecutionStrategy, Plan, PlanStep};
use ensemble::reasoning::adapters::memory::ScriptedReasoningBackend;
use ensemble::registry::services::CapabilityRegistry;
use ensemble::telemetry::adapters::memory::InMemoryTelemetrySink;
use ensemble::worker::{adapters::memory::ScriptedWorker, ports::WorkerHandle};
use mockable::DefaultClock;
use rstest::fixture;

/// Everything a dispatch scenario needs.
pub struct Harness {
    pub registry: Arc<CapabilityRegistry>,
    pub backend: ScriptedReasoningBackend,
    pub telemetry: InMemoryTelemetrySink,
}

impl Harness {
    /// Builds a dispatcher over the harness's registry, backend and sink.
    #[must_use]
    pub fn dispatcher(&self) -> Dispatcher<DefaultClock> {
        Dispatcher::new(
            Arc::clone(&self.registry),
            Arc::new(self.backend.clone()),
            Arc::new(self.telemetry.clone()),
            Arc::new(DefaultClock),
            OrchestratorConfig::fast(),
        )
    }

    /// Registers `worker` under `capability` with `skills`.
    pub fn register(&self, capability: &str, skills: &[&str], worker: ScriptedWorker) {
        let handle = WorkerHandle::from_transport(capability, worker);
        self.registry
            .register_with_skills(&handle, capability, skills.iter().copied());
    }
}

/// Provides a fresh harness whose backend answers "backend answer".
#[fixture]
pub fn harness() -> Harness {
    Harness {
        registry: Arc::new(CapabilityRegistry::new()),
        backend: ScriptedReasoningBackend::answering("backend answer"),
        telemetry: InMemoryTelemetrySink::new(),
    }
}

/// Provides an empty conversation context.
#[fixture]
pub fn conversation() -> ConversationContext {
    ConversationContext::new(ConversationId::new())
}

/// Builds a validated plan for `conversation`.
///
/// # Panics
///
/// Panics when the steps do not form a valid plan.
#[must_use]
pub fn plan_for(
    conversation: &ConversationContext,
    strategy: ExecutionStrategy,
    steps: Vec<PlanStep>,
) -> Plan {
    Plan::new(conversation.id(), "scenario task", steps, strategy, &DefaultClock)
        .expect("valid scenario plan")
}
