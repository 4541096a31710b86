//! Shared builders for dispatch tests.

use std::sync::Arc;

use crate::conversation::domain::{ConversationContext, ConversationId};
use crate::plan::domain::{ExecutionStrategy, Plan, PlanStep};
use crate::registry::services::CapabilityRegistry;
use crate::worker::{adapters::memory::ScriptedWorker, ports::WorkerHandle};
use mockable::DefaultClock;

pub(super) fn plan(
    conversation_id: ConversationId,
    strategy: ExecutionStrategy,
    steps: Vec<PlanStep>,
) -> Plan {
    Plan::new(conversation_id, "research task", steps, strategy, &DefaultClock)
        .expect("valid plan")
}

pub(super) fn context() -> ConversationContext {
    ConversationContext::new(ConversationId::new())
}

pub(super) fn register(
    registry: &CapabilityRegistry,
    capability: &str,
    skills: &[&str],
    worker: ScriptedWorker,
) -> WorkerHandle {
    let handle = WorkerHandle::from_transport(capability, worker);
    registry.register_with_skills(&handle, capability, skills.iter().copied());
    handle
}

pub(super) fn registry() -> Arc<CapabilityRegistry> {
    Arc::new(CapabilityRegistry::new())
}
