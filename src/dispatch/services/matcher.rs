//! Step-to-worker matching.

use crate::plan::domain::PlanStep;
use crate::registry::services::CapabilityRegistry;
use crate::worker::ports::WorkerHandle;
use std::collections::HashSet;
use std::sync::Arc;

/// Capability label reported for steps run on the reasoning backend.
pub const LOCAL_CAPABILITY: &str = "local";

/// Where a step will run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepTarget {
    /// A registered worker.
    Worker {
        /// The chosen worker.
        handle: WorkerHandle,
        /// Capability or worker name used for telemetry.
        capability: String,
    },
    /// Directly on the reasoning backend.
    Local,
}

impl StepTarget {
    /// Returns the capability label for telemetry.
    #[must_use]
    pub fn capability(&self) -> &str {
        match self {
            Self::Worker { capability, .. } => capability,
            Self::Local => LOCAL_CAPABILITY,
        }
    }

    /// Returns the worker handle, if any.
    #[must_use]
    pub const fn handle(&self) -> Option<&WorkerHandle> {
        match self {
            Self::Worker { handle, .. } => Some(handle),
            Self::Local => None,
        }
    }
}

/// Resolves steps to workers through the registry.
///
/// Preference order: the step's assigned worker while it is still
/// registered, its target capability, a worker holding every required
/// skill, a worker holding any required skill, and finally local execution.
/// Every dispatch, including a retry, is resolved against the live
/// registry. Ties are broken by the lowest worker id so resolution is
/// stable.
#[derive(Debug, Clone)]
pub struct StepMatcher {
    registry: Arc<CapabilityRegistry>,
}

impl StepMatcher {
    /// Creates a matcher over `registry`.
    #[must_use]
    pub const fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self { registry }
    }

    /// Picks the target for `step`. Never fails: with no match the step runs
    /// locally.
    #[must_use]
    pub fn resolve(&self, step: &PlanStep) -> StepTarget {
        let pinned = step
            .assigned_worker()
            .filter(|handle| self.registry.is_registered(handle));
        if let Some(handle) = pinned {
            return worker(handle.clone(), handle.name().to_owned());
        }

        let by_capability = step.target_capability().and_then(|capability| {
            self.registry
                .find_agent(capability.as_str())
                .map(|handle| worker(handle, capability.as_str().to_owned()))
        });
        if let Some(target) = by_capability {
            return target;
        }

        let skills = step.required_skills();
        if !skills.is_empty() {
            let candidates = self
                .registry
                .find_agents_by_all_skills(skills.iter())
                .into_iter()
                .min_by_key(WorkerHandle::id)
                .or_else(|| lowest(self.registry.find_agents_by_any_skill(skills.iter())));
            if let Some(handle) = candidates {
                let label = handle.name().to_owned();
                return worker(handle, label);
            }
        }

        StepTarget::Local
    }
}

fn worker(handle: WorkerHandle, capability: String) -> StepTarget {
    StepTarget::Worker { handle, capability }
}

fn lowest(handles: HashSet<WorkerHandle>) -> Option<WorkerHandle> {
    handles.into_iter().min_by_key(WorkerHandle::id)
}
