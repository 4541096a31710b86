//! Plan steps and their lifecycle.

use super::StepId;
use crate::registry::domain::{CapabilityName, SkillTag};
use crate::worker::ports::WorkerHandle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Lifecycle status of a plan step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Not yet dispatched.
    #[default]
    Pending,
    /// Dispatched and awaiting a reply.
    Running,
    /// Finished with a result.
    Completed,
    /// Finished with an error.
    Failed,
    /// Never dispatched because a dependency failed.
    Skipped,
}

impl StepStatus {
    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }

    /// Returns `true` once the step can no longer change without a reset.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Skipped)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of work within a plan.
///
/// # Examples
///
/// ```
/// use ensemble::plan::domain::{PlanStep, StepStatus};
///
/// let step = PlanStep::new("step-2", "Summarise the findings")
///     .with_skills(["Summarization"])
///     .with_dependencies(["step-1"]);
///
/// assert_eq!(step.status(), StepStatus::Pending);
/// assert!(step.dependencies().iter().any(|dep| dep.as_str() == "step-1"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PlanStep {
    id: StepId,
    description: String,
    required_skills: BTreeSet<SkillTag>,
    target_capability: Option<CapabilityName>,
    dependencies: BTreeSet<StepId>,
    status: StepStatus,
    assigned_worker: Option<WorkerHandle>,
    last_worker: Option<WorkerHandle>,
    result: Option<String>,
    error: Option<String>,
}

impl PlanStep {
    /// Creates a pending step with no skills, target or dependencies.
    #[must_use]
    pub fn new(id: impl AsRef<str>, description: impl Into<String>) -> Self {
        Self {
            id: StepId::new(id),
            description: description.into(),
            required_skills: BTreeSet::new(),
            target_capability: None,
            dependencies: BTreeSet::new(),
            status: StepStatus::Pending,
            assigned_worker: None,
            last_worker: None,
            result: None,
            error: None,
        }
    }

    /// Adds required skill tags; empty tags are ignored.
    #[must_use]
    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.required_skills.extend(
            skills
                .into_iter()
                .map(SkillTag::new)
                .filter(|skill| !skill.is_empty()),
        );
        self
    }

    /// Sets the explicit target capability; an empty name clears it.
    #[must_use]
    pub fn with_target_capability(mut self, capability: impl AsRef<str>) -> Self {
        let name = CapabilityName::new(capability);
        self.target_capability = (!name.is_empty()).then_some(name);
        self
    }

    /// Adds dependency step identifiers; empty identifiers are ignored.
    #[must_use]
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.dependencies.extend(
            dependencies
                .into_iter()
                .map(StepId::new)
                .filter(|dependency| !dependency.is_empty()),
        );
        self
    }

    /// Pins the step to a specific worker.
    #[must_use]
    pub fn with_assigned_worker(mut self, worker: WorkerHandle) -> Self {
        self.assigned_worker = Some(worker);
        self
    }

    /// Returns the step identifier.
    #[must_use]
    pub const fn id(&self) -> &StepId {
        &self.id
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the required skill tags.
    #[must_use]
    pub const fn required_skills(&self) -> &BTreeSet<SkillTag> {
        &self.required_skills
    }

    /// Returns the explicit target capability, if any.
    #[must_use]
    pub const fn target_capability(&self) -> Option<&CapabilityName> {
        self.target_capability.as_ref()
    }

    /// Returns the identifiers this step depends on.
    #[must_use]
    pub const fn dependencies(&self) -> &BTreeSet<StepId> {
        &self.dependencies
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> StepStatus {
        self.status
    }

    /// Returns the worker this step is pinned to.
    #[must_use]
    pub const fn assigned_worker(&self) -> Option<&WorkerHandle> {
        self.assigned_worker.as_ref()
    }

    /// Returns the worker the most recent dispatch went to, if any.
    #[must_use]
    pub const fn last_worker(&self) -> Option<&WorkerHandle> {
        self.last_worker.as_ref()
    }

    /// Returns the result text of a completed step.
    #[must_use]
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// Returns the error text of a failed or skipped step.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Marks the step as dispatched and records the worker it went to.
    ///
    /// The pin set by [`Self::with_assigned_worker`] is left untouched, so a
    /// re-run is matched afresh.
    pub fn mark_running(&mut self, worker: Option<WorkerHandle>) {
        self.status = StepStatus::Running;
        self.last_worker = worker;
    }

    /// Records a successful result.
    pub fn complete(&mut self, result: impl Into<String>) {
        self.status = StepStatus::Completed;
        self.result = Some(result.into());
        self.error = None;
    }

    /// Records a failure.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = StepStatus::Failed;
        self.result = None;
        self.error = Some(error.into());
    }

    /// Marks the step as never dispatched.
    pub fn skip(&mut self, reason: impl Into<String>) {
        self.status = StepStatus::Skipped;
        self.result = None;
        self.error = Some(reason.into());
    }

    /// Clears result and error and returns the step to `Pending` so it can
    /// be re-run.
    pub fn reset(&mut self) {
        self.status = StepStatus::Pending;
        self.result = None;
        self.error = None;
    }
}
