//! Plan aggregate and structural validation.

use super::{ExecutionStrategy, PlanId, PlanStep, PlanningError, StepId};
use crate::conversation::domain::ConversationId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Parallelism bound used when a plan does not declare one.
pub const DEFAULT_MAX_PARALLELISM: usize = 4;

/// Ordered, validated DAG of steps for one task.
///
/// Construction rejects empty plans, steps without descriptions, duplicate
/// ids, dependencies on ids missing from the plan and dependency cycles, so
/// every `Plan` value is executable.
///
/// # Examples
///
/// ```
/// use ensemble::conversation::domain::ConversationId;
/// use ensemble::plan::domain::{ExecutionStrategy, Plan, PlanStep};
/// use mockable::DefaultClock;
///
/// let plan = Plan::new(
///     ConversationId::new(),
///     "research rust",
///     vec![
///         PlanStep::new("step-1", "Search"),
///         PlanStep::new("step-2", "Summarise").with_dependencies(["step-1"]),
///     ],
///     ExecutionStrategy::Sequential,
///     &DefaultClock,
/// )
/// .expect("valid plan");
///
/// assert_eq!(plan.steps().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    id: PlanId,
    conversation_id: ConversationId,
    task: String,
    steps: Vec<PlanStep>,
    strategy: ExecutionStrategy,
    max_parallelism: usize,
    created_at: DateTime<Utc>,
}

impl Plan {
    /// Validates `steps` and creates a plan.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError`] when the plan is empty, a step has an empty
    /// id or description, ids repeat, a dependency is dangling, or the
    /// dependency relation has a cycle.
    pub fn new(
        conversation_id: ConversationId,
        task: impl Into<String>,
        steps: Vec<PlanStep>,
        strategy: ExecutionStrategy,
        clock: &impl Clock,
    ) -> Result<Self, PlanningError> {
        validate(&steps)?;
        Ok(Self {
            id: PlanId::new(),
            conversation_id,
            task: task.into(),
            steps,
            strategy,
            max_parallelism: DEFAULT_MAX_PARALLELISM,
            created_at: clock.utc(),
        })
    }

    /// Creates a single-step plan that runs the task text as-is.
    ///
    /// Used when no planner can produce anything better.
    #[must_use]
    pub fn direct(conversation_id: ConversationId, task: &str, clock: &impl Clock) -> Self {
        let description = if task.trim().is_empty() {
            "Respond to the request"
        } else {
            task.trim()
        };
        Self {
            id: PlanId::new(),
            conversation_id,
            task: task.to_owned(),
            steps: vec![PlanStep::new(StepId::numbered(1), description)],
            strategy: ExecutionStrategy::Sequential,
            max_parallelism: 1,
            created_at: clock.utc(),
        }
    }

    /// Sets the parallelism bound; values below one are raised to one.
    #[must_use]
    pub fn with_max_parallelism(mut self, max_parallelism: usize) -> Self {
        self.max_parallelism = max_parallelism.max(1);
        self
    }

    /// Returns the plan identifier.
    #[must_use]
    pub const fn id(&self) -> PlanId {
        self.id
    }

    /// Returns the owning conversation.
    #[must_use]
    pub const fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    /// Returns the original task text.
    #[must_use]
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Returns the steps in declaration order.
    #[must_use]
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Returns the execution strategy.
    #[must_use]
    pub const fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// Returns the parallelism bound.
    #[must_use]
    pub const fn max_parallelism(&self) -> usize {
        self.max_parallelism
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Looks up a step by id.
    #[must_use]
    pub fn step(&self, id: &StepId) -> Option<&PlanStep> {
        self.steps.iter().find(|step| step.id() == id)
    }

    /// Looks up a step by id for mutation.
    pub fn step_mut(&mut self, id: &StepId) -> Option<&mut PlanStep> {
        self.steps.iter_mut().find(|step| step.id() == id)
    }

    /// Returns the last step in declaration order.
    #[must_use]
    pub fn last_step(&self) -> Option<&PlanStep> {
        self.steps.last()
    }

    /// Returns every `(step, dependency)` edge in declaration order.
    #[must_use]
    pub fn dependency_edges(&self) -> Vec<(StepId, StepId)> {
        self.steps
            .iter()
            .flat_map(|step| {
                step.dependencies()
                    .iter()
                    .map(|dependency| (step.id().clone(), dependency.clone()))
            })
            .collect()
    }
}

/// Returns `true` when the dependency relation among `steps` has a cycle.
///
/// Dependencies on ids absent from `steps` are ignored here; validation
/// reports them separately.
///
/// # Examples
///
/// ```
/// use ensemble::plan::domain::{PlanStep, has_cycle};
///
/// let steps = vec![
///     PlanStep::new("a", "first").with_dependencies(["b"]),
///     PlanStep::new("b", "second").with_dependencies(["a"]),
/// ];
/// assert!(has_cycle(&steps));
/// ```
#[must_use]
pub fn has_cycle(steps: &[PlanStep]) -> bool {
    find_cycle(steps).is_some()
}

fn validate(steps: &[PlanStep]) -> Result<(), PlanningError> {
    if steps.is_empty() {
        return Err(PlanningError::EmptyPlan);
    }

    let mut seen: BTreeSet<&StepId> = BTreeSet::new();
    for (index, step) in steps.iter().enumerate() {
        if step.id().is_empty() {
            return Err(PlanningError::MalformedPlan(format!(
                "step {} has an empty id",
                index + 1
            )));
        }
        if step.description().trim().is_empty() {
            return Err(PlanningError::EmptyDescription(step.id().clone()));
        }
        if !seen.insert(step.id()) {
            return Err(PlanningError::DuplicateStep(step.id().clone()));
        }
    }

    for step in steps {
        if let Some(dependency) = step
            .dependencies()
            .iter()
            .find(|dependency| !seen.contains(dependency))
        {
            return Err(PlanningError::UnknownDependency {
                step: step.id().clone(),
                dependency: dependency.clone(),
            });
        }
    }

    find_cycle(steps).map_or(Ok(()), |step| Err(PlanningError::Cycle(step)))
}

fn find_cycle(steps: &[PlanStep]) -> Option<StepId> {
    let adjacency: HashMap<&StepId, &BTreeSet<StepId>> = steps
        .iter()
        .map(|step| (step.id(), step.dependencies()))
        .collect();
    let mut visiting = HashSet::new();
    let mut visited = HashSet::new();
    steps
        .iter()
        .find_map(|step| visit(step.id(), &adjacency, &mut visiting, &mut visited))
        .cloned()
}

fn visit<'a>(
    node: &'a StepId,
    adjacency: &HashMap<&'a StepId, &'a BTreeSet<StepId>>,
    visiting: &mut HashSet<&'a StepId>,
    visited: &mut HashSet<&'a StepId>,
) -> Option<&'a StepId> {
    if visited.contains(node) {
        return None;
    }
    if !visiting.insert(node) {
        return Some(node);
    }
    if let Some(&dependencies) = adjacency.get(node) {
        for dependency in dependencies {
            if let Some(found) = visit(dependency, adjacency, visiting, visited) {
                return Some(found);
            }
        }
    }
    visiting.remove(node);
    visited.insert(node);
    None
}
