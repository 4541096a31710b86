//! Working memory of one conversation's plan execution.

use super::{CorrelationMiss, DispatchOutcome};
use crate::conversation::domain::ConversationContext;
use crate::plan::domain::{Plan, StepId, StepStatus};
use crate::worker::domain::{StepOutput, TaskMessageId};
use crate::worker::ports::WorkerHandle;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tokio::sync::oneshot;

/// Note attached to a step that is being re-run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refinement {
    /// Attempt number the re-run belongs to, starting at 2.
    pub attempt: u32,
    /// The attempt budget.
    pub max_attempts: u32,
    /// The previous result, when the step had completed.
    pub prior_result: Option<String>,
    /// The previous error, when the step had failed.
    pub prior_error: Option<String>,
}

impl Refinement {
    /// Renders the instruction appended to the re-run step's prompt.
    #[must_use]
    pub fn instruction(&self) -> String {
        let header = format!(
            "This is refinement attempt {} of {}; improve on the prior result.",
            self.attempt, self.max_attempts
        );
        match (&self.prior_result, &self.prior_error) {
            (Some(result), _) => format!("{header}\nPrior result:\n{result}"),
            (None, Some(error)) => format!("{header}\nThe prior attempt failed: {error}"),
            (None, None) => header,
        }
    }
}

/// Per-conversation execution bookkeeping.
///
/// Owned and mutated by exactly one control loop. Tracks step results, the
/// in-flight set, the correlation of outbound message ids to steps and the
/// plan-wide attempt budget. The reply sender guarantees the outcome is
/// delivered at most once.
#[derive(Debug)]
pub struct ExecutionState {
    plan: Plan,
    context: ConversationContext,
    reply: Option<oneshot::Sender<DispatchOutcome>>,
    results: BTreeMap<StepId, StepOutput>,
    completed: BTreeSet<StepId>,
    in_flight: BTreeSet<StepId>,
    attempts_used: u32,
    max_attempts: u32,
    correlation: HashMap<TaskMessageId, StepId>,
    refinements: HashMap<StepId, Refinement>,
}

impl ExecutionState {
    /// Creates the state for a freshly accepted plan; the first pass counts
    /// as attempt one.
    #[must_use]
    pub fn new(
        plan: Plan,
        context: ConversationContext,
        max_attempts: u32,
        reply: oneshot::Sender<DispatchOutcome>,
    ) -> Self {
        Self {
            plan,
            context,
            reply: Some(reply),
            results: BTreeMap::new(),
            completed: BTreeSet::new(),
            in_flight: BTreeSet::new(),
            attempts_used: 1,
            max_attempts: max_attempts.max(1),
            correlation: HashMap::new(),
            refinements: HashMap::new(),
        }
    }

    /// Returns the plan being executed.
    #[must_use]
    pub const fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Returns the latest context snapshot.
    #[must_use]
    pub const fn context(&self) -> &ConversationContext {
        &self.context
    }

    /// Adopts a context snapshot returned by a worker, if it belongs to
    /// this conversation.
    pub fn adopt_context(&mut self, context: ConversationContext) {
        if context.id() == self.context.id() {
            self.context = context;
        }
    }

    /// Returns step results keyed by step id.
    #[must_use]
    pub const fn results(&self) -> &BTreeMap<StepId, StepOutput> {
        &self.results
    }

    /// Returns the result of one step.
    #[must_use]
    pub fn result(&self, step_id: &StepId) -> Option<&StepOutput> {
        self.results.get(step_id)
    }

    /// Returns the number of completed steps.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    /// Returns `true` while any step awaits a reply.
    #[must_use]
    pub fn has_in_flight(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Returns `true` when `step_id` awaits a reply.
    #[must_use]
    pub fn is_in_flight(&self, step_id: &StepId) -> bool {
        self.in_flight.contains(step_id)
    }

    /// Returns attempts consumed so far.
    #[must_use]
    pub const fn attempts_used(&self) -> u32 {
        self.attempts_used
    }

    /// Returns the attempt budget.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns `true` once every step is terminal and nothing is in flight.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.in_flight.is_empty()
            && self
                .plan
                .steps()
                .iter()
                .all(|step| step.status().is_terminal())
    }

    /// Computes the steps that may be dispatched now.
    ///
    /// Sequential plans release the first pending step in declared order
    /// once nothing is in flight. Concurrent plans release every pending
    /// step whose dependencies have completed, up to the plan's parallelism
    /// bound minus the steps already in flight.
    #[must_use]
    pub fn ready_steps(&self) -> Vec<StepId> {
        let pending = self.plan.steps().iter().filter(|step| {
            step.status() == StepStatus::Pending && !self.is_in_flight(step.id())
        });

        if !self.plan.strategy().is_concurrent() {
            if self.has_in_flight() {
                return Vec::new();
            }
            return pending.take(1).map(|step| step.id().clone()).collect();
        }

        let capacity = self
            .plan
            .max_parallelism()
            .saturating_sub(self.in_flight.len());
        pending
            .filter(|step| step.dependencies().is_subset(&self.completed))
            .take(capacity)
            .map(|step| step.id().clone())
            .collect()
    }

    /// Marks pending steps with a failed or skipped dependency as skipped,
    /// repeating until no more steps are affected. Returns the skipped ids.
    pub fn skip_blocked(&mut self) -> Vec<StepId> {
        let mut skipped = Vec::new();
        loop {
            let blocked: Vec<(StepId, StepId)> = self
                .plan
                .steps()
                .iter()
                .filter(|step| step.status() == StepStatus::Pending)
                .filter_map(|step| {
                    step.dependencies()
                        .iter()
                        .find(|dependency| {
                            self.plan.step(dependency).is_some_and(|candidate| {
                                matches!(
                                    candidate.status(),
                                    StepStatus::Failed | StepStatus::Skipped
                                )
                            })
                        })
                        .map(|dependency| (step.id().clone(), dependency.clone()))
                })
                .collect();
            if blocked.is_empty() {
                return skipped;
            }
            for (step_id, dependency) in blocked {
                if let Some(step) = self.plan.step_mut(&step_id) {
                    step.skip(format!("dependency {dependency} did not complete"));
                }
                skipped.push(step_id);
            }
        }
    }

    /// Records an outbound message for `step_id` before it is sent.
    pub fn record_dispatch(
        &mut self,
        message_id: TaskMessageId,
        step_id: &StepId,
        worker: Option<WorkerHandle>,
    ) {
        self.correlation.insert(message_id, step_id.clone());
        self.in_flight.insert(step_id.clone());
        if let Some(step) = self.plan.step_mut(step_id) {
            step.mark_running(worker);
        }
    }

    /// Consumes the correlation entry for `message_id`.
    ///
    /// # Errors
    ///
    /// Returns [`CorrelationMiss`] when no step awaits that message; the
    /// bookkeeping of other steps is left untouched.
    pub fn take_correlation(
        &mut self,
        message_id: TaskMessageId,
    ) -> Result<StepId, CorrelationMiss> {
        let step_id = self
            .correlation
            .remove(&message_id)
            .ok_or(CorrelationMiss { message_id })?;
        self.in_flight.remove(&step_id);
        Ok(step_id)
    }

    /// Stores a successful result.
    pub fn record_success(&mut self, step_id: &StepId, output: StepOutput) {
        if let Some(step) = self.plan.step_mut(step_id) {
            step.complete(output.text.clone());
        }
        self.refinements.remove(step_id);
        self.completed.insert(step_id.clone());
        self.results.insert(step_id.clone(), output);
    }

    /// Marks a step as permanently failed for this pass.
    pub fn record_failure(&mut self, step_id: &StepId, reason: &str) {
        if let Some(step) = self.plan.step_mut(step_id) {
            step.fail(reason);
        }
        self.refinements.remove(step_id);
        self.completed.remove(step_id);
        self.results.remove(step_id);
    }

    /// Consumes one attempt from the plan-wide budget, returning `false`
    /// when the budget is exhausted.
    pub fn try_consume_attempt(&mut self) -> bool {
        if self.attempts_used >= self.max_attempts {
            return false;
        }
        self.attempts_used += 1;
        true
    }

    /// Clears a step's result and status so it is dispatched again with a
    /// refinement note built from its previous outcome.
    pub fn prepare_refinement(&mut self, step_id: &StepId, prior_error: Option<String>) {
        let prior_result = self.results.remove(step_id).map(|output| output.text);
        self.completed.remove(step_id);
        if let Some(step) = self.plan.step_mut(step_id) {
            step.reset();
        }
        self.refinements.insert(
            step_id.clone(),
            Refinement {
                attempt: self.attempts_used,
                max_attempts: self.max_attempts,
                prior_result,
                prior_error,
            },
        );
    }

    /// Returns the refinement note for a step being re-run.
    #[must_use]
    pub fn refinement(&self, step_id: &StepId) -> Option<&Refinement> {
        self.refinements.get(step_id)
    }

    /// Delivers the outcome to the caller. Only the first call has any
    /// effect; returns whether this call delivered it.
    pub fn finish(&mut self, outcome: DispatchOutcome) -> bool {
        self.reply
            .take()
            .is_some_and(|reply| reply.send(outcome).is_ok())
    }

    /// Returns `true` once the outcome has been handed over.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.reply.is_none()
    }
}
