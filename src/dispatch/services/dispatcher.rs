//! The per-conversation control loop.

use super::{StepMatcher, StepRunner, StepSuccess, compose_step_prompt};
use crate::config::OrchestratorConfig;
use crate::conversation::domain::{ChatMessage, ConversationContext, ConversationId};
use crate::dispatch::domain::{
    ConversationFailure, DispatchOutcome, ExecutionState, FinalAnswer, StepFailure, aggregate,
    is_satisfactory,
};
use crate::plan::domain::{Plan, StepId};
use crate::reasoning::ports::ReasoningBackend;
use crate::registry::services::CapabilityRegistry;
use crate::telemetry::domain::{TelemetryEvent, TelemetryRecord};
use crate::telemetry::ports::TelemetrySink;
use crate::worker::domain::{TaskMessageId, WorkerTask};
use mockable::Clock;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

/// Task metadata key carrying the step id.
pub const STEP_ID_KEY: &str = "stepId";
/// Task metadata key carrying the plan id.
pub const PLAN_ID_KEY: &str = "planId";
/// Task metadata key carrying the attempt number.
pub const ATTEMPT_KEY: &str = "attempt";

/// A step outcome routed back to the control loop.
#[derive(Debug)]
pub(crate) struct ReplyEnvelope {
    pub(crate) message_id: TaskMessageId,
    pub(crate) outcome: Result<StepSuccess, StepFailure>,
}

/// Whether the control loop keeps going after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Finished,
}

/// Executes plans, one control loop per accepted task.
///
/// The loop alternates between dispatching the ready set and awaiting
/// replies on its inbox. Step runners execute on spawned tasks and report
/// back through the inbox, so only the loop touches the
/// [`ExecutionState`]. When every step is terminal, the last step's result
/// is checked with [`is_satisfactory`]; unsatisfactory results re-run the
/// last step while the plan-wide attempt budget lasts.
pub struct Dispatcher<C>
where
    C: Clock + Send + Sync + 'static,
{
    matcher: StepMatcher,
    runner: StepRunner,
    telemetry: Arc<dyn TelemetrySink>,
    clock: Arc<C>,
    config: OrchestratorConfig,
}

impl<C> Clone for Dispatcher<C>
where
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            matcher: self.matcher.clone(),
            runner: self.runner.clone(),
            telemetry: Arc::clone(&self.telemetry),
            clock: Arc::clone(&self.clock),
            config: self.config.clone(),
        }
    }
}

impl<C> Dispatcher<C>
where
    C: Clock + Send + Sync + 'static,
{
    /// Creates a dispatcher.
    #[must_use]
    pub fn new(
        registry: Arc<CapabilityRegistry>,
        backend: Arc<dyn ReasoningBackend>,
        telemetry: Arc<dyn TelemetrySink>,
        clock: Arc<C>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            matcher: StepMatcher::new(Arc::clone(&registry)),
            runner: StepRunner::new(registry, backend, &config),
            telemetry,
            clock,
            config,
        }
    }

    /// Starts executing `plan` on a new task and returns the receiver for
    /// its single outcome.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn(
        &self,
        plan: Plan,
        context: ConversationContext,
    ) -> oneshot::Receiver<DispatchOutcome> {
        let (reply, receiver) = oneshot::channel();
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.run(plan, context, reply).await });
        receiver
    }

    /// Executes `plan` and waits for its outcome.
    ///
    /// # Errors
    ///
    /// Returns [`ConversationFailure`] when recovery options are exhausted.
    pub async fn execute(&self, plan: Plan, context: ConversationContext) -> DispatchOutcome {
        let conversation_id = plan.conversation_id();
        self.spawn(plan, context).await.unwrap_or_else(|_| {
            Err(ConversationFailure::new(
                conversation_id,
                "dispatcher stopped before answering",
            ))
        })
    }

    #[instrument(
        skip_all,
        fields(conversation_id = %plan.conversation_id(), plan_id = %plan.id())
    )]
    async fn run(
        &self,
        plan: Plan,
        context: ConversationContext,
        reply: oneshot::Sender<DispatchOutcome>,
    ) {
        let max_attempts = self.config.max_attempts_for(&context);
        let bound = plan.max_parallelism().min(self.config.max_parallelism);
        let accepted = plan.with_max_parallelism(bound);
        self.emit(
            accepted.conversation_id(),
            TelemetryEvent::PlanComputed {
                steps: accepted.steps().iter().map(|step| step.id().to_string()).collect(),
                dependencies: accepted
                    .dependency_edges()
                    .into_iter()
                    .map(|(step, dependency)| (step.to_string(), dependency.to_string()))
                    .collect(),
            },
        );
        info!(
            steps = accepted.steps().len(),
            strategy = %accepted.strategy(),
            max_attempts,
            "plan accepted"
        );

        let (inbox_sender, mut inbox) = mpsc::channel(accepted.steps().len().max(1));
        let mut state = ExecutionState::new(accepted, context, max_attempts, reply);
        loop {
            self.dispatch_ready(&mut state, &inbox_sender);
            let flow = if state.has_in_flight() {
                match inbox.recv().await {
                    Some(envelope) => self.handle_reply(&mut state, envelope),
                    None => self.finalize(&mut state),
                }
            } else {
                self.settle(&mut state)
            };
            if flow == Flow::Finished {
                return;
            }
        }
    }

    /// Skips blocked steps and dispatches every ready step.
    pub(crate) fn dispatch_ready(
        &self,
        state: &mut ExecutionState,
        inbox: &mpsc::Sender<ReplyEnvelope>,
    ) {
        if state.plan().strategy().is_concurrent() {
            let conversation_id = state.plan().conversation_id();
            for step_id in state.skip_blocked() {
                warn!(step_id = %step_id, "step skipped after dependency failure");
                self.emit(
                    conversation_id,
                    TelemetryEvent::error(format!("step {step_id} skipped: a dependency failed")),
                );
            }
        }
        for step_id in state.ready_steps() {
            self.dispatch_step(state, &step_id, inbox);
        }
    }

    fn dispatch_step(
        &self,
        state: &mut ExecutionState,
        step_id: &StepId,
        inbox: &mpsc::Sender<ReplyEnvelope>,
    ) {
        let Some(step) = state.plan().step(step_id).cloned() else {
            return;
        };
        let target = self.matcher.resolve(&step);
        let message_id = TaskMessageId::new();

        let mut text = compose_step_prompt(state.plan(), &step, state.results());
        if let Some(refinement) = state.refinement(step_id) {
            text.push_str("\n\n");
            text.push_str(&refinement.instruction());
        }
        let task = WorkerTask::with_id(message_id, text)
            .with_metadata(STEP_ID_KEY, Value::String(step_id.to_string()))
            .with_metadata(PLAN_ID_KEY, Value::String(state.plan().id().to_string()))
            .with_metadata(ATTEMPT_KEY, Value::from(state.attempts_used()));

        state.record_dispatch(message_id, step_id, target.handle().cloned());
        info!(
            step_id = %step_id,
            capability = target.capability(),
            correlation_id = %message_id,
            "step dispatched"
        );
        self.emit(
            state.plan().conversation_id(),
            TelemetryEvent::StepDispatched {
                step_id: step_id.to_string(),
                capability: target.capability().to_owned(),
                correlation_id: message_id.to_string(),
            },
        );

        let runner = self.runner.clone();
        let reply_to = inbox.clone();
        let context = state.context().clone();
        tokio::spawn(async move {
            let outcome = runner.run(&target, task, &context).await;
            if reply_to
                .send(ReplyEnvelope {
                    message_id,
                    outcome,
                })
                .await
                .is_err()
            {
                debug!(correlation_id = %message_id, "reply arrived after the run finished");
            }
        });
    }

    /// Folds one step outcome into the state.
    ///
    /// An unknown message id leaves other steps untouched and finishes the
    /// run early with whatever results are available.
    pub(crate) fn handle_reply(&self, state: &mut ExecutionState, envelope: ReplyEnvelope) -> Flow {
        let step_id = match state.take_correlation(envelope.message_id) {
            Ok(step_id) => step_id,
            Err(miss) => {
                warn!(error = %miss, "correlation miss, finishing with available results");
                self.emit(
                    state.plan().conversation_id(),
                    TelemetryEvent::error(miss.to_string()),
                );
                return self.finalize(state);
            }
        };

        match envelope.outcome {
            Ok(success) => {
                self.on_success(state, &step_id, success);
                Flow::Continue
            }
            Err(failure) => self.on_failure(state, &step_id, &failure),
        }
    }

    fn on_success(&self, state: &mut ExecutionState, step_id: &StepId, success: StepSuccess) {
        if let Some(updated) = success.context {
            state.adopt_context(updated);
        }
        state.record_success(step_id, success.output);
        info!(step_id = %step_id, "step completed");
        self.emit(
            state.plan().conversation_id(),
            TelemetryEvent::StepCompleted {
                step_id: step_id.to_string(),
            },
        );
    }

    fn on_failure(
        &self,
        state: &mut ExecutionState,
        step_id: &StepId,
        failure: &StepFailure,
    ) -> Flow {
        let conversation_id = state.plan().conversation_id();
        warn!(step_id = %step_id, error = %failure, "step failed");
        self.emit(
            conversation_id,
            TelemetryEvent::error(format!("step {step_id} failed: {failure}")),
        );

        if state.try_consume_attempt() {
            info!(step_id = %step_id, attempt = state.attempts_used(), "retrying failed step");
            state.prepare_refinement(step_id, Some(failure.to_string()));
            return Flow::Continue;
        }

        state.record_failure(step_id, &failure.to_string());
        if state.plan().strategy().is_concurrent() {
            Flow::Continue
        } else {
            let reason = format!(
                "step {step_id} failed after {} attempts: {failure}",
                state.attempts_used()
            );
            self.fail(state, reason)
        }
    }

    /// Runs when nothing is in flight after a dispatch pass.
    fn settle(&self, state: &mut ExecutionState) -> Flow {
        if state.is_settled() {
            self.evaluate(state)
        } else {
            warn!("no dispatchable steps remain, finishing with available results");
            self.finalize(state)
        }
    }

    fn evaluate(&self, state: &mut ExecutionState) -> Flow {
        let Some(last) = state.plan().last_step().map(|step| step.id().clone()) else {
            return self.finalize(state);
        };
        if is_satisfactory(state.result(&last)) {
            debug!(step_id = %last, "result satisfactory");
            return self.finalize(state);
        }
        if !state.try_consume_attempt() {
            debug!(attempts = state.attempts_used(), "attempt budget exhausted");
            return self.finalize(state);
        }

        info!(step_id = %last, attempt = state.attempts_used(), "refining last step");
        let prior_error = state
            .plan()
            .step(&last)
            .and_then(|step| step.error())
            .map(str::to_owned);
        state.prepare_refinement(&last, prior_error);
        Flow::Continue
    }

    fn finalize(&self, state: &mut ExecutionState) -> Flow {
        let plan = state.plan();
        let completed = state.completed_count();
        if completed == 0 {
            let reason = plan
                .steps()
                .iter()
                .find_map(|step| step.error())
                .map_or_else(
                    || "no step produced a result".to_owned(),
                    |error| format!("no step produced a result: {error}"),
                );
            return self.fail(state, reason);
        }

        let text = match plan.steps() {
            [only] => state
                .result(only.id())
                .map(|output| output.text.clone())
                .unwrap_or_default(),
            _ => aggregate(plan, state.results()),
        };
        let conversation_id = plan.conversation_id();
        self.emit(
            conversation_id,
            TelemetryEvent::AggregateCompleted { length: text.len() },
        );

        let answer = FinalAnswer {
            conversation_id,
            plan_id: plan.id(),
            completed_steps: completed,
            total_steps: plan.steps().len(),
            attempts: state.attempts_used(),
            completed_at: self.clock.utc(),
            context: state.context().with_message(ChatMessage::assistant(text.clone())),
            text,
        };
        info!(
            completed = answer.completed_steps,
            total = answer.total_steps,
            attempts = answer.attempts,
            "conversation finalized"
        );
        if !state.finish(Ok(answer)) {
            debug!("caller stopped waiting for the answer");
        }
        Flow::Finished
    }

    fn fail(&self, state: &mut ExecutionState, reason: String) -> Flow {
        let conversation_id = state.plan().conversation_id();
        warn!(reason = %reason, "conversation failed");
        self.emit(conversation_id, TelemetryEvent::error(reason.clone()));
        if !state.finish(Err(ConversationFailure::new(conversation_id, reason))) {
            debug!("caller stopped waiting for the failure");
        }
        Flow::Finished
    }

    fn emit(&self, conversation_id: ConversationId, event: TelemetryEvent) {
        self.telemetry.emit(TelemetryRecord {
            conversation_id,
            at: self.clock.utc(),
            event,
        });
    }
}
