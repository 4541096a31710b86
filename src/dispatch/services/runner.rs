//! Execution of a single step, including the clarification sub-protocol.

use super::StepTarget;
use crate::config::OrchestratorConfig;
use crate::conversation::domain::{ChatMessage, ConversationContext};
use crate::dispatch::domain::StepFailure;
use crate::reasoning::ports::ReasoningBackend;
use crate::registry::services::CapabilityRegistry;
use crate::worker::domain::{ClarificationRequest, StepOutput, WorkerReply, WorkerTask};
use crate::worker::ports::WorkerHandle;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// System prompt used when a step or clarification runs on the reasoning
/// backend.
pub const LOCAL_SYSTEM_PROMPT: &str =
    "You are a capable generalist completing one step of a larger task. Answer the step directly.";

/// A step's successful outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSuccess {
    /// The step result.
    pub output: StepOutput,
    /// Updated context returned by the worker, if any.
    pub context: Option<ConversationContext>,
}

/// Runs one step on its target with timeouts applied.
///
/// A worker may answer with a clarification request instead of a result.
/// The runner asks a different worker matching the request's capabilities
/// or skills (the reasoning backend when there is none), appends the answer
/// to the task and asks the original worker again, up to the configured
/// number of rounds.
#[derive(Clone)]
pub struct StepRunner {
    registry: Arc<CapabilityRegistry>,
    backend: Arc<dyn ReasoningBackend>,
    worker_timeout: Duration,
    backend_timeout: Duration,
    max_clarification_rounds: u32,
}

impl StepRunner {
    /// Creates a runner using the timeouts and round limit in `config`.
    #[must_use]
    pub const fn new(
        registry: Arc<CapabilityRegistry>,
        backend: Arc<dyn ReasoningBackend>,
        config: &OrchestratorConfig,
    ) -> Self {
        Self {
            registry,
            backend,
            worker_timeout: config.worker_timeout(),
            backend_timeout: config.backend_timeout(),
            max_clarification_rounds: config.max_clarification_rounds,
        }
    }

    /// Executes `task` on `target`.
    ///
    /// # Errors
    ///
    /// Returns [`StepFailure`] when the worker fails, times out or cannot be
    /// reached, when local execution fails, or when the clarification limit
    /// is exceeded.
    pub async fn run(
        &self,
        target: &StepTarget,
        task: WorkerTask,
        context: &ConversationContext,
    ) -> Result<StepSuccess, StepFailure> {
        match target {
            StepTarget::Local => {
                let text = self.run_locally(&task.text, context).await?;
                Ok(StepSuccess {
                    output: StepOutput::new(text),
                    context: None,
                })
            }
            StepTarget::Worker { handle, .. } => self.run_on_worker(handle, task, context).await,
        }
    }

    async fn run_locally(
        &self,
        prompt: &str,
        context: &ConversationContext,
    ) -> Result<String, StepFailure> {
        let mut messages = context.history().to_vec();
        messages.push(ChatMessage::user(prompt));
        tokio::time::timeout(
            self.backend_timeout,
            self.backend.complete(messages, LOCAL_SYSTEM_PROMPT.to_owned()),
        )
        .await
        .map_err(|_| StepFailure::Timeout {
            timeout_ms: millis(self.backend_timeout),
        })?
        .map_err(StepFailure::from)
    }

    async fn run_on_worker(
        &self,
        handle: &WorkerHandle,
        task: WorkerTask,
        context: &ConversationContext,
    ) -> Result<StepSuccess, StepFailure> {
        let mut current = task;
        let mut rounds = 0_u32;
        loop {
            match self.send(handle, current.clone(), context).await? {
                WorkerReply::Completed {
                    output,
                    context: updated,
                } => {
                    return Ok(StepSuccess {
                        output,
                        context: updated,
                    });
                }
                WorkerReply::Failed { reason } => return Err(StepFailure::Worker(reason)),
                WorkerReply::ClarificationNeeded(request) => {
                    if rounds >= self.max_clarification_rounds {
                        warn!(worker = %handle, rounds, "clarification limit reached");
                        return Err(StepFailure::ClarificationExhausted {
                            rounds: self.max_clarification_rounds,
                        });
                    }
                    rounds += 1;
                    debug!(
                        worker = %handle,
                        round = rounds,
                        question = %request.question,
                        "clarification requested"
                    );
                    let answer = self.clarify(handle, &request, context).await?;
                    current = current.with_appended_text(&format!(
                        "Clarification requested: {}\nAnswer: {}",
                        request.question.trim(),
                        answer.trim()
                    ));
                }
            }
        }
    }

    async fn send(
        &self,
        handle: &WorkerHandle,
        task: WorkerTask,
        context: &ConversationContext,
    ) -> Result<WorkerReply, StepFailure> {
        tokio::time::timeout(self.worker_timeout, handle.send(task, context.clone()))
            .await
            .map_err(|_| StepFailure::Timeout {
                timeout_ms: millis(self.worker_timeout),
            })?
            .map_err(StepFailure::from)
    }

    async fn clarify(
        &self,
        asking: &WorkerHandle,
        request: &ClarificationRequest,
        context: &ConversationContext,
    ) -> Result<String, StepFailure> {
        if let Some(helper) = self.find_helper(asking, request) {
            let question = WorkerTask::new(request.question.clone());
            match self.send(&helper, question, context).await {
                Ok(WorkerReply::Completed { output, .. }) => return Ok(output.text),
                Ok(_) => debug!(helper = %helper, "helper did not answer the clarification"),
                Err(err) => warn!(helper = %helper, error = %err, "clarification helper failed"),
            }
        }
        self.run_locally(&request.question, context).await
    }

    /// Finds a worker other than `asking` matching the request's
    /// capabilities, then all of its skills, then any of its skills.
    fn find_helper(
        &self,
        asking: &WorkerHandle,
        request: &ClarificationRequest,
    ) -> Option<WorkerHandle> {
        let distinct = |handles: HashSet<WorkerHandle>| {
            handles
                .into_iter()
                .filter(|handle| handle != asking)
                .min_by_key(WorkerHandle::id)
        };
        let by_capability: HashSet<WorkerHandle> = request
            .capabilities
            .iter()
            .flat_map(|capability| self.registry.find_agents(capability))
            .collect();

        distinct(by_capability)
            .or_else(|| distinct(self.registry.find_agents_by_all_skills(&request.skills)))
            .or_else(|| distinct(self.registry.find_agents_by_any_skill(&request.skills)))
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
