//! In-memory scripted worker for tests and local deterministic flows.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::conversation::domain::ConversationContext;
use crate::worker::{
    domain::{WorkerReply, WorkerTask},
    ports::{TransportError, TransportResult, WorkerTransport},
};

/// Worker that answers from a queue of scripted replies.
///
/// Replies are consumed in order; once the queue holds a single reply it is
/// repeated for every further task. Every received task is recorded so tests
/// can assert on invocation counts and prompt contents.
#[derive(Debug, Clone, Default)]
pub struct ScriptedWorker {
    state: Arc<Mutex<ScriptedWorkerState>>,
    delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct ScriptedWorkerState {
    replies: VecDeque<WorkerReply>,
    received: Vec<WorkerTask>,
}

impl ScriptedWorker {
    /// Creates a worker with no scripted replies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a worker that always completes with `text`.
    #[must_use]
    pub fn replying(text: impl Into<String>) -> Self {
        Self::new().with_reply(WorkerReply::completed(text))
    }

    /// Creates a worker that always fails with `reason`.
    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::new().with_reply(WorkerReply::failed(reason))
    }

    /// Queues a reply.
    #[must_use]
    pub fn with_reply(self, reply: WorkerReply) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.replies.push_back(reply);
        }
        self
    }

    /// Delays every reply, simulating network latency.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns every task received so far.
    #[must_use]
    pub fn received(&self) -> Vec<WorkerTask> {
        self.state
            .lock()
            .map(|state| state.received.clone())
            .unwrap_or_default()
    }

    /// Returns how many tasks were received.
    #[must_use]
    pub fn invocations(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.received.len())
            .unwrap_or_default()
    }

    fn next_reply(&self, task: WorkerTask) -> TransportResult<WorkerReply> {
        let mut state = self
            .state
            .lock()
            .map_err(|err| TransportError::transport(std::io::Error::other(err.to_string())))?;
        state.received.push(task);
        let reply = if state.replies.len() > 1 {
            state.replies.pop_front()
        } else {
            state.replies.front().cloned()
        };
        Ok(reply.unwrap_or_else(|| WorkerReply::failed("no scripted reply configured")))
    }
}

#[async_trait]
impl WorkerTransport for ScriptedWorker {
    async fn send(
        &self,
        task: WorkerTask,
        _context: ConversationContext,
    ) -> TransportResult<WorkerReply> {
        let reply = self.next_reply(task)?;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(reply)
    }
}
