//! In-memory scripted reasoning backend for tests and offline runs.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::conversation::domain::ChatMessage;
use crate::reasoning::ports::{BackendError, BackendResult, ReasoningBackend};

/// A completion request captured by [`ScriptedReasoningBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCompletion {
    /// Messages sent to the backend.
    pub messages: Vec<ChatMessage>,
    /// System prompt sent to the backend.
    pub system_prompt: String,
}

impl RecordedCompletion {
    /// Returns the text of the last message, or an empty string.
    #[must_use]
    pub fn last_text(&self) -> &str {
        self.messages
            .last()
            .map_or("", |message| message.text.as_str())
    }
}

/// Backend that answers from a queue of scripted responses.
///
/// Responses are consumed in order; the final one is repeated once the queue
/// is down to a single entry.
#[derive(Debug, Clone, Default)]
pub struct ScriptedReasoningBackend {
    state: Arc<Mutex<ScriptedBackendState>>,
    delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct ScriptedBackendState {
    responses: VecDeque<BackendResult<String>>,
    calls: Vec<RecordedCompletion>,
}

impl ScriptedReasoningBackend {
    /// Creates a backend with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend that always answers `text`.
    #[must_use]
    pub fn answering(text: impl Into<String>) -> Self {
        Self::new().with_response(text)
    }

    /// Queues a successful response.
    #[must_use]
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    /// Queues a failure.
    #[must_use]
    pub fn with_error(self, error: BackendError) -> Self {
        self.push(Err(error));
        self
    }

    /// Delays every response.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns every completion request received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCompletion> {
        self.state
            .lock()
            .map(|state| state.calls.clone())
            .unwrap_or_default()
    }

    /// Returns how many completions were requested.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.calls.len())
            .unwrap_or_default()
    }

    fn push(&self, response: BackendResult<String>) {
        if let Ok(mut state) = self.state.lock() {
            state.responses.push_back(response);
        }
    }

    fn next_response(&self, call: RecordedCompletion) -> BackendResult<String> {
        let mut state = self
            .state
            .lock()
            .map_err(|err| BackendError::transport(std::io::Error::other(err.to_string())))?;
        state.calls.push(call);
        let response = if state.responses.len() > 1 {
            state.responses.pop_front()
        } else {
            state.responses.front().cloned()
        };
        response.unwrap_or_else(|| {
            Err(BackendError::Unavailable(
                "no scripted response configured".to_owned(),
            ))
        })
    }
}

#[async_trait]
impl ReasoningBackend for ScriptedReasoningBackend {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        system_prompt: String,
    ) -> BackendResult<String> {
        let response = self.next_response(RecordedCompletion {
            messages,
            system_prompt,
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        response
    }
}
