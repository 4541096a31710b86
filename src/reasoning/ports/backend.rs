//! Text-completion port.

use crate::conversation::domain::ChatMessage;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Result type for reasoning backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Incremental output of a streaming completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamChunk {
    /// A fragment of completion text.
    Token(String),
    /// Terminal marker; no further chunks follow.
    Done,
}

/// Black-box text-completion service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// Produces a single completion for the ordered `messages`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the service fails or returns an
    /// unusable response.
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        system_prompt: String,
    ) -> BackendResult<String>;

    /// Streams a completion as tokens followed by [`StreamChunk::Done`].
    ///
    /// The default implementation emits the full [`Self::complete`] output
    /// as a single token.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the underlying completion fails.
    async fn complete_stream(
        &self,
        messages: Vec<ChatMessage>,
        system_prompt: String,
    ) -> BackendResult<mpsc::Receiver<StreamChunk>> {
        let text = self.complete(messages, system_prompt).await?;
        let (sender, receiver) = mpsc::channel(2);
        sender
            .try_send(StreamChunk::Token(text))
            .map_err(|_| BackendError::StreamClosed)?;
        sender
            .try_send(StreamChunk::Done)
            .map_err(|_| BackendError::StreamClosed)?;
        Ok(receiver)
    }
}

/// Errors returned by reasoning backend adapters.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The backend refused or could not serve the request.
    #[error("reasoning backend unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with something unusable.
    #[error("invalid reasoning backend response: {0}")]
    InvalidResponse(String),

    /// The streaming receiver was dropped before the stream finished.
    #[error("reasoning backend stream closed")]
    StreamClosed,

    /// Generic transport failure.
    #[error("reasoning backend transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl BackendError {
    /// Wraps a transport-layer error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
