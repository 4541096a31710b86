//! Worker transport port and the opaque handles the registry indexes.

use crate::conversation::domain::ConversationContext;
use crate::worker::domain::{WorkerId, WorkerReply, WorkerTask};
use async_trait::async_trait;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use thiserror::Error;

/// Result type for worker transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Message-passing contract for a single worker.
///
/// Each call sends one task and resolves to exactly one reply. Timeouts are
/// applied by the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkerTransport: Send + Sync {
    /// Sends `task` with the caller's context snapshot and awaits the reply.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the message cannot be delivered or
    /// the reply cannot be received.
    async fn send(
        &self,
        task: WorkerTask,
        context: ConversationContext,
    ) -> TransportResult<WorkerReply>;
}

/// Errors returned by worker transport adapters.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The worker is no longer reachable.
    #[error("worker {0} is unavailable")]
    Unavailable(String),

    /// Generic transport failure.
    #[error("worker transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    /// Wraps a transport-layer error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}

/// Opaque, comparable reference to a live worker.
///
/// Handles compare and hash by their [`WorkerId`] only, so the same handle
/// can be indexed under several capabilities and skills. The registry does
/// not own the worker; it only stores clones of the handle.
#[derive(Clone)]
pub struct WorkerHandle {
    id: WorkerId,
    name: String,
    transport: Arc<dyn WorkerTransport>,
}

impl WorkerHandle {
    /// Creates a handle with a fresh identifier.
    #[must_use]
    pub fn new(name: impl Into<String>, transport: Arc<dyn WorkerTransport>) -> Self {
        Self {
            id: WorkerId::new(),
            name: name.into(),
            transport,
        }
    }

    /// Creates a handle wrapping a concrete transport.
    #[must_use]
    pub fn from_transport<T>(name: impl Into<String>, transport: T) -> Self
    where
        T: WorkerTransport + 'static,
    {
        Self::new(name, Arc::new(transport))
    }

    /// Returns the handle identifier.
    #[must_use]
    pub const fn id(&self) -> WorkerId {
        self.id
    }

    /// Returns the human-readable worker name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sends a task through the underlying transport.
    ///
    /// # Errors
    ///
    /// Propagates [`TransportError`] from the transport adapter.
    pub async fn send(
        &self,
        task: WorkerTask,
        context: ConversationContext,
    ) -> TransportResult<WorkerReply> {
        self.transport.send(task, context).await
    }
}

impl PartialEq for WorkerHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for WorkerHandle {}

impl Hash for WorkerHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for WorkerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
