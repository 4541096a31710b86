//! Port contracts for the reasoning backend.

pub mod backend;

pub use backend::{BackendError, BackendResult, ReasoningBackend, StreamChunk};

#[cfg(test)]
pub use backend::MockReasoningBackend;
