//! Port contracts for reaching workers.

pub mod transport;

pub use transport::{TransportError, TransportResult, WorkerHandle, WorkerTransport};

#[cfg(test)]
pub use transport::MockWorkerTransport;
