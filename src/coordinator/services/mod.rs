//! Coordinator service.

mod coordinator;

pub use coordinator::Coordinator;
