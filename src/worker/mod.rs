//! Worker transport boundary.
//!
//! A worker is anything that accepts a task and eventually answers with
//! text, a failure, or a clarification question. Workers are reachable
//! through the [`ports::WorkerTransport`] port and referenced by opaque
//! [`ports::WorkerHandle`] values that the registry indexes.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
