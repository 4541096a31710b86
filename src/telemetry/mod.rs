//! Fire-and-forget orchestration events for external dashboards.
//!
//! The dispatcher emits discrete events (plan computed, step dispatched,
//! step completed, aggregate completed, error) at fixed points of a run.
//! Sinks never influence control flow: losing an event must not change the
//! outcome of a conversation.
//!
//! - Event types in [`domain`]
//! - The sink port in [`ports`]
//! - Tracing, in-memory and broadcast sinks in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
