//! Capability and skill registry for dynamic worker discovery.
//!
//! Workers advertise a capability name and a set of skill tags when they
//! start; the dispatcher and the planners query the registry to find live
//! workers. The registry is a process-local concurrent directory and the
//! only state shared between conversations. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - The concurrent directory in [`services`]

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
