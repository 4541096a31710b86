//! Plans: ordered step graphs produced for one task.
//!
//! A plan is a validated DAG of steps plus an execution strategy. Planners
//! turn free task text into plans either heuristically (keyword tables and
//! the registry) or by asking a reasoning backend for a structured plan and
//! parsing its answer. The module follows hexagonal architecture:
//!
//! - Domain types and validation in [`domain`]
//! - The planner port in [`ports`]
//! - Heuristic, reasoning-backed and fallback planners in [`services`]

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
