//! Plan execution: the per-conversation dispatch state machine.
//!
//! Given a validated plan and a conversation context, the dispatcher
//! repeatedly computes the ready set, matches each ready step to a worker
//! (or runs it locally on the reasoning backend), correlates asynchronous
//! replies back to their steps, retries failures within a plan-wide attempt
//! budget, and finally aggregates step results into one answer. Each run is
//! owned by a single control loop, so its bookkeeping needs no locking.
//!
//! - Execution state, aggregation and satisfaction policy in [`domain`]
//! - Worker matching, step execution and the control loop in [`services`]

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
