//! Task acceptance: the entry point callers submit work through.
//!
//! The coordinator owns one dispatcher and one planner and serves many
//! conversations at once. Each submission is planned (falling back to a
//! single direct step when planning fails), executed to a final answer and
//! folded into the conversation's stored history, so follow-up tasks on the
//! same conversation see what came before. Submissions on one conversation
//! run one at a time; different conversations proceed independently.
//!
//! - Inbound request types in [`domain`]
//! - The [`services::Coordinator`] itself in [`services`]

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
