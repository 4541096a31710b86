//! Conversation identity and append-only context snapshots.
//!
//! Every accepted task belongs to a conversation. The conversation context
//! carries the ordered message history and free-form metadata (including the
//! `maxLoops` retry budget). Contexts are never mutated in place: adding a
//! message produces a new snapshot, so each dispatched step observes a
//! coherent view of the history.

pub mod domain;

#[cfg(test)]
mod tests;
