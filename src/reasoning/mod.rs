//! Reasoning backend boundary.
//!
//! The reasoning backend is a black-box text-completion service used for
//! plan decomposition and for executing steps locally when no worker
//! matches. Only its port and an in-memory scripted adapter live here.

pub mod adapters;
pub mod ports;

#[cfg(test)]
mod tests;
