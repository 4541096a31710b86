//! Telemetry sink implementations.

pub mod broadcast;
pub mod logging;
pub mod memory;
