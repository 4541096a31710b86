//! Port contracts for telemetry.

pub mod sink;

pub use sink::{NoopTelemetrySink, TelemetrySink};
