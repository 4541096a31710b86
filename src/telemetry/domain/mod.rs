//! Telemetry event model.

mod event;

pub use event::{TelemetryEvent, TelemetryRecord};
