//! Telemetry sink port.

use crate::telemetry::domain::TelemetryRecord;

/// Receives telemetry records.
///
/// Emission is synchronous and infallible from the caller's point of view;
/// implementations drop records they cannot deliver.
pub trait TelemetrySink: Send + Sync {
    /// Publishes one record.
    fn emit(&self, record: TelemetryRecord);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn emit(&self, _record: TelemetryRecord) {}
}
