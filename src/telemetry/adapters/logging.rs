//! Sink rendering telemetry through `tracing`.

use crate::telemetry::{
    domain::{TelemetryEvent, TelemetryRecord},
    ports::TelemetrySink,
};
use tracing::{info, warn};

/// Logs each record at `info`, or `warn` for error events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetrySink;

impl TelemetrySink for TracingTelemetrySink {
    fn emit(&self, record: TelemetryRecord) {
        let conversation_id = record.conversation_id;
        match record.event {
            TelemetryEvent::Error { message } => {
                warn!(target: "ensemble::telemetry", %conversation_id, %message, "error");
            }
            event => {
                let payload = serde_json::to_string(&event).unwrap_or_default();
                info!(
                    target: "ensemble::telemetry",
                    %conversation_id,
                    event = event.name(),
                    %payload,
                    "telemetry"
                );
            }
        }
    }
}
