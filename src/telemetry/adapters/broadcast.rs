//! Fan-out sink for live dashboards.

use crate::telemetry::{domain::TelemetryRecord, ports::TelemetrySink};
use tokio::sync::broadcast;
use tracing::trace;

/// Publishes records on a bounded broadcast channel.
///
/// Slow subscribers lag and lose old records; with no subscribers records
/// are dropped.
#[derive(Debug, Clone)]
pub struct BroadcastTelemetrySink {
    sender: broadcast::Sender<TelemetryRecord>,
}

impl BroadcastTelemetrySink {
    /// Creates a sink buffering up to `capacity` records per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Opens a new subscription receiving records emitted from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TelemetryRecord> {
        self.sender.subscribe()
    }
}

impl TelemetrySink for BroadcastTelemetrySink {
    fn emit(&self, record: TelemetryRecord) {
        if self.sender.send(record).is_err() {
            trace!("telemetry record dropped, no subscribers");
        }
    }
}
