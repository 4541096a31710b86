//! Recording sink for tests.

use crate::telemetry::{
    domain::{TelemetryEvent, TelemetryRecord},
    ports::TelemetrySink,
};
use std::sync::{Arc, Mutex};

/// Stores every record in emission order.
///
/// Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTelemetrySink {
    records: Arc<Mutex<Vec<TelemetryRecord>>>,
}

impl InMemoryTelemetrySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every record emitted so far.
    #[must_use]
    pub fn records(&self) -> Vec<TelemetryRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Returns the event payloads emitted so far.
    #[must_use]
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.records()
            .into_iter()
            .map(|record| record.event)
            .collect()
    }

    /// Returns the messages of every error event.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                TelemetryEvent::Error { message } => Some(message),
                _ => None,
            })
            .collect()
    }
}

impl TelemetrySink for InMemoryTelemetrySink {
    fn emit(&self, record: TelemetryRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }
}
