//! Unit tests for telemetry sinks.
