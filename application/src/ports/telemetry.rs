//! Port for fire-and-forget telemetry.
//!
//! Defines the [`TelemetrySink`] trait for recording orchestration events
//! (routing decisions, agent errors, fallbacks) to an external sink.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures machine-readable
//! events for dashboards.

use serde_json::Value;

/// A structured telemetry event.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryEvent {
    /// Event name (e.g., "routing_decision", "agent_error").
    pub name: &'static str,
    /// JSON payload with event-specific fields.
    pub fields: Value,
}

impl TelemetryEvent {
    pub fn new(name: &'static str, fields: Value) -> Self {
        Self { name, fields }
    }
}

/// Port for recording telemetry events.
///
/// `record` is synchronous and non-fallible: it must return promptly and
/// swallow its own failures so callers are never blocked or disrupted.
pub trait TelemetrySink: Send + Sync {
    fn record(&self, event: TelemetryEvent);
}

/// No-op implementation for tests and when telemetry is disabled.
pub struct NoTelemetry;

impl TelemetrySink for NoTelemetry {
    fn record(&self, _event: TelemetryEvent) {}
}
