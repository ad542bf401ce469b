//! Telemetry routed into the `tracing` pipeline under the `telemetry` target.

use switchboard_application::{TelemetryEvent, TelemetrySink};
use tracing::info;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetrySink;

impl TelemetrySink for TracingTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        info!(target: "telemetry", event = event.name, fields = %event.fields);
    }
}
