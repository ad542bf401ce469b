//! Telemetry sinks
//!
//! Adapters for the [`TelemetrySink`](switchboard_application::TelemetrySink)
//! port. Every sink swallows its own failures.

mod buffered;
mod jsonl;
mod tracing_sink;

pub use buffered::BufferedTelemetrySink;
pub use jsonl::JsonlTelemetrySink;
pub use tracing_sink::TracingTelemetrySink;
