//! Telemetry configuration from TOML (`[telemetry]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where telemetry events go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileTelemetrySink {
    /// Structured `tracing` events under the `telemetry` target
    #[default]
    Tracing,
    /// One JSON object per line in `path`
    Jsonl,
    None,
}

/// Raw telemetry configuration from TOML
///
/// ```toml
/// [telemetry]
/// sink = "jsonl"
/// path = "~/.local/share/switchboard/telemetry.jsonl"
/// buffer_capacity = 1024
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTelemetryConfig {
    pub sink: FileTelemetrySink,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Events buffered between the request path and the sink
    pub buffer_capacity: usize,
}

impl Default for FileTelemetryConfig {
    fn default() -> Self {
        Self {
            sink: FileTelemetrySink::default(),
            path: None,
            buffer_capacity: 1024,
        }
    }
}

impl FileTelemetryConfig {
    /// Configured JSONL path, or `<data dir>/switchboard/telemetry.jsonl`.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(|| {
            dirs::data_local_dir().map(|d| d.join("switchboard").join("telemetry.jsonl"))
        })
    }
}
