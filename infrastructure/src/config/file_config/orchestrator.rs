//! Orchestrator configuration from TOML (`[orchestrator]` section)

use serde::{Deserialize, Serialize};

/// ```toml
/// [orchestrator]
/// request_timeout_ms = 30000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOrchestratorConfig {
    /// Budget for one agent invocation
    pub request_timeout_ms: u64,
}

impl Default for FileOrchestratorConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 30_000,
        }
    }
}
