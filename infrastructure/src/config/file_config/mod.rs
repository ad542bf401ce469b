//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to domain types by the
//! `to_*` methods, which report problems as [`ConfigIssue`]s.

mod agents;
mod orchestrator;
mod pool;
mod recovery;
mod routing;
mod telemetry;

pub use agents::FileAgentsConfig;
pub use orchestrator::FileOrchestratorConfig;
pub use pool::FilePoolConfig;
pub use recovery::FileRecoveryConfig;
pub use routing::{FileRoutingConfig, FileRoutingOverride};
pub use telemetry::{FileTelemetryConfig, FileTelemetrySink};

use super::issues::{ConfigIssue, ConfigIssueCode, Severity};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use switchboard_application::ExecutionParams;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Routing flags and per-user overrides
    pub routing: FileRoutingConfig,
    /// Agent pool sizing and lifecycle
    pub pool: FilePoolConfig,
    /// Retry policy and error history
    pub recovery: FileRecoveryConfig,
    /// Per-request execution limits
    pub orchestrator: FileOrchestratorConfig,
    /// Telemetry sink selection
    pub telemetry: FileTelemetryConfig,
    /// Settings handed to the agent factory
    pub agents: FileAgentsConfig,
}

impl FileConfig {
    /// Execution parameters for the orchestrator and recovery coordinator.
    pub fn execution_params(&self) -> ExecutionParams {
        let (retry, _) = self.recovery.to_retry_policy();
        ExecutionParams::default()
            .with_request_timeout(Duration::from_millis(self.orchestrator.request_timeout_ms))
            .with_retry(retry)
            .with_error_history_capacity(self.recovery.history_capacity)
    }

    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.routing.to_flags().1);
        issues.extend(self.routing.user_flags().1);
        issues.extend(self.pool.to_pool_config().1);
        issues.extend(self.recovery.to_retry_policy().1);
        issues.extend(self.agents.validate());

        if self.orchestrator.request_timeout_ms == 0 {
            issues.push(ConfigIssue::out_of_range(
                Severity::Error,
                "orchestrator.request_timeout_ms",
                0,
                "> 0",
                "every agent call will time out",
            ));
        }

        if self.telemetry.sink == FileTelemetrySink::Jsonl && self.telemetry.resolved_path().is_none()
        {
            issues.push(ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::MissingValue {
                    field: "telemetry.path".to_string(),
                },
                message: "telemetry.path: no path configured and no data directory found, \
                          falling back to tracing"
                    .to_string(),
            });
        }

        if self.telemetry.buffer_capacity == 0 {
            issues.push(ConfigIssue::out_of_range(
                Severity::Warning,
                "telemetry.buffer_capacity",
                0,
                ">= 1",
                "using 1",
            ));
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_domain::AgentType;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[routing]
enabled = true
rollout_percentage = 25

[pool]
max_size = 3

[recovery]
max_retries = 2
base_delay_ms = 500

[orchestrator]
request_timeout_ms = 5000

[telemetry]
sink = "jsonl"
path = "/tmp/switchboard.jsonl"

[agents.web_search]
max_results = 10
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(config.routing.enabled);
        assert_eq!(config.routing.rollout_percentage, 25);
        assert_eq!(config.pool.max_size, 3);
        assert_eq!(config.telemetry.sink, FileTelemetrySink::Jsonl);
        assert_eq!(config.agents.web_search.max_results, 10);
        assert!(config.validate().is_empty());

        let params = config.execution_params();
        assert_eq!(params.request_timeout, Duration::from_secs(5));
        assert_eq!(params.retry.max_retries, 2);
        assert_eq!(params.retry.base_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: FileConfig = toml::from_str("[pool]\nmin_size = 2\n").unwrap();
        assert_eq!(config.pool.min_size, 2);
        // Defaults should apply
        assert!(!config.routing.enabled);
        assert_eq!(config.recovery.max_retries, 3);
        assert_eq!(config.telemetry.sink, FileTelemetrySink::Tracing);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(FileConfig::default().validate().is_empty());
    }

    #[test]
    fn test_validate_reports_every_section() {
        let toml_str = r#"
[routing]
default_agent = "oracle"

[pool.max_size_overrides]
teleport = 1

[orchestrator]
request_timeout_ms = 0
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().any(|i| i.severity == Severity::Error));
        assert!(matches!(
            &issues[0].code,
            ConfigIssueCode::InvalidEnumValue { field, .. } if field == "routing.default_agent"
        ));
        assert_eq!(config.routing.parse_default_agent().0, AgentType::StandardChat);
    }
}
