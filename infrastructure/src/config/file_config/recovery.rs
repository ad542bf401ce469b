//! Recovery configuration from TOML (`[recovery]` section)

use crate::config::issues::{ConfigIssue, Severity};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use switchboard_domain::RetryPolicy;

/// Raw recovery configuration from TOML
///
/// ```toml
/// [recovery]
/// max_retries = 3
/// base_delay_ms = 1000
/// max_delay_ms = 10000
/// history_capacity = 100
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRecoveryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Errors kept per (agent type, category, code)
    pub history_capacity: usize,
}

impl Default for FileRecoveryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_retries: policy.max_retries,
            base_delay_ms: policy.base_delay.as_millis() as u64,
            max_delay_ms: policy.max_delay.as_millis() as u64,
            history_capacity: 100,
        }
    }
}

impl FileRecoveryConfig {
    pub fn to_retry_policy(&self) -> (RetryPolicy, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let max_delay_ms = if self.max_delay_ms < self.base_delay_ms {
            issues.push(ConfigIssue::out_of_range(
                Severity::Warning,
                "recovery.max_delay_ms",
                self.max_delay_ms,
                &format!(">= base_delay_ms ({})", self.base_delay_ms),
                "using base_delay_ms",
            ));
            self.base_delay_ms
        } else {
            self.max_delay_ms
        };

        let policy = RetryPolicy::default()
            .with_max_retries(self.max_retries)
            .with_base_delay(Duration::from_millis(self.base_delay_ms))
            .with_max_delay(Duration::from_millis(max_delay_ms));
        (policy, issues)
    }
}
