//! Pool configuration from TOML (`[pool]` section)

use crate::config::issues::{ConfigIssue, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use switchboard_domain::{AgentType, DomainError, PoolConfig};

/// Raw pool configuration from TOML
///
/// # Example
///
/// ```toml
/// [pool]
/// min_size = 1
/// max_size = 5
/// idle_timeout_secs = 300
/// health_check_interval_secs = 60
/// acquire_timeout_ms = 10000
///
/// [pool.max_size_overrides]
/// code-interpreter = 2
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePoolConfig {
    pub min_size: usize,
    pub max_size: usize,
    pub idle_timeout_secs: u64,
    pub health_check_interval_secs: u64,
    pub acquire_timeout_ms: u64,
    /// Per-agent-type maximum, keyed by agent type name
    pub max_size_overrides: BTreeMap<String, usize>,
}

impl Default for FilePoolConfig {
    fn default() -> Self {
        let pool = PoolConfig::default();
        Self {
            min_size: pool.min_pool_size,
            max_size: pool.max_pool_size,
            idle_timeout_secs: pool.idle_timeout.as_secs(),
            health_check_interval_secs: pool.health_check_interval.as_secs(),
            acquire_timeout_ms: pool.acquire_timeout.as_millis() as u64,
            max_size_overrides: BTreeMap::new(),
        }
    }
}

impl FilePoolConfig {
    pub fn to_pool_config(&self) -> (PoolConfig, Vec<ConfigIssue>) {
        let mut issues = Vec::new();

        let max_pool_size = if self.max_size == 0 {
            issues.push(ConfigIssue::out_of_range(
                Severity::Error,
                "pool.max_size",
                self.max_size,
                ">= 1",
                "using 1",
            ));
            1
        } else {
            self.max_size
        };

        let mut config = PoolConfig::default()
            .with_min_pool_size(self.min_size)
            .with_max_pool_size(max_pool_size)
            .with_idle_timeout(Duration::from_secs(self.idle_timeout_secs))
            .with_health_check_interval(Duration::from_secs(self.health_check_interval_secs))
            .with_acquire_timeout(Duration::from_millis(self.acquire_timeout_ms));

        if let Err(DomainError::InvalidPoolBounds { min, max }) = config.validate() {
            issues.push(ConfigIssue::out_of_range(
                Severity::Warning,
                "pool.min_size",
                min,
                &format!("<= max_size ({})", max),
                "clamping to max_size",
            ));
            config.min_pool_size = max;
        }

        for (name, size) in &self.max_size_overrides {
            match name.parse::<AgentType>() {
                Ok(agent_type) => config = config.with_max_pool_size_for(agent_type, *size),
                Err(_) => issues.push(ConfigIssue::unknown_agent_type(
                    "pool.max_size_overrides",
                    name,
                    "ignoring override",
                )),
            }
        }

        (config, issues)
    }
}
