//! Pool sizing and lifecycle policy

use crate::agent::AgentType;
use crate::core::error::DomainError;
use std::collections::BTreeMap;
use std::time::Duration;

/// Pool sizing and lifecycle parameters.
///
/// | Field | Default | Meaning |
/// |-------|---------|---------|
/// | `min_pool_size` | 1 | instances pre-warmed per type by `initialize` |
/// | `max_pool_size` | 5 | upper bound per type unless overridden |
/// | `idle_timeout` | 5 min | idle instances older than this are evicted |
/// | `health_check_interval` | 60 s | period of the background probe |
/// | `acquire_timeout` | 10 s | how long `get_agent` waits on a full pool |
#[derive(Debug, Clone, PartialEq)]
pub struct PoolConfig {
    pub min_pool_size: usize,
    pub max_pool_size: usize,
    pub max_pool_size_overrides: BTreeMap<AgentType, usize>,
    pub idle_timeout: Duration,
    pub health_check_interval: Duration,
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_pool_size: 1,
            max_pool_size: 5,
            max_pool_size_overrides: BTreeMap::new(),
            idle_timeout: Duration::from_secs(300),
            health_check_interval: Duration::from_secs(60),
            acquire_timeout: Duration::from_secs(10),
        }
    }
}

impl PoolConfig {
    /// Effective maximum pool size for an agent type.
    pub fn max_pool_size_for(&self, agent_type: AgentType) -> usize {
        self.max_pool_size_overrides
            .get(&agent_type)
            .copied()
            .unwrap_or(self.max_pool_size)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.min_pool_size > self.max_pool_size {
            return Err(DomainError::InvalidPoolBounds {
                min: self.min_pool_size,
                max: self.max_pool_size,
            });
        }
        Ok(())
    }

    // ==================== Builder Methods ====================

    pub fn with_min_pool_size(mut self, size: usize) -> Self {
        self.min_pool_size = size;
        self
    }

    pub fn with_max_pool_size(mut self, size: usize) -> Self {
        self.max_pool_size = size;
        self
    }

    pub fn with_max_pool_size_for(mut self, agent_type: AgentType, size: usize) -> Self {
        self.max_pool_size_overrides.insert(agent_type, size);
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_health_check_interval(mut self, interval: Duration) -> Self {
        self.health_check_interval = interval;
        self
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}
