//! Pool observable

use super::health::HealthStatus;
use crate::agent::AgentType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Point-in-time view of one agent type's pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeSnapshot {
    pub total: usize,
    pub active: usize,
    pub healthy: usize,
    pub degraded: usize,
    pub unhealthy: usize,
}

impl TypeSnapshot {
    pub fn record(&mut self, is_active: bool, health: HealthStatus) {
        self.total += 1;
        if is_active {
            self.active += 1;
        }
        match health {
            HealthStatus::Healthy => self.healthy += 1,
            HealthStatus::Degraded => self.degraded += 1,
            HealthStatus::Unhealthy => self.unhealthy += 1,
        }
    }
}

/// Point-in-time view of the whole agent pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub total_agents: usize,
    pub active_agents: usize,
    pub idle_agents: usize,
    /// Fraction of acquisitions served by an existing instance
    pub hit_rate: f64,
    /// Fraction of acquisitions that had to create an instance
    pub miss_rate: f64,
    pub avg_execution_time_ms: f64,
    /// Sum of the footprints reported by pooled agents
    pub memory_usage_bytes: usize,
    pub by_type: BTreeMap<AgentType, TypeSnapshot>,
}

impl PoolSnapshot {
    /// Derive hit/miss rates from raw counters; both are 0 before any acquisition.
    pub fn rates(hits: u64, misses: u64) -> (f64, f64) {
        let total = hits + misses;
        if total == 0 {
            return (0.0, 0.0);
        }
        (hits as f64 / total as f64, misses as f64 / total as f64)
    }
}
