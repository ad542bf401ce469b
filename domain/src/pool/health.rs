//! Instance health classification.
//!
//! Health moves in two ways: every returned execution reclassifies the
//! instance ([`ExecutionOutcome::health_status`]), and the periodic probe
//! reclassifies every instance ([`HealthProbe::status`]).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A probe reporting healthy is still downgraded to degraded above this.
pub const SLOW_PROBE_THRESHOLD: Duration = Duration::from_millis(5_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[default]
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of an agent's self-reported health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthProbe {
    pub healthy: bool,
    pub response_time: Duration,
}

impl HealthProbe {
    pub fn healthy(response_time: Duration) -> Self {
        Self {
            healthy: true,
            response_time,
        }
    }

    pub fn unhealthy(response_time: Duration) -> Self {
        Self {
            healthy: false,
            response_time,
        }
    }

    pub fn status(&self) -> HealthStatus {
        if !self.healthy {
            HealthStatus::Unhealthy
        } else if self.response_time > SLOW_PROBE_THRESHOLD {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }
}

/// What happened during a borrowed instance's execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Success,
    Failure(String),
}

impl ExecutionOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success)
    }

    /// Timeouts only degrade an instance; any other failure marks it unhealthy.
    pub fn health_status(&self) -> HealthStatus {
        match self {
            ExecutionOutcome::Success => HealthStatus::Healthy,
            ExecutionOutcome::Failure(message) => {
                let lower = message.to_lowercase();
                if lower.contains("timeout") || lower.contains("timed out") {
                    HealthStatus::Degraded
                } else {
                    HealthStatus::Unhealthy
                }
            }
        }
    }
}
