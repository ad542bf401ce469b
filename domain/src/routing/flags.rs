//! Agent routing feature flags

use crate::agent::AgentType;
use serde::{Deserialize, Serialize};

/// Per-user routing flags supplied by the feature-flag provider.
///
/// [`Default`] is the safe configuration every provider falls back to when
/// it cannot evaluate flags: routing off, baseline agent type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingFlags {
    pub agent_routing_enabled: bool,
    /// Agent type reported when the agent path is not taken
    pub agent_type: AgentType,
    /// Share of users (0-100) admitted to agent routing
    pub rollout_percentage: u32,
    pub fallback_on_error: bool,
    pub enable_streaming: bool,
    pub rate_limit_multiplier: f64,
}

impl Default for RoutingFlags {
    fn default() -> Self {
        Self {
            agent_routing_enabled: false,
            agent_type: AgentType::BASELINE,
            rollout_percentage: 0,
            fallback_on_error: true,
            enable_streaming: false,
            rate_limit_multiplier: 1.0,
        }
    }
}

impl RoutingFlags {
    /// Fully enabled flags admitting every user.
    pub fn enabled_for_all() -> Self {
        Self {
            agent_routing_enabled: true,
            rollout_percentage: 100,
            ..Self::default()
        }
    }

    pub fn with_rollout_percentage(mut self, percentage: u32) -> Self {
        self.rollout_percentage = percentage.min(100);
        self
    }
}
