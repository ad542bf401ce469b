//! Routing decision value object

use super::flags::RoutingFlags;
use crate::agent::AgentType;
use serde::{Deserialize, Serialize};

/// The outcome of routing one request.
///
/// `agent_type` is always populated, even when `should_use_agents` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub should_use_agents: bool,
    pub agent_type: AgentType,
    /// Confidence in `[0, 1]`
    pub confidence: f64,
    pub reason: String,
    /// Flags in effect when the decision was made, if they were fetched
    pub flags_snapshot: Option<RoutingFlags>,
}

impl RoutingDecision {
    pub fn use_agent(
        agent_type: AgentType,
        confidence: f64,
        reason: impl Into<String>,
        flags: Option<RoutingFlags>,
    ) -> Self {
        Self {
            should_use_agents: true,
            agent_type,
            confidence: confidence.clamp(0.0, 1.0),
            reason: reason.into(),
            flags_snapshot: flags,
        }
    }

    pub fn no_agents(
        agent_type: AgentType,
        confidence: f64,
        reason: impl Into<String>,
        flags: Option<RoutingFlags>,
    ) -> Self {
        Self {
            should_use_agents: false,
            agent_type,
            confidence: confidence.clamp(0.0, 1.0),
            reason: reason.into(),
            flags_snapshot: flags,
        }
    }

    /// Fail-closed decision used when routing itself errors.
    pub fn routing_failed() -> Self {
        Self::no_agents(AgentType::BASELINE, 0.0, "routing failed", None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_clamped() {
        let decision = RoutingDecision::use_agent(AgentType::WebSearch, 1.7, "forced", None);
        assert_eq!(decision.confidence, 1.0);
        let decision = RoutingDecision::no_agents(AgentType::WebSearch, -0.2, "off", None);
        assert_eq!(decision.confidence, 0.0);
    }

    #[test]
    fn test_routing_failed_is_closed() {
        let decision = RoutingDecision::routing_failed();
        assert!(!decision.should_use_agents);
        assert_eq!(decision.confidence, 0.0);
        assert_eq!(decision.reason, "routing failed");
        assert_eq!(decision.agent_type, AgentType::StandardChat);
    }
}
