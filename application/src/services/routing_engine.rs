//! Routing decision engine
//!
//! Decides whether a request takes the agent path and which agent type
//! handles it. Routing priority:
//!
//!  1. `force_agent_type` on the request wins outright (confidence 1.0)
//!  2. `agent_routing_enabled` flag off → standard chat
//!  3. user outside the rollout percentile → standard chat
//!  4. request settings with `enabled = false` → standard chat
//!  5. intent classifier recommendation, restricted to the request's
//!     enabled agent types
//!
//! The engine fails closed: any error yields
//! [`RoutingDecision::routing_failed`] and `decide` never returns an error.

use crate::ports::feature_flags::FeatureFlagProvider;
use crate::ports::intent_classifier::{IntentClassifier, IntentContext, IntentError};
use std::sync::Arc;
use switchboard_domain::{ChatRequest, RoutingDecision, rollout_percentile};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
enum RoutingError {
    #[error(transparent)]
    Intent(#[from] IntentError),
}

pub struct RoutingDecisionEngine {
    flags: Arc<dyn FeatureFlagProvider>,
    intent: Arc<dyn IntentClassifier>,
}

impl RoutingDecisionEngine {
    pub fn new(flags: Arc<dyn FeatureFlagProvider>, intent: Arc<dyn IntentClassifier>) -> Self {
        Self { flags, intent }
    }

    /// Route a request for `request.user`.
    pub async fn decide(&self, request: &ChatRequest) -> RoutingDecision {
        match self.try_decide(request).await {
            Ok(decision) => {
                debug!(
                    request_id = %request.request_id,
                    agent_type = %decision.agent_type,
                    use_agents = decision.should_use_agents,
                    "Routing decision: {}",
                    decision.reason
                );
                decision
            }
            Err(e) => {
                warn!(request_id = %request.request_id, "Routing failed, using standard chat: {}", e);
                RoutingDecision::routing_failed()
            }
        }
    }

    async fn try_decide(&self, request: &ChatRequest) -> Result<RoutingDecision, RoutingError> {
        let flags = self.flags.routing_flags(&request.user).await;

        if let Some(forced) = request.force_agent_type {
            return Ok(RoutingDecision::use_agent(
                forced,
                1.0,
                format!("Agent type forced to {}", forced),
                Some(flags),
            ));
        }

        if !flags.agent_routing_enabled {
            return Ok(RoutingDecision::no_agents(
                flags.agent_type,
                1.0,
                "Agent routing is disabled",
                Some(flags),
            ));
        }

        let percentile = rollout_percentile(&request.user.user_id);
        if percentile >= flags.rollout_percentage {
            return Ok(RoutingDecision::no_agents(
                flags.agent_type,
                1.0,
                format!(
                    "User not in rollout group (percentile {} >= {}%)",
                    percentile, flags.rollout_percentage
                ),
                Some(flags),
            ));
        }

        if let Some(settings) = &request.agent_settings
            && settings.enabled == Some(false)
        {
            return Ok(RoutingDecision::no_agents(
                flags.agent_type,
                1.0,
                "Agents disabled in request settings",
                Some(flags),
            ));
        }

        let analysis = self
            .intent
            .analyze(&IntentContext::from_request(request))
            .await?;

        let enabled = request.enabled_agent_types();
        let (agent_type, reason) = match enabled.first() {
            Some(first) if !enabled.contains(&analysis.recommended_agent) => (
                *first,
                format!(
                    "{} (recommended {} is not enabled, using {})",
                    analysis.reasoning, analysis.recommended_agent, first
                ),
            ),
            _ => (analysis.recommended_agent, analysis.reasoning.clone()),
        };

        if agent_type.is_baseline() {
            return Ok(RoutingDecision::no_agents(
                agent_type,
                analysis.confidence,
                reason,
                Some(flags),
            ));
        }

        Ok(RoutingDecision::use_agent(
            agent_type,
            analysis.confidence,
            reason,
            Some(flags),
        ))
    }
}
