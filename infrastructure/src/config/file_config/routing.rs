//! Routing configuration from TOML (`[routing]` section)

use crate::config::issues::{ConfigIssue, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use switchboard_domain::{AgentType, RoutingFlags};

/// Raw routing configuration from TOML
///
/// # Example
///
/// ```toml
/// [routing]
/// enabled = true
/// default_agent = "standard-chat"
/// rollout_percentage = 25
/// fallback_on_error = true
/// enable_streaming = false
/// rate_limit_multiplier = 1.0
///
/// [routing.users.alice]
/// rollout_percentage = 100
/// enable_streaming = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRoutingConfig {
    /// Master switch for the agent path
    pub enabled: bool,
    /// Agent type reported when agents are not used
    pub default_agent: String,
    /// Share of users (0-100) admitted to the agent path
    pub rollout_percentage: u32,
    pub fallback_on_error: bool,
    pub enable_streaming: bool,
    pub rate_limit_multiplier: f64,
    /// Per-user overrides keyed by user id
    pub users: BTreeMap<String, FileRoutingOverride>,
}

impl Default for FileRoutingConfig {
    fn default() -> Self {
        let flags = RoutingFlags::default();
        Self {
            enabled: flags.agent_routing_enabled,
            default_agent: flags.agent_type.as_str().to_string(),
            rollout_percentage: flags.rollout_percentage,
            fallback_on_error: flags.fallback_on_error,
            enable_streaming: flags.enable_streaming,
            rate_limit_multiplier: flags.rate_limit_multiplier,
            users: BTreeMap::new(),
        }
    }
}

/// Per-user routing override; unset fields inherit from `[routing]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRoutingOverride {
    pub enabled: Option<bool>,
    pub default_agent: Option<String>,
    pub rollout_percentage: Option<u32>,
    pub fallback_on_error: Option<bool>,
    pub enable_streaming: Option<bool>,
}

fn parse_agent(field: &str, value: &str, fallback: AgentType) -> (AgentType, Vec<ConfigIssue>) {
    match value.parse::<AgentType>() {
        Ok(agent_type) => (agent_type, vec![]),
        Err(_) => (
            fallback,
            vec![ConfigIssue::unknown_agent_type(
                field,
                value,
                &format!("falling back to '{}'", fallback),
            )],
        ),
    }
}

fn clamp_rollout(field: &str, value: u32) -> (u32, Vec<ConfigIssue>) {
    if value > 100 {
        let issue = ConfigIssue::out_of_range(
            Severity::Warning,
            field,
            value,
            "0-100",
            "clamping to 100",
        );
        (100, vec![issue])
    } else {
        (value, vec![])
    }
}

impl FileRoutingConfig {
    /// Parse `default_agent`, falling back to the baseline type.
    pub fn parse_default_agent(&self) -> (AgentType, Vec<ConfigIssue>) {
        parse_agent("routing.default_agent", &self.default_agent, AgentType::BASELINE)
    }

    /// Flags applied to every user without an override.
    pub fn to_flags(&self) -> (RoutingFlags, Vec<ConfigIssue>) {
        let (agent_type, mut issues) = self.parse_default_agent();
        let (rollout_percentage, rollout_issues) =
            clamp_rollout("routing.rollout_percentage", self.rollout_percentage);
        issues.extend(rollout_issues);

        let rate_limit_multiplier =
            if self.rate_limit_multiplier.is_finite() && self.rate_limit_multiplier > 0.0 {
                self.rate_limit_multiplier
            } else {
                issues.push(ConfigIssue::out_of_range(
                    Severity::Warning,
                    "routing.rate_limit_multiplier",
                    self.rate_limit_multiplier,
                    "> 0",
                    "using 1.0",
                ));
                1.0
            };

        let flags = RoutingFlags {
            agent_routing_enabled: self.enabled,
            agent_type,
            rollout_percentage,
            fallback_on_error: self.fallback_on_error,
            enable_streaming: self.enable_streaming,
            rate_limit_multiplier,
        };
        (flags, issues)
    }

    /// Effective flags per overridden user.
    pub fn user_flags(&self) -> (BTreeMap<String, RoutingFlags>, Vec<ConfigIssue>) {
        let (base, _) = self.to_flags();
        let mut issues = Vec::new();
        let mut users = BTreeMap::new();

        for (user_id, entry) in &self.users {
            let mut flags = base.clone();
            if let Some(enabled) = entry.enabled {
                flags.agent_routing_enabled = enabled;
            }
            if let Some(agent) = &entry.default_agent {
                let field = format!("routing.users.{}.default_agent", user_id);
                let (agent_type, agent_issues) = parse_agent(&field, agent, base.agent_type);
                flags.agent_type = agent_type;
                issues.extend(agent_issues);
            }
            if let Some(percentage) = entry.rollout_percentage {
                let field = format!("routing.users.{}.rollout_percentage", user_id);
                let (percentage, rollout_issues) = clamp_rollout(&field, percentage);
                flags.rollout_percentage = percentage;
                issues.extend(rollout_issues);
            }
            if let Some(fallback) = entry.fallback_on_error {
                flags.fallback_on_error = fallback;
            }
            if let Some(streaming) = entry.enable_streaming {
                flags.enable_streaming = streaming;
            }
            users.insert(user_id.clone(), flags);
        }
        (users, issues)
    }
}
