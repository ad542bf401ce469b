//! Feature flags backed by the `[routing]` configuration section.

use crate::config::FileRoutingConfig;
use async_trait::async_trait;
use std::collections::BTreeMap;
use switchboard_application::FeatureFlagProvider;
use switchboard_domain::{RoutingFlags, UserContext};
use tracing::warn;

/// Serves the configured flags, with per-user overrides taking precedence.
#[derive(Debug, Clone, Default)]
pub struct ConfigFeatureFlagProvider {
    base: RoutingFlags,
    users: BTreeMap<String, RoutingFlags>,
}

impl ConfigFeatureFlagProvider {
    pub fn new(base: RoutingFlags) -> Self {
        Self {
            base,
            users: BTreeMap::new(),
        }
    }

    /// Build from config; invalid values fall back and are logged.
    pub fn from_config(config: &FileRoutingConfig) -> Self {
        let (base, base_issues) = config.to_flags();
        let (users, user_issues) = config.user_flags();
        for issue in base_issues.iter().chain(&user_issues) {
            warn!("{}", issue.message);
        }
        Self { base, users }
    }

    pub fn with_user_override(mut self, user_id: impl Into<String>, flags: RoutingFlags) -> Self {
        self.users.insert(user_id.into(), flags);
        self
    }

    pub fn flags_for(&self, user_id: &str) -> &RoutingFlags {
        self.users.get(user_id).unwrap_or(&self.base)
    }
}

#[async_trait]
impl FeatureFlagProvider for ConfigFeatureFlagProvider {
    async fn routing_flags(&self, user: &UserContext) -> RoutingFlags {
        self.flags_for(&user.user_id).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_override_wins_for_matching_user_only() {
        let toml_str = r#"
enabled = true
rollout_percentage = 5

[users.beta-tester]
rollout_percentage = 100
enable_streaming = true
"#;
        let config: FileRoutingConfig = toml::from_str(toml_str).unwrap();
        let provider = ConfigFeatureFlagProvider::from_config(&config);

        let tester = provider
            .routing_flags(&UserContext::new("beta-tester"))
            .await;
        assert_eq!(tester.rollout_percentage, 100);
        assert!(tester.enable_streaming);

        let other = provider.routing_flags(&UserContext::new("someone")).await;
        assert_eq!(other.rollout_percentage, 5);
        assert!(!other.enable_streaming);
    }

    #[tokio::test]
    async fn test_default_provider_keeps_routing_off() {
        let provider = ConfigFeatureFlagProvider::default();
        let flags = provider.routing_flags(&UserContext::new("anyone")).await;
        assert!(!flags.agent_routing_enabled);
    }
}
