//! Feature flag port

use async_trait::async_trait;
use switchboard_domain::{RoutingFlags, UserContext};

/// Supplies agent-routing flags per user.
///
/// Implementations must not fail: on any internal error they return
/// [`RoutingFlags::default()`], which keeps routing off.
#[async_trait]
pub trait FeatureFlagProvider: Send + Sync {
    async fn routing_flags(&self, user: &UserContext) -> RoutingFlags;
}

/// Returns the same flags for every user.
pub struct StaticFeatureFlags {
    flags: RoutingFlags,
}

impl StaticFeatureFlags {
    pub fn new(flags: RoutingFlags) -> Self {
        Self { flags }
    }
}

#[async_trait]
impl FeatureFlagProvider for StaticFeatureFlags {
    async fn routing_flags(&self, _user: &UserContext) -> RoutingFlags {
        self.flags.clone()
    }
}
