//! Routing domain module
//!
//! Feature flags, the rollout gate, intent analysis results, and the
//! routing decision value.

pub mod decision;
pub mod flags;
pub mod intent;
pub mod rollout;

pub use decision::RoutingDecision;
pub use flags::RoutingFlags;
pub use intent::IntentAnalysis;
pub use rollout::{is_in_rollout, rollout_percentile};
