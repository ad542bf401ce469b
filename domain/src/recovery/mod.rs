//! Error recovery domain module
//!
//! The error taxonomy, the static per-agent-type pattern table, the total
//! classifier built on it, and the pure recovery strategies.

pub mod agent_error;
pub mod classifier;
pub mod patterns;
pub mod stats;
pub mod strategy;
pub mod taxonomy;

pub use agent_error::{AgentError, ErrorContext};
pub use classifier::ErrorClassifier;
pub use patterns::ErrorPattern;
pub use stats::ErrorStats;
pub use strategy::{ErrorRecoveryResult, RetryPolicy, UserAction, alternative_agents, recover};
pub use taxonomy::{ErrorCategory, ErrorSeverity, RecoveryStrategy};
