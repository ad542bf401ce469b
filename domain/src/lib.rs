//! Domain layer for switchboard
//!
//! This crate contains the pure types and rules of agent orchestration.
//! It has no dependencies on an async runtime, I/O, or concrete agents.
//!
//! # Core Concepts
//!
//! ## Agent types
//!
//! Every chat request is handled either by a specialized agent
//! ([`AgentType::WebSearch`], [`AgentType::CodeInterpreter`], ...) or by the
//! baseline [`AgentType::StandardChat`] path. Per-type settings travel as the
//! [`AgentConfig`] tagged union.
//!
//! ## Routing
//!
//! [`RoutingFlags`] gate the agent path per user, the stable
//! [`rollout_percentile`] hash admits a fraction of users, and the outcome is
//! captured in a [`RoutingDecision`].
//!
//! ## Recovery
//!
//! Raw agent failures are turned into structured [`AgentError`]s by
//! [`ErrorClassifier`], using a static per-type pattern table. Each error
//! carries a [`RecoveryStrategy`] that [`recover`] turns into an
//! [`ErrorRecoveryResult`].

pub mod agent;
pub mod core;
pub mod pool;
pub mod recovery;
pub mod routing;

// Re-export commonly used types
pub use agent::{
    agent_type::AgentType,
    config::{
        AgentConfig, CodeInterpreterSettings, LocalKnowledgeSettings, StandardChatSettings,
        UrlPullSettings, WebSearchSettings,
    },
    request::{AgentContext, AgentSettings, ChatMessage, ChatRequest, MessageRole, UserContext},
    response::AgentResponse,
};
pub use core::error::DomainError;
pub use pool::{
    config::PoolConfig,
    health::{ExecutionOutcome, HealthProbe, HealthStatus, SLOW_PROBE_THRESHOLD},
    snapshot::{PoolSnapshot, TypeSnapshot},
    value_objects::InstanceId,
};
pub use recovery::{
    agent_error::{AgentError, ErrorContext},
    classifier::ErrorClassifier,
    patterns::ErrorPattern,
    stats::ErrorStats,
    strategy::{ErrorRecoveryResult, RetryPolicy, UserAction, alternative_agents, recover},
    taxonomy::{ErrorCategory, ErrorSeverity, RecoveryStrategy},
};
pub use routing::{
    decision::RoutingDecision,
    flags::RoutingFlags,
    intent::IntentAnalysis,
    rollout::{is_in_rollout, rollout_percentile},
};
