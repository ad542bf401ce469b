//! Application layer for switchboard
//!
//! This crate contains the collaborator ports, the orchestration services
//! and the chat use case. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod services;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    agent::{Agent, AgentCallError, AgentFactory, ResponseStream},
    feature_flags::{FeatureFlagProvider, StaticFeatureFlags},
    intent_classifier::{IntentClassifier, IntentContext, IntentError},
    standard_chat::{StandardChat, StandardChatError},
    telemetry::{NoTelemetry, TelemetryEvent, TelemetrySink},
};
pub use services::{
    agent_pool::{AgentLease, AgentPoolManager, InstanceInfo, PoolError},
    recovery_coordinator::{HandledError, RecoveryCoordinator, RecoveryPlanner},
    routing_engine::RoutingDecisionEngine,
};
pub use use_cases::orchestrate_chat::{
    OrchestrateChatUseCase, OrchestratedResponse, OrchestratedStream, OrchestratorError,
    ResponseSource, UserActionRequired,
};
