//! Infrastructure layer for switchboard
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod flags;
pub mod intent;
pub mod simulation;
pub mod telemetry;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigIssue, ConfigIssueCode, ConfigLoader, ConfigSource, FileAgentsConfig,
    FileConfig, FileOrchestratorConfig, FilePoolConfig, FileRecoveryConfig, FileRoutingConfig,
    FileRoutingOverride, FileTelemetryConfig, FileTelemetrySink, Severity,
};
pub use flags::ConfigFeatureFlagProvider;
pub use intent::KeywordIntentClassifier;
pub use simulation::{EchoStandardChat, FailureScript, ScriptedAgentFactory};
pub use telemetry::{BufferedTelemetrySink, JsonlTelemetrySink, TracingTelemetrySink};
