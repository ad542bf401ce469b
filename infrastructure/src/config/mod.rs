//! Configuration file loading for switchboard
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `SWITCHBOARD_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./switchboard.toml` or `./.switchboard.toml`
//! 4. Global: `$XDG_CONFIG_HOME/switchboard/config.toml`
//! 5. Default values

mod file_config;
mod issues;
mod loader;

pub use file_config::{
    FileAgentsConfig, FileConfig, FileOrchestratorConfig, FilePoolConfig, FileRecoveryConfig,
    FileRoutingConfig, FileRoutingOverride, FileTelemetryConfig, FileTelemetrySink,
};
pub use issues::{ConfigIssue, ConfigIssueCode, Severity};
pub use loader::{ConfigError, ConfigLoader, ConfigSource, ENV_PREFIX};
