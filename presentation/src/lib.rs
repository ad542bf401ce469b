//! Presentation layer for switchboard
//!
//! This crate contains the CLI definitions and the console/JSON
//! formatting of routing decisions, recovery plans and snapshots.

pub mod cli;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{Cli, Command};
pub use output::console::{BackoffStep, ConsoleFormatter};
