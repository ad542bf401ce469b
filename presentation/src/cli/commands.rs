//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use switchboard_domain::AgentType;

/// CLI arguments for switchboard
#[derive(Parser, Debug)]
#[command(name = "switchboard")]
#[command(author, version, about = "Agent routing, pooling and recovery for chat requests")]
#[command(long_about = r#"
Switchboard decides whether a chat request goes to a specialized agent
(web search, code interpreter, local knowledge, URL pull) or to standard
chat, runs agents from a warm pool, and recovers from agent failures.

Configuration files are loaded from (in priority order):
1. SWITCHBOARD_* environment variables (e.g. SWITCHBOARD_ROUTING__ENABLED=true)
2. --config <path>          Explicit config file
3. ./switchboard.toml       Project-level config
4. ~/.config/switchboard/config.toml   Global config

Example:
  switchboard route --user alice "what's the latest on the rust 2024 edition?"
  switchboard classify --agent url-pull "404 Not Found"
  switchboard simulate --agent web-search --fail "Rate limit exceeded (429)" --failures 2 "news today"
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the routing decision for a query
    Route {
        /// User the request is made for (drives rollout and overrides)
        #[arg(short, long, default_value = "anonymous")]
        user: String,

        /// Force a specific agent type
        #[arg(long, value_name = "TYPE")]
        force: Option<AgentType>,

        /// Agent types enabled for this request (repeatable)
        #[arg(long = "enable", value_name = "TYPE")]
        enabled: Vec<AgentType>,

        /// The chat query
        query: String,
    },

    /// Classify an agent failure and show the recovery plan
    Classify {
        /// Agent type that produced the failure
        #[arg(short, long, value_name = "TYPE")]
        agent: AgentType,

        /// Retries already attempted
        #[arg(long, default_value_t = 0)]
        retry_count: u32,

        /// Raw error message
        message: String,
    },

    /// Show the retry delay schedule for the configured policy
    Backoff,

    /// Run a query through the orchestrator with scripted agents
    Simulate {
        /// Agent type to script (also forced for the request)
        #[arg(short, long, value_name = "TYPE")]
        agent: AgentType,

        /// Error message the scripted agent fails with
        #[arg(long, value_name = "MESSAGE")]
        fail: Option<String>,

        /// Number of calls that fail before the agent succeeds
        #[arg(long, default_value_t = 1)]
        failures: u32,

        /// User the request is made for
        #[arg(short, long, default_value = "simulator")]
        user: String,

        /// Stream the answer instead of waiting for it
        #[arg(long)]
        stream: bool,

        /// The chat query
        query: String,
    },

    /// Show the effective configuration
    Config {
        /// Also list the configuration files consulted
        #[arg(long)]
        show_sources: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_parses_agent_types() {
        let cli = Cli::parse_from([
            "switchboard",
            "route",
            "--user",
            "alice",
            "--force",
            "url",
            "--enable",
            "web-search",
            "--enable",
            "code_interpreter",
            "summarize this",
        ]);
        match cli.command {
            Command::Route {
                user,
                force,
                enabled,
                query,
            } => {
                assert_eq!(user, "alice");
                assert_eq!(force, Some(AgentType::UrlPull));
                assert_eq!(enabled, vec![AgentType::WebSearch, AgentType::CodeInterpreter]);
                assert_eq!(query, "summarize this");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["switchboard", "backoff", "-vv", "--json", "--no-config"]);
        assert!(matches!(cli.command, Command::Backoff));
        assert_eq!(cli.verbose, 2);
        assert!(cli.json);
        assert!(cli.no_config);
    }

    #[test]
    fn test_unknown_agent_type_is_rejected() {
        let result = Cli::try_parse_from(["switchboard", "classify", "--agent", "oracle", "boom"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
