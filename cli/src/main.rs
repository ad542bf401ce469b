//! CLI entrypoint for switchboard
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use switchboard_application::{
    AgentPoolManager, NoTelemetry, OrchestrateChatUseCase, RecoveryCoordinator,
    RoutingDecisionEngine, TelemetrySink,
};
use switchboard_domain::{AgentSettings, AgentType, ChatRequest, ErrorContext, UserContext};
use switchboard_infrastructure::{
    BufferedTelemetrySink, ConfigFeatureFlagProvider, ConfigLoader, EchoStandardChat,
    FailureScript, FileConfig, FileTelemetrySink, JsonlTelemetrySink, KeywordIntentClassifier,
    ScriptedAgentFactory, Severity, TracingTelemetrySink,
};
use switchboard_presentation::{BackoffStep, Cli, Command, ConsoleFormatter};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting switchboard");

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };

    for issue in config.validate() {
        match issue.severity {
            Severity::Error => error!("{}", issue.message),
            Severity::Warning => warn!("{}", issue.message),
        }
    }

    match cli.command {
        Command::Route {
            user,
            force,
            enabled,
            query,
        } => {
            let request = build_request(query, &user, force, enabled);
            let routing = routing_engine(&config);
            let decision = routing.decide(&request).await;
            if cli.json {
                println!("{}", ConsoleFormatter::format_json(&decision));
            } else {
                println!("{}", ConsoleFormatter::format_decision(&decision));
            }
        }
        Command::Classify {
            agent,
            retry_count,
            message,
        } => {
            let (policy, _) = config.recovery.to_retry_policy();
            let coordinator =
                RecoveryCoordinator::new(policy, config.recovery.history_capacity, Arc::new(NoTelemetry));
            let handled = coordinator.handle_error(
                message.as_str(),
                agent,
                ErrorContext::default().with_retry_count(retry_count),
            );
            if cli.json {
                println!("{}", ConsoleFormatter::format_json(&handled));
            } else {
                println!("{}", ConsoleFormatter::format_handled_error(&handled));
            }
        }
        Command::Backoff => {
            let (policy, _) = config.recovery.to_retry_policy();
            if cli.json {
                println!("{}", ConsoleFormatter::format_json(&BackoffStep::schedule(&policy)));
            } else {
                print!("{}", ConsoleFormatter::format_backoff(&policy));
            }
        }
        Command::Simulate {
            agent,
            fail,
            failures,
            user,
            stream,
            query,
        } => {
            let telemetry = Telemetry::from_config(&config);
            let mut factory = ScriptedAgentFactory::new();
            if let Some(message) = fail {
                factory = factory.with_script(agent, FailureScript::new(message, failures));
            }
            let request = build_request(query, &user, Some(agent), vec![]);

            simulate(&config, factory, &request, telemetry.sink.clone(), stream, cli.json).await?;
            telemetry.finish().await;
        }
        Command::Config { show_sources } => {
            if show_sources {
                println!("Configuration sources (highest priority first):");
                for source in ConfigLoader::sources(cli.config.as_deref()) {
                    let marker = if source.found { "found" } else { "missing" };
                    println!("  {:<9} {} ({})", source.label, source.location, marker);
                }
                println!();
            }
            if cli.json {
                println!("{}", ConsoleFormatter::format_json(&config));
            } else {
                println!(
                    "{}",
                    toml::to_string_pretty(&config).context("Failed to render configuration")?
                );
            }
        }
    }

    Ok(())
}

/// Initialize logging based on verbosity level; `RUST_LOG` takes precedence.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("Invalid log file path: {}", path.display()))?;
            std::fs::create_dir_all(directory)
                .with_context(|| format!("Could not create {}", directory.display()))?;

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
            Ok(None)
        }
    }
}

fn build_request(
    query: String,
    user: &str,
    force: Option<AgentType>,
    enabled: Vec<AgentType>,
) -> ChatRequest {
    let mut request = ChatRequest::new(query, UserContext::new(user));
    if let Some(agent_type) = force {
        request = request.with_forced_agent(agent_type);
    }
    if !enabled.is_empty() {
        request = request.with_agent_settings(AgentSettings {
            enabled: None,
            enabled_agent_types: enabled,
        });
    }
    request
}

fn routing_engine(config: &FileConfig) -> RoutingDecisionEngine {
    RoutingDecisionEngine::new(
        Arc::new(ConfigFeatureFlagProvider::from_config(&config.routing)),
        Arc::new(KeywordIntentClassifier::new()),
    )
}

/// Telemetry sink chosen by config, behind a background buffer.
struct Telemetry {
    sink: Arc<dyn TelemetrySink>,
    drain: Option<JoinHandle<()>>,
}

impl Telemetry {
    fn from_config(config: &FileConfig) -> Self {
        let inner: Arc<dyn TelemetrySink> = match config.telemetry.sink {
            FileTelemetrySink::None => {
                return Self {
                    sink: Arc::new(NoTelemetry),
                    drain: None,
                };
            }
            FileTelemetrySink::Tracing => Arc::new(TracingTelemetrySink),
            FileTelemetrySink::Jsonl => match config
                .telemetry
                .resolved_path()
                .and_then(JsonlTelemetrySink::new)
            {
                Some(sink) => {
                    info!("Writing telemetry to {}", sink.path().display());
                    Arc::new(sink)
                }
                None => Arc::new(TracingTelemetrySink),
            },
        };

        let (buffered, drain) = BufferedTelemetrySink::spawn(inner, config.telemetry.buffer_capacity);
        Self {
            sink: Arc::new(buffered),
            drain: Some(drain),
        }
    }

    /// Wait for queued events; every other handle on the sink must be dropped.
    async fn finish(self) {
        drop(self.sink);
        if let Some(drain) = self.drain
            && let Err(e) = drain.await
        {
            warn!("Telemetry drain task failed: {}", e);
        }
    }
}

async fn simulate(
    config: &FileConfig,
    factory: ScriptedAgentFactory,
    request: &ChatRequest,
    telemetry: Arc<dyn TelemetrySink>,
    stream: bool,
    json: bool,
) -> Result<()> {
    let (pool_config, _) = config.pool.to_pool_config();
    let mut pool = AgentPoolManager::new(Arc::new(factory), pool_config);
    for agent_config in config.agents.agent_configs() {
        pool = pool.with_agent_config(agent_config);
    }
    let pool = Arc::new(pool);
    pool.start_health_checks();

    let params = config.execution_params();
    let recovery = Arc::new(RecoveryCoordinator::new(
        params.retry,
        params.error_history_capacity,
        telemetry.clone(),
    ));
    let use_case = OrchestrateChatUseCase::new(
        Arc::new(routing_engine(config)),
        pool.clone(),
        recovery.clone(),
        Arc::new(EchoStandardChat::new()),
    )
    .with_telemetry(telemetry)
    .with_params(params);

    if stream {
        let mut streamed = use_case.execute_streaming(request).await?;
        let mut stdout = std::io::stdout();
        while let Some(chunk) = streamed.stream.next().await {
            match chunk {
                Ok(text) => {
                    write!(stdout, "{}", text)?;
                    stdout.flush()?;
                }
                Err(e) => {
                    warn!("Stream ended early: {}", e);
                    break;
                }
            }
        }
        writeln!(stdout)?;
    } else {
        let result = use_case.execute(request).await?;
        if json {
            let report = serde_json::json!({
                "response": result,
                "pool": pool.snapshot(),
                "errors": recovery.stats(),
            });
            println!("{}", ConsoleFormatter::format_json(&report));
        } else {
            println!("{}", ConsoleFormatter::format_response(&result));
        }
    }

    if !json || stream {
        print!("{}", ConsoleFormatter::format_pool_snapshot(&pool.snapshot()));
        print!("{}", ConsoleFormatter::format_error_stats(&recovery.stats()));
    }

    pool.shutdown().await;
    Ok(())
}
