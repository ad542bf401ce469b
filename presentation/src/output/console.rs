//! Console output formatter for routing, recovery and pool diagnostics

use colored::Colorize;
use serde::Serialize;
use std::time::Duration;
use switchboard_application::{HandledError, OrchestratedResponse, ResponseSource};
use switchboard_domain::{
    ErrorSeverity, ErrorStats, HealthStatus, PoolSnapshot, RetryPolicy, RoutingDecision,
};

/// One row of the backoff schedule, as printed with `--json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackoffStep {
    pub retry: u32,
    pub delay_ms: u64,
}

impl BackoffStep {
    pub fn schedule(policy: &RetryPolicy) -> Vec<Self> {
        policy
            .schedule()
            .into_iter()
            .zip(0..)
            .map(|(delay, retry)| Self {
                retry,
                delay_ms: delay.as_millis() as u64,
            })
            .collect()
    }
}

/// Formats orchestration results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a routing decision
    pub fn format_decision(decision: &RoutingDecision) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("Routing Decision"));
        output.push('\n');

        let verdict = if decision.should_use_agents {
            "agent".green().bold()
        } else {
            "standard chat".yellow().bold()
        };
        output.push_str(&format!("{} {}\n", "Route:".cyan().bold(), verdict));
        output.push_str(&format!(
            "{} {}\n",
            "Agent type:".cyan().bold(),
            decision.agent_type
        ));
        output.push_str(&format!(
            "{} {:.2}\n",
            "Confidence:".cyan().bold(),
            decision.confidence
        ));
        output.push_str(&format!("{} {}\n", "Reason:".cyan().bold(), decision.reason));

        if let Some(flags) = &decision.flags_snapshot {
            output.push_str(&Self::section_header("Flags"));
            output.push_str(&format!(
                "  enabled: {}  rollout: {}%  fallback: {}  streaming: {}\n",
                flags.agent_routing_enabled,
                flags.rollout_percentage,
                flags.fallback_on_error,
                flags.enable_streaming
            ));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format a classified error and its recovery plan
    pub fn format_handled_error(handled: &HandledError) -> String {
        let error = &handled.error;
        let recovery = &handled.recovery;
        let mut output = String::new();
        output.push_str(&Self::header("Classified Error"));
        output.push('\n');

        output.push_str(&format!(
            "{} {} ({})\n",
            "Code:".cyan().bold(),
            error.code.bold(),
            error.category
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Severity:".cyan().bold(),
            Self::severity(error.severity)
        ));
        output.push_str(&format!("{} {}\n", "Message:".cyan().bold(), error.message));
        output.push_str(&format!(
            "{} {}\n",
            "User message:".cyan().bold(),
            error.user_message
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Recoverable:".cyan().bold(),
            error.is_recoverable
        ));

        output.push_str(&Self::section_header("Recovery"));
        let outcome = if recovery.success {
            "planned".green()
        } else {
            "not recoverable".red()
        };
        output.push_str(&format!("  strategy: {} ({})\n", recovery.strategy, outcome));
        if let Some(agent_type) = recovery.new_agent_type {
            output.push_str(&format!("  next agent: {}\n", agent_type));
        }
        if let Some(delay) = recovery.retry_delay() {
            output.push_str(&format!("  retry in: {}\n", Self::duration(delay)));
        }
        if let Some(action) = &recovery.user_action {
            output.push_str(&format!(
                "  {} {}\n  {}\n",
                "action required:".yellow().bold(),
                action.message,
                action.suggestion.dimmed()
            ));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format the retry delay schedule
    pub fn format_backoff(policy: &RetryPolicy) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{} max {} retries, base {}, cap {}\n",
            "Retry policy:".cyan().bold(),
            policy.max_retries,
            Self::duration(policy.base_delay),
            Self::duration(policy.max_delay)
        ));
        for step in BackoffStep::schedule(policy) {
            output.push_str(&format!(
                "  retry {:>2}  {}\n",
                step.retry,
                Self::duration(Duration::from_millis(step.delay_ms))
            ));
        }
        output
    }

    /// Format an orchestrated response
    pub fn format_response(result: &OrchestratedResponse) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("Response"));
        output.push('\n');

        let source = match result.source {
            ResponseSource::Agent(agent_type) => format!("agent {}", agent_type).green(),
            ResponseSource::StandardChat => "standard chat".yellow(),
        };
        output.push_str(&format!("{} {}\n", "Source:".cyan().bold(), source));
        output.push_str(&format!(
            "{} {}\n",
            "Attempts:".cyan().bold(),
            result.attempts
        ));
        output.push_str(&format!(
            "{} {}\n\n",
            "Routing:".cyan().bold(),
            result.routing.reason
        ));
        output.push_str(&Self::indent(&result.response.content, "  "));
        output.push('\n');

        if let Some(required) = &result.user_action {
            output.push_str(&format!(
                "\n{} {} ({})\n  {}\n",
                "Action required:".yellow().bold(),
                required.action.message,
                required.action.code,
                required.action.suggestion.dimmed()
            ));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format the pool observable
    pub fn format_pool_snapshot(snapshot: &PoolSnapshot) -> String {
        let mut output = String::new();
        output.push_str(&Self::section_header("Agent Pool"));
        output.push_str(&format!(
            "  total: {}  active: {}  idle: {}\n",
            snapshot.total_agents, snapshot.active_agents, snapshot.idle_agents
        ));
        output.push_str(&format!(
            "  hit rate: {:.1}%  miss rate: {:.1}%  avg execution: {:.1} ms  memory: {} bytes\n",
            snapshot.hit_rate * 100.0,
            snapshot.miss_rate * 100.0,
            snapshot.avg_execution_time_ms,
            snapshot.memory_usage_bytes
        ));
        for (agent_type, counts) in &snapshot.by_type {
            output.push_str(&format!(
                "  {:<18} total {}  active {}  {} {}  {} {}  {} {}\n",
                agent_type.as_str(),
                counts.total,
                counts.active,
                Self::health(HealthStatus::Healthy),
                counts.healthy,
                Self::health(HealthStatus::Degraded),
                counts.degraded,
                Self::health(HealthStatus::Unhealthy),
                counts.unhealthy
            ));
        }
        output
    }

    /// Format the error observable
    pub fn format_error_stats(stats: &ErrorStats) -> String {
        let mut output = String::new();
        output.push_str(&Self::section_header("Errors"));
        output.push_str(&format!(
            "  total: {}  recovered: {}  recovery rate: {:.1}%\n",
            stats.total_errors,
            stats.successful_recoveries,
            stats.recovery_success_rate * 100.0
        ));
        for (agent_type, count) in &stats.by_agent {
            output.push_str(&format!("  {:<18} {}\n", agent_type.as_str(), count));
        }
        for (category, count) in &stats.by_category {
            output.push_str(&format!("  {:<18} {}\n", category.as_str(), count));
        }
        output
    }

    /// Format any serializable value as JSON
    pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    fn severity(severity: ErrorSeverity) -> colored::ColoredString {
        match severity {
            ErrorSeverity::Low => severity.as_str().normal(),
            ErrorSeverity::Medium => severity.as_str().yellow(),
            ErrorSeverity::High => severity.as_str().red(),
            ErrorSeverity::Critical => severity.as_str().red().bold(),
        }
    }

    fn health(status: HealthStatus) -> colored::ColoredString {
        match status {
            HealthStatus::Healthy => status.as_str().green(),
            HealthStatus::Degraded => status.as_str().yellow(),
            HealthStatus::Unhealthy => status.as_str().red(),
        }
    }

    fn duration(duration: Duration) -> String {
        if duration.as_millis() >= 1000 && duration.subsec_millis() == 0 {
            format!("{}s", duration.as_secs())
        } else {
            format!("{}ms", duration.as_millis())
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_domain::{AgentType, RoutingFlags};

    fn plain<F: FnOnce() -> String>(f: F) -> String {
        colored::control::set_override(false);
        f()
    }

    #[test]
    fn test_backoff_schedule_doubles_and_caps() {
        let steps = BackoffStep::schedule(&RetryPolicy::default().with_max_retries(6));
        let delays: Vec<u64> = steps.iter().map(|s| s.delay_ms).collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 10000, 10000]);
        assert_eq!(steps[5].retry, 5);
    }

    #[test]
    fn test_decision_shows_reason_and_flags() {
        let decision = RoutingDecision::use_agent(
            AgentType::WebSearch,
            0.8,
            "Query asks for fresh information",
            Some(RoutingFlags::enabled_for_all()),
        );
        let output = plain(|| ConsoleFormatter::format_decision(&decision));
        assert!(output.contains("web-search"));
        assert!(output.contains("0.80"));
        assert!(output.contains("fresh information"));
        assert!(output.contains("rollout: 100%"));
    }

    #[test]
    fn test_duration_formatting() {
        assert_eq!(ConsoleFormatter::duration(Duration::from_secs(2)), "2s");
        assert_eq!(ConsoleFormatter::duration(Duration::from_millis(1500)), "1500ms");
        assert_eq!(ConsoleFormatter::duration(Duration::from_millis(250)), "250ms");
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "  "), "  a\n  b");
    }
}
