//! Recovery coordinator
//!
//! Classifies raw agent failures, keeps a bounded history per
//! (agent type, category, code), reports each error to telemetry and plans
//! recovery. [`RecoveryCoordinator::handle_error`] never fails: a planner
//! that panics yields [`ErrorRecoveryResult::none`].

use crate::ports::telemetry::{TelemetryEvent, TelemetrySink};
use serde::Serialize;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::fmt::Display;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use switchboard_domain::{
    AgentError, AgentType, ErrorCategory, ErrorClassifier, ErrorContext, ErrorRecoveryResult,
    ErrorSeverity, ErrorStats, RetryPolicy, recover,
};
use tracing::{error, info, warn};

/// Plans recovery for one classified error.
pub type RecoveryPlanner = fn(&AgentError, &RetryPolicy) -> ErrorRecoveryResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct HistoryKey {
    agent_type: AgentType,
    category: ErrorCategory,
    code: String,
}

impl HistoryKey {
    fn of(error: &AgentError) -> Self {
        Self {
            agent_type: error.agent_type,
            category: error.category,
            code: error.code.clone(),
        }
    }
}

#[derive(Default)]
struct RecoveryState {
    history: HashMap<HistoryKey, VecDeque<AgentError>>,
    stats: ErrorStats,
}

/// A classified error together with its recovery plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandledError {
    pub error: AgentError,
    pub recovery: ErrorRecoveryResult,
}

pub struct RecoveryCoordinator {
    classifier: ErrorClassifier,
    policy: RetryPolicy,
    planner: RecoveryPlanner,
    history_capacity: usize,
    telemetry: Arc<dyn TelemetrySink>,
    state: Mutex<RecoveryState>,
}

impl RecoveryCoordinator {
    pub fn new(policy: RetryPolicy, history_capacity: usize, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self {
            classifier: ErrorClassifier::new(),
            policy,
            planner: recover,
            history_capacity,
            telemetry,
            state: Mutex::new(RecoveryState::default()),
        }
    }

    /// Replace the recovery planner.
    pub fn with_planner(mut self, planner: RecoveryPlanner) -> Self {
        self.planner = planner;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn state(&self) -> MutexGuard<'_, RecoveryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn classify<E>(&self, error: &E, agent_type: AgentType, context: ErrorContext) -> AgentError
    where
        E: Display + ?Sized,
    {
        self.classifier.classify(error, agent_type, context)
    }

    /// Classify, record and plan recovery for a failure.
    pub fn handle_error<E>(
        &self,
        error: &E,
        agent_type: AgentType,
        context: ErrorContext,
    ) -> HandledError
    where
        E: Display + ?Sized,
    {
        let agent_error = self.classify(error, agent_type, context);

        let planner = self.planner;
        let recovery = catch_unwind(AssertUnwindSafe(|| planner(&agent_error, &self.policy)))
            .unwrap_or_else(|_| {
                error!(code = %agent_error.code, "Recovery planning panicked");
                ErrorRecoveryResult::none()
            });

        {
            let mut state = self.state();
            let entries = state.history.entry(HistoryKey::of(&agent_error)).or_default();
            entries.push_back(agent_error.clone());
            while entries.len() > self.history_capacity {
                entries.pop_front();
            }
            state.stats.record(&agent_error, &recovery);
        }

        if agent_error.severity >= ErrorSeverity::High {
            warn!(
                agent_type = %agent_type,
                code = %agent_error.code,
                strategy = %recovery.strategy,
                "Agent error: {}",
                agent_error.message
            );
        } else {
            info!(
                agent_type = %agent_type,
                code = %agent_error.code,
                strategy = %recovery.strategy,
                "Agent error: {}",
                agent_error.message
            );
        }

        self.telemetry.record(TelemetryEvent::new(
            "agent_error",
            json!({
                "error_id": agent_error.id,
                "agent_type": agent_type.as_str(),
                "category": agent_error.category.as_str(),
                "severity": agent_error.severity.as_str(),
                "code": agent_error.code,
                "retry_count": agent_error.retry_count,
                "strategy": recovery.strategy.as_str(),
                "recovered": recovery.success,
                "request_id": agent_error.context.request_id,
            }),
        ));

        HandledError {
            error: agent_error,
            recovery,
        }
    }

    /// Recorded errors for one (agent type, category, code), oldest first.
    pub fn history(&self, agent_type: AgentType, category: ErrorCategory, code: &str) -> Vec<AgentError> {
        let key = HistoryKey {
            agent_type,
            category,
            code: code.to_string(),
        };
        self.state()
            .history
            .get(&key)
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn stats(&self) -> ErrorStats {
        self.state().stats.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_domain::RecoveryStrategy;

    // -- Mock TelemetrySink ----------------------------------------------------

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<TelemetryEvent>>,
    }

    impl TelemetrySink for RecordingSink {
        fn record(&self, event: TelemetryEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn coordinator(sink: Arc<RecordingSink>) -> RecoveryCoordinator {
        RecoveryCoordinator::new(RetryPolicy::default(), 100, sink)
    }

    #[test]
    fn rate_limit_is_retried() {
        let sink = Arc::new(RecordingSink::default());
        let handled = coordinator(sink.clone()).handle_error(
            "Rate limit exceeded (429)",
            AgentType::WebSearch,
            ErrorContext::default(),
        );

        assert_eq!(handled.error.category, ErrorCategory::RateLimit);
        assert_eq!(handled.error.recovery_strategy, RecoveryStrategy::Retry);
        assert!(handled.error.is_recoverable);
        assert_eq!(handled.recovery.retry_delay_ms, Some(1000));

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "agent_error");
        assert_eq!(events[0].fields["category"], "RATE_LIMIT");
    }

    #[test]
    fn exhausted_retries_hand_off_to_fallback() {
        let coordinator = coordinator(Arc::new(RecordingSink::default()));
        let handled = coordinator.handle_error(
            "sandbox unavailable",
            AgentType::CodeInterpreter,
            ErrorContext::default().with_retry_count(3),
        );
        assert_eq!(handled.recovery.strategy, RecoveryStrategy::Fallback);
        assert_eq!(handled.recovery.new_agent_type, Some(AgentType::StandardChat));
    }

    #[test]
    fn history_is_bounded_fifo() {
        let coordinator =
            RecoveryCoordinator::new(RetryPolicy::default(), 3, Arc::new(RecordingSink::default()));
        for retry in 0..5 {
            coordinator.handle_error(
                "dns lookup failed",
                AgentType::UrlPull,
                ErrorContext::default().with_retry_count(retry),
            );
        }

        let history = coordinator.history(
            AgentType::UrlPull,
            ErrorCategory::Network,
            "DNS_RESOLUTION_FAILED",
        );
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].retry_count, 2);
        assert_eq!(history[2].retry_count, 4);
        assert!(
            coordinator
                .history(AgentType::WebSearch, ErrorCategory::Network, "DNS_RESOLUTION_FAILED")
                .is_empty()
        );
    }

    #[test]
    fn panicking_planner_yields_none() {
        fn broken(_: &AgentError, _: &RetryPolicy) -> ErrorRecoveryResult {
            panic!("planner bug")
        }
        let coordinator = coordinator(Arc::new(RecordingSink::default())).with_planner(broken);

        let handled = coordinator.handle_error("boom", AgentType::WebSearch, ErrorContext::default());
        assert!(!handled.recovery.success);
        assert_eq!(handled.recovery.strategy, RecoveryStrategy::None);
        assert_eq!(coordinator.stats().total_errors, 1);
    }

    #[test]
    fn stats_track_recovery_rate() {
        let coordinator = coordinator(Arc::new(RecordingSink::default()));
        coordinator.handle_error("timeout", AgentType::WebSearch, ErrorContext::default());
        coordinator.handle_error("invalid url", AgentType::UrlPull, ErrorContext::default());

        let stats = coordinator.stats();
        assert_eq!(stats.total_errors, 2);
        assert_eq!(stats.successful_recoveries, 1);
        assert_eq!(stats.recovery_success_rate, 0.5);
    }
}
