//! Recovery strategies.
//!
//! Each strategy is a pure function from a classified [`AgentError`] to an
//! [`ErrorRecoveryResult`]; [`recover`] dispatches on the error's strategy.
//! Retry and alternative-agent recovery hand off to fallback when they are
//! exhausted, and fallback always succeeds.

use super::agent_error::AgentError;
use super::taxonomy::RecoveryStrategy;
use crate::agent::AgentType;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exponential backoff parameters for the retry strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(10_000),
        }
    }
}

impl RetryPolicy {
    /// `min(base_delay * 2^retry_count, max_delay)`, saturating on overflow.
    pub fn delay_for(&self, retry_count: u32) -> Duration {
        let factor = 2u32.checked_pow(retry_count).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Delays for retry counts `0..max_retries`.
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_retries).map(|n| self.delay_for(n)).collect()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }
}

/// What the user is asked to do when an error cannot be recovered automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAction {
    pub code: String,
    pub message: String,
    pub suggestion: String,
}

/// The planned remediation for one classified error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecoveryResult {
    pub success: bool,
    pub strategy: RecoveryStrategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_agent_type: Option<AgentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_delay_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_action: Option<UserAction>,
}

impl ErrorRecoveryResult {
    /// Result used when recovery itself could not be planned.
    pub fn none() -> Self {
        Self {
            success: false,
            strategy: RecoveryStrategy::None,
            new_agent_type: None,
            retry_delay_ms: None,
            user_action: None,
        }
    }

    pub fn retry_delay(&self) -> Option<Duration> {
        self.retry_delay_ms.map(Duration::from_millis)
    }
}

/// Ordered substitutes tried by the alternative-agent strategy.
pub fn alternative_agents(agent_type: AgentType) -> &'static [AgentType] {
    match agent_type {
        AgentType::WebSearch => &[AgentType::LocalKnowledge],
        AgentType::LocalKnowledge => &[AgentType::WebSearch],
        AgentType::UrlPull => &[AgentType::WebSearch],
        AgentType::CodeInterpreter => &[],
        AgentType::StandardChat => &[],
    }
}

const DEFAULT_SUGGESTION: &str = "Please try again, or rephrase your request.";

/// Curated suggestion shown alongside a user-action error.
pub fn suggestion_for(code: &str) -> &'static str {
    match code {
        "SEARCH_QUERY_INVALID" => "Try a shorter, more specific search question.",
        "MEMORY_LIMIT_EXCEEDED" => "Try again with a smaller dataset or fewer iterations.",
        "FORBIDDEN_OPERATION" => {
            "The code runner cannot access files, processes or the network. Adjust the request to work on inline data."
        }
        "INDEX_NOT_FOUND" => "Upload documents to your knowledge base, then ask again.",
        "KNOWLEDGE_ACCESS_DENIED" => "Ask the document owner to share them with you.",
        "URL_INVALID" => "Check the link; it should start with http:// or https://.",
        "URL_NOT_FOUND" => "Check that the page still exists, or paste its content directly.",
        "CONTENT_FILTERED" => "Rephrase your request without the flagged content.",
        "CONTEXT_LENGTH_EXCEEDED" => "Start a new conversation or shorten your message.",
        "MODEL_AUTH_FAILED" => "An administrator needs to update the assistant's credentials.",
        "VALIDATION_ERROR" => "Check the request for typos or missing details.",
        _ => DEFAULT_SUGGESTION,
    }
}

/// Plan recovery for a classified error.
pub fn recover(error: &AgentError, policy: &RetryPolicy) -> ErrorRecoveryResult {
    match error.recovery_strategy {
        RecoveryStrategy::Retry => retry(error, policy),
        RecoveryStrategy::AlternativeAgent => alternative_agent(error),
        RecoveryStrategy::Fallback => fallback(),
        RecoveryStrategy::UserAction | RecoveryStrategy::ManualIntervention => {
            human_action(error)
        }
        RecoveryStrategy::None => ErrorRecoveryResult::none(),
    }
}

fn retry(error: &AgentError, policy: &RetryPolicy) -> ErrorRecoveryResult {
    if error.retry_count >= policy.max_retries {
        return fallback();
    }
    let delay = policy.delay_for(error.retry_count);
    ErrorRecoveryResult {
        success: true,
        strategy: RecoveryStrategy::Retry,
        new_agent_type: None,
        retry_delay_ms: Some(delay.as_millis() as u64),
        user_action: None,
    }
}

fn alternative_agent(error: &AgentError) -> ErrorRecoveryResult {
    let enabled = &error.context.enabled_agent_types;
    let substitute = alternative_agents(error.agent_type)
        .iter()
        .copied()
        .find(|t| *t != error.agent_type && (enabled.is_empty() || enabled.contains(t)));

    match substitute {
        Some(agent_type) => ErrorRecoveryResult {
            success: true,
            strategy: RecoveryStrategy::AlternativeAgent,
            new_agent_type: Some(agent_type),
            retry_delay_ms: None,
            user_action: None,
        },
        None => fallback(),
    }
}

fn fallback() -> ErrorRecoveryResult {
    ErrorRecoveryResult {
        success: true,
        strategy: RecoveryStrategy::Fallback,
        new_agent_type: Some(AgentType::BASELINE),
        retry_delay_ms: None,
        user_action: None,
    }
}

fn human_action(error: &AgentError) -> ErrorRecoveryResult {
    ErrorRecoveryResult {
        success: false,
        strategy: error.recovery_strategy,
        new_agent_type: None,
        retry_delay_ms: None,
        user_action: Some(UserAction {
            code: error.code.clone(),
            message: error.user_message.clone(),
            suggestion: suggestion_for(&error.code).to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recovery::agent_error::ErrorContext;
    use crate::recovery::classifier::ErrorClassifier;

    fn error_with_retries(message: &str, agent_type: AgentType, retry_count: u32) -> AgentError {
        ErrorClassifier::new().classify_message(
            message,
            agent_type,
            ErrorContext::default().with_retry_count(retry_count),
        )
    }

    #[test]
    fn test_delay_sequence_is_non_decreasing_and_capped() {
        let policy = RetryPolicy::default();
        let delays: Vec<_> = (0..40).map(|n| policy.delay_for(n)).collect();
        for pair in delays.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        assert!(delays.iter().all(|d| *d <= policy.max_delay));
        assert_eq!(delays[0], Duration::from_millis(1_000));
        assert_eq!(delays[1], Duration::from_millis(2_000));
        assert_eq!(delays[3], Duration::from_millis(8_000));
        assert_eq!(delays[4], Duration::from_millis(10_000));
        assert_eq!(delays[39], Duration::from_millis(10_000));
    }

    #[test]
    fn test_schedule_length() {
        let policy = RetryPolicy::default().with_max_retries(2);
        assert_eq!(
            policy.schedule(),
            vec![Duration::from_millis(1_000), Duration::from_millis(2_000)]
        );
    }

    #[test]
    fn test_retry_below_limit() {
        let policy = RetryPolicy::default();
        let result = recover(&error_with_retries("429", AgentType::WebSearch, 1), &policy);
        assert!(result.success);
        assert_eq!(result.strategy, RecoveryStrategy::Retry);
        assert_eq!(result.retry_delay_ms, Some(2_000));
    }

    #[test]
    fn test_retry_at_limit_hands_off_to_fallback() {
        let policy = RetryPolicy::default();
        let error = error_with_retries("429", AgentType::WebSearch, policy.max_retries);
        let result = recover(&error, &policy);
        assert!(result.success);
        assert_eq!(result.strategy, RecoveryStrategy::Fallback);
        assert_eq!(result.new_agent_type, Some(AgentType::StandardChat));
        assert!(result.retry_delay_ms.is_none());
    }

    #[test]
    fn test_alternative_agent_first_entry() {
        let error = error_with_retries("quota exhausted", AgentType::WebSearch, 0);
        let result = recover(&error, &RetryPolicy::default());
        assert_eq!(result.strategy, RecoveryStrategy::AlternativeAgent);
        assert_eq!(result.new_agent_type, Some(AgentType::LocalKnowledge));
    }

    #[test]
    fn test_alternative_agent_respects_enabled_types() {
        let mut error = error_with_retries("quota exhausted", AgentType::WebSearch, 0);
        error.context.enabled_agent_types = vec![AgentType::WebSearch, AgentType::UrlPull];
        let result = recover(&error, &RetryPolicy::default());
        assert_eq!(result.strategy, RecoveryStrategy::Fallback);
        assert_eq!(result.new_agent_type, Some(AgentType::StandardChat));
    }

    #[test]
    fn test_alternative_agent_empty_table_falls_back() {
        let mut error = error_with_retries("anything", AgentType::CodeInterpreter, 0);
        error.recovery_strategy = RecoveryStrategy::AlternativeAgent;
        let result = recover(&error, &RetryPolicy::default());
        assert_eq!(result.strategy, RecoveryStrategy::Fallback);
    }

    #[test]
    fn test_user_action_suggestion() {
        let error = error_with_retries("Invalid URL: ftp//x", AgentType::UrlPull, 0);
        let result = recover(&error, &RetryPolicy::default());
        assert!(!result.success);
        assert_eq!(result.strategy, RecoveryStrategy::UserAction);
        let action = result.user_action.unwrap();
        assert_eq!(action.code, "URL_INVALID");
        assert!(action.suggestion.contains("http"));
    }

    #[test]
    fn test_user_action_default_suggestion() {
        assert_eq!(suggestion_for("NOT_A_CODE"), DEFAULT_SUGGESTION);
    }

    #[test]
    fn test_manual_intervention_is_not_success() {
        let error = error_with_retries("invalid api key", AgentType::StandardChat, 0);
        let result = recover(&error, &RetryPolicy::default());
        assert_eq!(result.strategy, RecoveryStrategy::ManualIntervention);
        assert!(!result.success);
        assert!(result.user_action.is_some());
    }
}
