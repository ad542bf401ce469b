//! Error classifier.
//!
//! Turns any raw failure into a well-formed [`AgentError`]. Classification
//! is total: every input yields an error with a category, code and strategy.

use super::agent_error::{AgentError, ErrorContext};
use super::patterns::{ErrorPattern, GENERIC_PATTERNS, UNKNOWN_ERROR, patterns_for};
use crate::agent::AgentType;
use chrono::Utc;

/// Stateless classifier over the static pattern table.
#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorClassifier;

impl ErrorClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a failure raised by an agent of `agent_type`.
    pub fn classify<E>(&self, error: &E, agent_type: AgentType, context: ErrorContext) -> AgentError
    where
        E: std::fmt::Display + ?Sized,
    {
        self.classify_message(&error.to_string(), agent_type, context)
    }

    pub fn classify_message(
        &self,
        message: &str,
        agent_type: AgentType,
        context: ErrorContext,
    ) -> AgentError {
        let entry = Self::match_pattern(message, agent_type);

        AgentError {
            id: uuid::Uuid::new_v4().to_string(),
            agent_type,
            category: entry.category,
            severity: entry.severity,
            code: entry.code.to_string(),
            message: message.to_string(),
            user_message: entry.user_message.to_string(),
            recovery_strategy: entry.recovery_strategy,
            is_recoverable: entry.is_recoverable,
            retry_count: context.retry_count,
            context,
            timestamp: Utc::now(),
        }
    }

    /// Resolve the table entry for a message: agent table, then generic, then unknown.
    pub fn match_pattern(message: &str, agent_type: AgentType) -> &'static ErrorPattern {
        let lower = message.to_lowercase();
        patterns_for(agent_type)
            .iter()
            .chain(GENERIC_PATTERNS.iter())
            .find(|entry| entry.matches(&lower))
            .unwrap_or(&UNKNOWN_ERROR)
    }
}
