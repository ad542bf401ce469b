//! Structured agent error

use super::taxonomy::{ErrorCategory, ErrorSeverity, RecoveryStrategy};
use crate::agent::AgentType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Request-side facts attached to a classified error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorContext {
    pub request_id: Option<String>,
    pub conversation_id: Option<String>,
    pub user_id: Option<String>,
    /// Retries already spent in the current attempt chain
    pub retry_count: u32,
    /// Agent types the request allows; empty means unrestricted
    pub enabled_agent_types: Vec<AgentType>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl ErrorContext {
    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A raw agent failure after classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentError {
    pub id: String,
    pub agent_type: AgentType,
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    /// Named code from the pattern table, e.g. "RATE_LIMIT_EXCEEDED"
    pub code: String,
    /// The raw failure message
    pub message: String,
    /// Curated text safe to show an end user
    pub user_message: String,
    pub recovery_strategy: RecoveryStrategy,
    pub is_recoverable: bool,
    pub retry_count: u32,
    pub context: ErrorContext,
    pub timestamp: DateTime<Utc>,
}

impl std::fmt::Display for AgentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}/{}] {} ({})",
            self.agent_type, self.code, self.message, self.category
        )
    }
}

impl std::error::Error for AgentError {}
