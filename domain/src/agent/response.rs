//! Agent response value object

use super::agent_type::AgentType;
use serde::{Deserialize, Serialize};

/// The answer produced by an agent (or the standard-chat baseline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub agent_type: AgentType,
    pub content: String,
    /// Citations or fetched locations backing the answer
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default)]
    pub execution_time_ms: u64,
}

impl AgentResponse {
    pub fn new(agent_type: AgentType, content: impl Into<String>) -> Self {
        Self {
            agent_type,
            content: content.into(),
            sources: Vec::new(),
            execution_time_ms: 0,
        }
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_execution_time(mut self, execution_time_ms: u64) -> Self {
        self.execution_time_ms = execution_time_ms;
        self
    }
}
