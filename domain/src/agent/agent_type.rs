//! Agent type value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Tag identifying a specialized request handler.
///
/// [`AgentType::StandardChat`] is the baseline conversational path and the
/// universal fallback target; every other variant is a specialized agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentType {
    WebSearch,
    CodeInterpreter,
    LocalKnowledge,
    UrlPull,
    StandardChat,
}

impl AgentType {
    /// Every agent type, specialized types first.
    pub const ALL: [AgentType; 5] = [
        AgentType::WebSearch,
        AgentType::CodeInterpreter,
        AgentType::LocalKnowledge,
        AgentType::UrlPull,
        AgentType::StandardChat,
    ];

    /// The designated baseline conversational agent type.
    pub const BASELINE: AgentType = AgentType::StandardChat;

    /// Get the string identifier for this agent type
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::WebSearch => "web-search",
            AgentType::CodeInterpreter => "code-interpreter",
            AgentType::LocalKnowledge => "local-knowledge",
            AgentType::UrlPull => "url-pull",
            AgentType::StandardChat => "standard-chat",
        }
    }

    /// Human-readable name used in user-facing messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentType::WebSearch => "Web search",
            AgentType::CodeInterpreter => "Code interpreter",
            AgentType::LocalKnowledge => "Knowledge base",
            AgentType::UrlPull => "Page reader",
            AgentType::StandardChat => "Chat",
        }
    }

    pub fn is_baseline(&self) -> bool {
        *self == Self::BASELINE
    }
}

impl Default for AgentType {
    fn default() -> Self {
        Self::BASELINE
    }
}

impl std::fmt::Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgentType {
    type Err = DomainError;

    /// Accepts kebab-case, snake_case and a few short aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "web-search" | "web" | "search" => Ok(AgentType::WebSearch),
            "code-interpreter" | "code" => Ok(AgentType::CodeInterpreter),
            "local-knowledge" | "knowledge" | "local" => Ok(AgentType::LocalKnowledge),
            "url-pull" | "url" => Ok(AgentType::UrlPull),
            "standard-chat" | "standard" | "chat" => Ok(AgentType::StandardChat),
            _ => Err(DomainError::UnknownAgentType(s.to_string())),
        }
    }
}
