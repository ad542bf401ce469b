//! Per-agent-type configuration.
//!
//! [`AgentConfig`] is a tagged union with one variant per [`AgentType`], so
//! dispatch points match exhaustively instead of probing loosely-typed
//! property bags.

use super::agent_type::AgentType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSearchSettings {
    /// Maximum number of results fed back to the model
    pub max_results: usize,
    pub safe_search: bool,
}

impl Default for WebSearchSettings {
    fn default() -> Self {
        Self {
            max_results: 5,
            safe_search: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeInterpreterSettings {
    /// Wall-clock budget for a single sandbox run
    pub execution_timeout_ms: u64,
    pub allow_network: bool,
}

impl Default for CodeInterpreterSettings {
    fn default() -> Self {
        Self {
            execution_timeout_ms: 30_000,
            allow_network: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalKnowledgeSettings {
    /// Number of passages retrieved per query
    pub top_k: usize,
    /// Similarity floor below which passages are discarded
    pub min_score: f32,
}

impl Default for LocalKnowledgeSettings {
    fn default() -> Self {
        Self {
            top_k: 8,
            min_score: 0.35,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlPullSettings {
    pub max_bytes: usize,
    pub follow_redirects: bool,
}

impl Default for UrlPullSettings {
    fn default() -> Self {
        Self {
            max_bytes: 2 * 1024 * 1024,
            follow_redirects: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardChatSettings {
    /// Model override; `None` uses the collaborator's default
    pub model: Option<String>,
    pub temperature: f32,
}

impl Default for StandardChatSettings {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.7,
        }
    }
}

/// Configuration handed to an agent factory when constructing an instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AgentConfig {
    WebSearch(WebSearchSettings),
    CodeInterpreter(CodeInterpreterSettings),
    LocalKnowledge(LocalKnowledgeSettings),
    UrlPull(UrlPullSettings),
    StandardChat(StandardChatSettings),
}

impl AgentConfig {
    /// Default settings for the given agent type.
    pub fn default_for(agent_type: AgentType) -> Self {
        match agent_type {
            AgentType::WebSearch => AgentConfig::WebSearch(WebSearchSettings::default()),
            AgentType::CodeInterpreter => {
                AgentConfig::CodeInterpreter(CodeInterpreterSettings::default())
            }
            AgentType::LocalKnowledge => {
                AgentConfig::LocalKnowledge(LocalKnowledgeSettings::default())
            }
            AgentType::UrlPull => AgentConfig::UrlPull(UrlPullSettings::default()),
            AgentType::StandardChat => AgentConfig::StandardChat(StandardChatSettings::default()),
        }
    }

    pub fn agent_type(&self) -> AgentType {
        match self {
            AgentConfig::WebSearch(_) => AgentType::WebSearch,
            AgentConfig::CodeInterpreter(_) => AgentType::CodeInterpreter,
            AgentConfig::LocalKnowledge(_) => AgentType::LocalKnowledge,
            AgentConfig::UrlPull(_) => AgentType::UrlPull,
            AgentConfig::StandardChat(_) => AgentType::StandardChat,
        }
    }
}
