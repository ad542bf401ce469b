//! Chat request and agent invocation context

use super::agent_type::AgentType;
use super::config::AgentConfig;
use serde::{Deserialize, Serialize};

/// Stable identity of the requesting user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: String,
}

impl UserContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// A prior turn of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Per-request agent settings supplied by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// `Some(false)` turns the agent path off for this request.
    pub enabled: Option<bool>,
    /// Restricts which agent types may be chosen. Empty means no restriction.
    pub enabled_agent_types: Vec<AgentType>,
}

impl AgentSettings {
    pub fn allows(&self, agent_type: AgentType) -> bool {
        self.enabled_agent_types.is_empty() || self.enabled_agent_types.contains(&agent_type)
    }
}

/// An incoming chat request as seen by the orchestration core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub request_id: String,
    pub query: String,
    pub conversation_id: Option<String>,
    /// Prior turns, oldest first
    pub history: Vec<ChatMessage>,
    pub force_agent_type: Option<AgentType>,
    pub agent_settings: Option<AgentSettings>,
    pub user: UserContext,
}

impl ChatRequest {
    pub fn new(query: impl Into<String>, user: UserContext) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            query: query.into(),
            conversation_id: None,
            history: Vec::new(),
            force_agent_type: None,
            agent_settings: None,
            user,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn with_forced_agent(mut self, agent_type: AgentType) -> Self {
        self.force_agent_type = Some(agent_type);
        self
    }

    pub fn with_agent_settings(mut self, settings: AgentSettings) -> Self {
        self.agent_settings = Some(settings);
        self
    }

    /// Number of prior turns in the conversation.
    pub fn conversation_length(&self) -> usize {
        self.history.len()
    }

    /// Agent types this request allows; empty means unrestricted.
    pub fn enabled_agent_types(&self) -> &[AgentType] {
        self.agent_settings
            .as_ref()
            .map(|s| s.enabled_agent_types.as_slice())
            .unwrap_or(&[])
    }

    /// Build the invocation context for a specific agent.
    pub fn to_agent_context(&self, config: AgentConfig) -> AgentContext {
        AgentContext {
            agent_type: config.agent_type(),
            config,
            request_id: self.request_id.clone(),
            query: self.query.clone(),
            conversation_id: self.conversation_id.clone(),
            history: self.history.clone(),
        }
    }
}

/// Everything an agent receives for a single invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentContext {
    pub agent_type: AgentType,
    pub config: AgentConfig,
    pub request_id: String,
    pub query: String,
    pub conversation_id: Option<String>,
    pub history: Vec<ChatMessage>,
}
