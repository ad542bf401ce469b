//! Standard chat stand-in that echoes the query back.

use async_trait::async_trait;
use switchboard_application::{StandardChat, StandardChatError};
use switchboard_domain::{AgentResponse, AgentType, ChatRequest};

#[derive(Debug, Clone, Default)]
pub struct EchoStandardChat {
    /// When set, every call fails with this message
    outage: Option<String>,
}

impl EchoStandardChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            outage: Some(message.into()),
        }
    }
}

#[async_trait]
impl StandardChat for EchoStandardChat {
    async fn handle(&self, request: &ChatRequest) -> Result<AgentResponse, StandardChatError> {
        if let Some(message) = &self.outage {
            return Err(StandardChatError::Unavailable(message.clone()));
        }
        Ok(AgentResponse::new(
            AgentType::StandardChat,
            format!("[standard-chat] {}", request.query),
        ))
    }
}
