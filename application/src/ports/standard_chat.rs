//! Standard chat port
//!
//! The non-agent baseline every request can degrade to.

use async_trait::async_trait;
use futures::StreamExt;
use switchboard_domain::{AgentResponse, ChatRequest};
use thiserror::Error;

use super::agent::ResponseStream;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StandardChatError {
    #[error("Standard chat unavailable: {0}")]
    Unavailable(String),

    #[error("Standard chat failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait StandardChat: Send + Sync {
    async fn handle(&self, request: &ChatRequest) -> Result<AgentResponse, StandardChatError>;

    /// Default implementation yields the whole answer as one chunk.
    async fn handle_streaming(
        &self,
        request: &ChatRequest,
    ) -> Result<ResponseStream, StandardChatError> {
        let response = self.handle(request).await?;
        Ok(futures::stream::once(async move { Ok(response.content) }).boxed())
    }
}
