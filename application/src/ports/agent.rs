//! Agent ports
//!
//! Defines the concrete-agent contract the pool manages and the factory
//! that constructs agents. Implementations live outside the core.

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use std::sync::Arc;
use std::time::Duration;
use switchboard_domain::{AgentConfig, AgentContext, AgentResponse, AgentType, HealthProbe};
use thiserror::Error;

/// Errors raised by agents and agent factories.
///
/// The display text is what the error classifier matches against, so
/// variants keep the underlying message intact.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentCallError {
    #[error("{0}")]
    Execution(String),

    #[error("Agent execution timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to create agent: {0}")]
    Creation(String),

    #[error("Agent cleanup failed: {0}")]
    Cleanup(String),
}

/// Text chunks produced by a streaming agent.
pub type ResponseStream = BoxStream<'static, Result<String, AgentCallError>>;

/// A concrete, reusable agent instance.
#[async_trait]
pub trait Agent: Send + Sync {
    fn agent_type(&self) -> AgentType;

    /// Run the agent to completion.
    async fn execute(&self, context: &AgentContext) -> Result<AgentResponse, AgentCallError>;

    /// Run the agent and stream its answer.
    ///
    /// Default implementation calls `execute()` and yields the whole answer
    /// as a single chunk.
    async fn execute_streaming(
        &self,
        context: &AgentContext,
    ) -> Result<ResponseStream, AgentCallError> {
        let response = self.execute(context).await?;
        Ok(futures::stream::once(async move { Ok(response.content) }).boxed())
    }

    /// Self-reported health; must not fail, report `healthy: false` instead.
    async fn check_health(&self) -> HealthProbe;

    /// Release resources held by the agent. Called once before it is dropped.
    async fn cleanup(&self) -> Result<(), AgentCallError>;

    /// Approximate resident size in bytes, reported in pool snapshots.
    fn memory_footprint(&self) -> usize {
        0
    }
}

/// Constructs agents from their per-type configuration.
#[async_trait]
pub trait AgentFactory: Send + Sync {
    async fn create_agent(&self, config: &AgentConfig) -> Result<Arc<dyn Agent>, AgentCallError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_domain::{ChatRequest, UserContext};

    struct OneShot;

    #[async_trait]
    impl Agent for OneShot {
        fn agent_type(&self) -> AgentType {
            AgentType::WebSearch
        }

        async fn execute(&self, context: &AgentContext) -> Result<AgentResponse, AgentCallError> {
            Ok(AgentResponse::new(
                AgentType::WebSearch,
                format!("results for {}", context.query),
            ))
        }

        async fn check_health(&self) -> HealthProbe {
            HealthProbe::healthy(Duration::from_millis(1))
        }

        async fn cleanup(&self) -> Result<(), AgentCallError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_default_streaming_yields_single_chunk() {
        let request = ChatRequest::new("rust 2024", UserContext::new("u"));
        let context = request.to_agent_context(AgentConfig::default_for(AgentType::WebSearch));
        let chunks: Vec<_> = OneShot
            .execute_streaming(&context)
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(chunks, vec![Ok("results for rust 2024".to_string())]);
    }

    #[test]
    fn test_timeout_display_mentions_timed_out() {
        let error = AgentCallError::Timeout(Duration::from_secs(30));
        assert_eq!(error.to_string(), "Agent execution timed out after 30s");
    }
}
