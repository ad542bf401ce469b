//! Scripted agents that fail a configured number of times, then succeed.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use switchboard_application::{Agent, AgentCallError, AgentFactory};
use switchboard_domain::{AgentConfig, AgentContext, AgentResponse, AgentType, HealthProbe};
use tracing::debug;

/// Nominal memory reported per scripted instance.
const SIMULATED_FOOTPRINT: usize = 64 * 1024;

/// Failure behaviour for every agent of one type.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureScript {
    /// Error text returned, matched by the error classifier
    pub message: String,
    /// Number of calls that fail before calls start succeeding
    pub failures: u32,
}

impl FailureScript {
    pub fn new(message: impl Into<String>, failures: u32) -> Self {
        Self {
            message: message.into(),
            failures,
        }
    }
}

/// Remaining failures, shared by all instances of a type so a retry on a
/// fresh instance still sees the script.
struct Script {
    message: String,
    remaining: AtomicU32,
}

impl Script {
    fn take_failure(&self) -> Option<String> {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .ok()
            .map(|_| self.message.clone())
    }
}

struct ScriptedAgent {
    agent_type: AgentType,
    script: Option<Arc<Script>>,
    latency: Duration,
    calls: AtomicU32,
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn agent_type(&self) -> AgentType {
        self.agent_type
    }

    async fn execute(&self, context: &AgentContext) -> Result<AgentResponse, AgentCallError> {
        let started = Instant::now();
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if let Some(message) = self.script.as_ref().and_then(|s| s.take_failure()) {
            debug!(agent_type = %self.agent_type, call, "Scripted failure: {}", message);
            return Err(AgentCallError::Execution(message));
        }

        let content = format!("[{}] {}", self.agent_type, context.query);
        Ok(AgentResponse::new(self.agent_type, content)
            .with_execution_time(started.elapsed().as_millis() as u64))
    }

    async fn check_health(&self) -> HealthProbe {
        HealthProbe::healthy(Duration::from_millis(1))
    }

    async fn cleanup(&self) -> Result<(), AgentCallError> {
        Ok(())
    }

    fn memory_footprint(&self) -> usize {
        SIMULATED_FOOTPRINT
    }
}

/// Builds [`ScriptedAgent`]s; types without a script always succeed.
#[derive(Default)]
pub struct ScriptedAgentFactory {
    scripts: HashMap<AgentType, Arc<Script>>,
    latency: Duration,
}

impl ScriptedAgentFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(mut self, agent_type: AgentType, script: FailureScript) -> Self {
        self.scripts.insert(
            agent_type,
            Arc::new(Script {
                message: script.message,
                remaining: AtomicU32::new(script.failures),
            }),
        );
        self
    }

    /// Simulated execution time per call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Failures still to be served for `agent_type`.
    pub fn remaining_failures(&self, agent_type: AgentType) -> u32 {
        self.scripts
            .get(&agent_type)
            .map(|s| s.remaining.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}

#[async_trait]
impl AgentFactory for ScriptedAgentFactory {
    async fn create_agent(&self, config: &AgentConfig) -> Result<Arc<dyn Agent>, AgentCallError> {
        let agent_type = config.agent_type();
        Ok(Arc::new(ScriptedAgent {
            agent_type,
            script: self.scripts.get(&agent_type).cloned(),
            latency: self.latency,
            calls: AtomicU32::new(0),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_domain::{ChatRequest, UserContext};

    fn context(agent_type: AgentType) -> AgentContext {
        ChatRequest::new("what changed?", UserContext::new("u"))
            .to_agent_context(AgentConfig::default_for(agent_type))
    }

    #[tokio::test]
    async fn test_fails_then_succeeds_across_instances() {
        let factory = ScriptedAgentFactory::new().with_script(
            AgentType::WebSearch,
            FailureScript::new("Rate limit exceeded (429)", 2),
        );
        let config = AgentConfig::default_for(AgentType::WebSearch);
        let first = factory.create_agent(&config).await.unwrap();
        let second = factory.create_agent(&config).await.unwrap();
        let ctx = context(AgentType::WebSearch);

        let err = first.execute(&ctx).await.unwrap_err();
        assert_eq!(err.to_string(), "Rate limit exceeded (429)");
        assert!(second.execute(&ctx).await.is_err());
        assert_eq!(factory.remaining_failures(AgentType::WebSearch), 0);

        let response = first.execute(&ctx).await.unwrap();
        assert_eq!(response.agent_type, AgentType::WebSearch);
        assert!(response.content.ends_with("what changed?"));
    }

    #[tokio::test]
    async fn test_unscripted_types_succeed() {
        let factory = ScriptedAgentFactory::new();
        let agent = factory
            .create_agent(&AgentConfig::default_for(AgentType::UrlPull))
            .await
            .unwrap();
        assert!(agent.execute(&context(AgentType::UrlPull)).await.is_ok());
        assert!(agent.check_health().await.healthy);
        assert_eq!(agent.memory_footprint(), SIMULATED_FOOTPRINT);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_simulated() {
        let factory = ScriptedAgentFactory::new().with_latency(Duration::from_millis(250));
        let agent = factory
            .create_agent(&AgentConfig::default_for(AgentType::CodeInterpreter))
            .await
            .unwrap();

        let started = tokio::time::Instant::now();
        agent.execute(&context(AgentType::CodeInterpreter)).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(250));
    }
}
