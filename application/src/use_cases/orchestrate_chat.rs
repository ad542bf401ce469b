//! Orchestrate Chat use case.
//!
//! The single request-execution path: route the request, borrow an agent
//! from the pool, invoke it under the request timeout, and recover from
//! failures. Every terminal agent failure degrades to the standard-chat
//! collaborator; only that collaborator's own failure surfaces as
//! [`OrchestratorError::ServiceUnavailable`].
//!
//! Recovery per classified error:
//!
//! | Strategy | Action |
//! |----------|--------|
//! | `RETRY` | back off and re-invoke the same instance until `max_retries` invocations have failed |
//! | `ALTERNATIVE_AGENT` / `FALLBACK` | re-dispatch once with the new type, then standard chat |
//! | `USER_ACTION` / `MANUAL_INTERVENTION` | surface the curated message and suggestion |
//! | `NONE` | standard chat |

use crate::config::ExecutionParams;
use crate::ports::agent::{Agent, AgentCallError, ResponseStream};
use crate::ports::standard_chat::{StandardChat, StandardChatError};
use crate::ports::telemetry::{NoTelemetry, TelemetryEvent, TelemetrySink};
use crate::services::agent_pool::{AgentLease, AgentPoolManager};
use crate::services::recovery_coordinator::{HandledError, RecoveryCoordinator};
use crate::services::routing_engine::RoutingDecisionEngine;
use futures::{Stream, StreamExt};
use serde::Serialize;
use serde_json::json;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use switchboard_domain::{
    AgentResponse, AgentType, ChatRequest, ErrorContext, ExecutionOutcome, InstanceId,
    RecoveryStrategy, RoutingDecision, UserAction,
};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Chat service unavailable: {0}")]
    ServiceUnavailable(#[from] StandardChatError),
}

/// Who produced the final answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseSource {
    Agent(AgentType),
    StandardChat,
}

/// A failure the user has to act on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserActionRequired {
    pub agent_type: AgentType,
    pub strategy: RecoveryStrategy,
    pub action: UserAction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrchestratedResponse {
    pub response: AgentResponse,
    pub source: ResponseSource,
    pub routing: RoutingDecision,
    /// Agent invocations made, including failed ones
    pub attempts: u32,
    pub user_action: Option<UserActionRequired>,
}

/// A streamed answer and where it comes from.
pub struct OrchestratedStream {
    pub stream: ResponseStream,
    pub source: ResponseSource,
    pub routing: RoutingDecision,
}

/// How one agent run ended.
enum AgentRun {
    Completed(AgentResponse),
    NeedsUser(UserActionRequired),
    Redirect(AgentType),
    Failed,
}

pub struct OrchestrateChatUseCase {
    routing: Arc<RoutingDecisionEngine>,
    pool: Arc<AgentPoolManager>,
    recovery: Arc<RecoveryCoordinator>,
    standard_chat: Arc<dyn StandardChat>,
    telemetry: Arc<dyn TelemetrySink>,
    params: ExecutionParams,
}

impl OrchestrateChatUseCase {
    pub fn new(
        routing: Arc<RoutingDecisionEngine>,
        pool: Arc<AgentPoolManager>,
        recovery: Arc<RecoveryCoordinator>,
        standard_chat: Arc<dyn StandardChat>,
    ) -> Self {
        Self {
            routing,
            pool,
            recovery,
            standard_chat,
            telemetry: Arc::new(NoTelemetry),
            params: ExecutionParams::default(),
        }
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    pub fn pool(&self) -> &Arc<AgentPoolManager> {
        &self.pool
    }

    pub fn recovery(&self) -> &Arc<RecoveryCoordinator> {
        &self.recovery
    }

    /// Answer a chat request.
    pub async fn execute(&self, request: &ChatRequest) -> Result<OrchestratedResponse, OrchestratorError> {
        let routing = self.route(request).await;
        self.execute_routed(request, routing).await
    }

    async fn execute_routed(
        &self,
        request: &ChatRequest,
        routing: RoutingDecision,
    ) -> Result<OrchestratedResponse, OrchestratorError> {
        if !routing.should_use_agents || routing.agent_type.is_baseline() {
            return self.standard_chat(request, routing, 0).await;
        }

        let fallback_on_error = routing
            .flags_snapshot
            .as_ref()
            .is_none_or(|flags| flags.fallback_on_error);
        let primary = routing.agent_type;

        let mut attempts = 0;
        let redirect = match self.run_agent(request, primary, true, &mut attempts).await {
            AgentRun::Completed(response) => {
                return Ok(self.agent_answer(response, primary, routing, attempts));
            }
            AgentRun::NeedsUser(action) => return Ok(user_action_answer(action, routing, attempts)),
            AgentRun::Redirect(agent_type) => agent_type,
            AgentRun::Failed => AgentType::BASELINE,
        };

        if fallback_on_error && redirect != primary && !redirect.is_baseline() {
            info!("Re-dispatching request from {} to {}", primary, redirect);
            match self.run_agent(request, redirect, false, &mut attempts).await {
                AgentRun::Completed(response) => {
                    return Ok(self.agent_answer(response, redirect, routing, attempts));
                }
                AgentRun::NeedsUser(action) => {
                    return Ok(user_action_answer(action, routing, attempts));
                }
                AgentRun::Redirect(_) | AgentRun::Failed => {}
            }
        }

        self.telemetry.record(TelemetryEvent::new(
            "agent_fallback",
            json!({
                "request_id": request.request_id,
                "agent_type": primary.as_str(),
                "attempts": attempts,
            }),
        ));
        self.standard_chat(request, routing, attempts).await
    }

    /// Answer a chat request as a stream of text chunks.
    ///
    /// Without the streaming flag the full answer is produced first and
    /// yielded as one chunk. Streaming runs are single attempts: a failure
    /// degrades straight to the standard-chat stream.
    pub async fn execute_streaming(&self, request: &ChatRequest) -> Result<OrchestratedStream, OrchestratorError> {
        let routing = self.route(request).await;
        let streaming = routing
            .flags_snapshot
            .as_ref()
            .is_some_and(|flags| flags.enable_streaming);

        if !streaming {
            let answer = self.execute_routed(request, routing).await?;
            let content = answer.response.content;
            return Ok(OrchestratedStream {
                stream: futures::stream::once(async move { Ok(content) }).boxed(),
                source: answer.source,
                routing: answer.routing,
            });
        }

        let agent_type = routing.agent_type;
        if routing.should_use_agents
            && !agent_type.is_baseline()
            && let Some(stream) = self.stream_agent(request, agent_type).await
        {
            return Ok(OrchestratedStream {
                stream,
                source: ResponseSource::Agent(agent_type),
                routing,
            });
        }

        let stream = self.standard_chat.handle_streaming(request).await?;
        Ok(OrchestratedStream {
            stream,
            source: ResponseSource::StandardChat,
            routing,
        })
    }

    async fn route(&self, request: &ChatRequest) -> RoutingDecision {
        let routing = self.routing.decide(request).await;
        self.telemetry.record(TelemetryEvent::new(
            "routing_decision",
            json!({
                "request_id": request.request_id,
                "user_id": request.user.user_id,
                "use_agents": routing.should_use_agents,
                "agent_type": routing.agent_type.as_str(),
                "confidence": routing.confidence,
                "reason": routing.reason,
            }),
        ));
        routing
    }

    /// Run one agent type to a terminal outcome, retrying when allowed.
    ///
    /// The error context's `retry_count` is the number of failed invocations
    /// so far, the current one included.
    async fn run_agent(
        &self,
        request: &ChatRequest,
        agent_type: AgentType,
        allow_retry: bool,
        attempts: &mut u32,
    ) -> AgentRun {
        let context = request.to_agent_context(self.pool.agent_config(agent_type));
        let conversation_id = request.conversation_id.as_deref();
        let mut failures = 0;
        let mut held: Option<PooledLease> = None;

        loop {
            *attempts += 1;

            let lease = match held.take() {
                Some(lease) => lease,
                None => match self.pool.get_agent(agent_type, conversation_id).await {
                    Ok(lease) => PooledLease::new(Arc::clone(&self.pool), lease),
                    Err(e) => {
                        failures += 1;
                        let handled = self.recovery.handle_error(
                            &e,
                            agent_type,
                            error_context(request, failures),
                        );
                        if allow_retry && let Some(delay) = retry_delay(&handled) {
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                        return terminal(handled, agent_type);
                    }
                },
            };

            let timeout = self.params.request_timeout;
            let result = tokio::time::timeout(timeout, lease.agent().execute(&context))
                .await
                .unwrap_or(Err(AgentCallError::Timeout(timeout)));

            match result {
                Ok(response) => {
                    lease.finish(ExecutionOutcome::Success);
                    return AgentRun::Completed(response);
                }
                Err(e) => {
                    failures += 1;
                    let handled =
                        self.recovery
                            .handle_error(&e, agent_type, error_context(request, failures));
                    if allow_retry && let Some(delay) = retry_delay(&handled) {
                        debug!(
                            instance = %lease.instance_id(),
                            "Retrying {} in {:?} after {} failures",
                            agent_type,
                            delay,
                            failures
                        );
                        tokio::time::sleep(delay).await;
                        held = Some(lease);
                        continue;
                    }

                    lease.finish(ExecutionOutcome::failure(e.to_string()));
                    return terminal(handled, agent_type);
                }
            }
        }
    }

    async fn stream_agent(&self, request: &ChatRequest, agent_type: AgentType) -> Option<ResponseStream> {
        let context = request.to_agent_context(self.pool.agent_config(agent_type));

        let lease = match self
            .pool
            .get_agent(agent_type, request.conversation_id.as_deref())
            .await
        {
            Ok(lease) => PooledLease::new(Arc::clone(&self.pool), lease),
            Err(e) => {
                self.recovery
                    .handle_error(&e, agent_type, error_context(request, 1));
                return None;
            }
        };

        let timeout = self.params.request_timeout;
        let started = tokio::time::timeout(timeout, lease.agent().execute_streaming(&context))
            .await
            .unwrap_or(Err(AgentCallError::Timeout(timeout)));

        match started {
            Ok(inner) => Some(LeasedStream { inner, lease }.boxed()),
            Err(e) => {
                self.recovery
                    .handle_error(&e, agent_type, error_context(request, 1));
                lease.finish(ExecutionOutcome::failure(e.to_string()));
                warn!("Streaming {} agent failed, using standard chat: {}", agent_type, e);
                None
            }
        }
    }

    async fn standard_chat(
        &self,
        request: &ChatRequest,
        routing: RoutingDecision,
        attempts: u32,
    ) -> Result<OrchestratedResponse, OrchestratorError> {
        let response = self.standard_chat.handle(request).await?;
        Ok(OrchestratedResponse {
            response,
            source: ResponseSource::StandardChat,
            routing,
            attempts,
            user_action: None,
        })
    }

    fn agent_answer(
        &self,
        response: AgentResponse,
        agent_type: AgentType,
        routing: RoutingDecision,
        attempts: u32,
    ) -> OrchestratedResponse {
        debug!("{} agent answered after {} attempts", agent_type, attempts);
        OrchestratedResponse {
            response,
            source: ResponseSource::Agent(agent_type),
            routing,
            attempts,
            user_action: None,
        }
    }
}

fn error_context(request: &ChatRequest, retry_count: u32) -> ErrorContext {
    ErrorContext {
        request_id: Some(request.request_id.clone()),
        conversation_id: request.conversation_id.clone(),
        user_id: Some(request.user.user_id.clone()),
        retry_count,
        enabled_agent_types: request.enabled_agent_types().to_vec(),
        ..ErrorContext::default()
    }
}

fn retry_delay(handled: &HandledError) -> Option<std::time::Duration> {
    (handled.recovery.strategy == RecoveryStrategy::Retry)
        .then(|| handled.recovery.retry_delay())
        .flatten()
}

fn terminal(handled: HandledError, agent_type: AgentType) -> AgentRun {
    let recovery = handled.recovery;
    match recovery.strategy {
        RecoveryStrategy::AlternativeAgent | RecoveryStrategy::Fallback => {
            AgentRun::Redirect(recovery.new_agent_type.unwrap_or(AgentType::BASELINE))
        }
        RecoveryStrategy::UserAction | RecoveryStrategy::ManualIntervention => {
            match recovery.user_action {
                Some(action) => AgentRun::NeedsUser(UserActionRequired {
                    agent_type,
                    strategy: recovery.strategy,
                    action,
                }),
                None => AgentRun::Failed,
            }
        }
        RecoveryStrategy::Retry | RecoveryStrategy::None => AgentRun::Failed,
    }
}

fn user_action_answer(
    action: UserActionRequired,
    routing: RoutingDecision,
    attempts: u32,
) -> OrchestratedResponse {
    let content = format!("{}\n\n{}", action.action.message, action.action.suggestion);
    OrchestratedResponse {
        response: AgentResponse::new(action.agent_type, content),
        source: ResponseSource::Agent(action.agent_type),
        routing,
        attempts,
        user_action: Some(action),
    }
}

/// A borrowed instance that goes back to the pool when dropped.
///
/// Dropped without [`PooledLease::finish`], as when the caller abandons the
/// request, the instance is returned with its health unchanged.
struct PooledLease {
    pool: Arc<AgentPoolManager>,
    lease: AgentLease,
    outcome: Option<ExecutionOutcome>,
}

impl PooledLease {
    fn new(pool: Arc<AgentPoolManager>, lease: AgentLease) -> Self {
        Self {
            pool,
            lease,
            outcome: None,
        }
    }

    fn agent(&self) -> &Arc<dyn Agent> {
        &self.lease.agent
    }

    fn instance_id(&self) -> &InstanceId {
        &self.lease.instance_id
    }

    /// Return the instance now, reclassifying its health from `outcome`.
    fn finish(mut self, outcome: ExecutionOutcome) {
        self.outcome = Some(outcome);
    }
}

impl Drop for PooledLease {
    fn drop(&mut self) {
        if self.outcome.is_none() {
            debug!(instance = %self.lease.instance_id, "Agent call abandoned, returning instance");
        }
        self.pool
            .return_agent(&self.lease.instance_id, self.outcome.as_ref());
    }
}

/// Returns the borrowed instance to the pool when the stream is dropped.
struct LeasedStream {
    inner: ResponseStream,
    lease: PooledLease,
}

impl Stream for LeasedStream {
    type Item = Result<String, AgentCallError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let polled = self.inner.poll_next_unpin(cx);
        match &polled {
            Poll::Ready(Some(Err(e))) => {
                self.lease.outcome = Some(ExecutionOutcome::Failure(e.to_string()));
            }
            Poll::Ready(_) if self.lease.outcome.is_none() => {
                self.lease.outcome = Some(ExecutionOutcome::Success);
            }
            _ => {}
        }
        polled
    }
}
