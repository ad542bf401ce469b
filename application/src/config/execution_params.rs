//! Execution parameters for the orchestrator loop.
//!
//! [`ExecutionParams`] groups the static parameters that control a single
//! request's execution in
//! [`OrchestrateChatUseCase`](crate::use_cases::orchestrate_chat::OrchestrateChatUseCase)
//! and the [`RecoveryCoordinator`](crate::services::recovery_coordinator::RecoveryCoordinator).
//! Pool sizing lives in [`PoolConfig`](switchboard_domain::PoolConfig).

use std::time::Duration;
use switchboard_domain::RetryPolicy;

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionParams {
    /// Budget for one agent invocation; on expiry the call is abandoned
    /// and classified as a timeout.
    pub request_timeout: Duration,
    /// Exponential backoff for the retry strategy.
    pub retry: RetryPolicy,
    /// Entries kept per (agent type, category, code) error history.
    pub error_history_capacity: usize,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            error_history_capacity: 100,
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_error_history_capacity(mut self, capacity: usize) -> Self {
        self.error_history_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = ExecutionParams::default();
        assert_eq!(params.request_timeout, Duration::from_secs(30));
        assert_eq!(params.retry.max_retries, 3);
        assert_eq!(params.error_history_capacity, 100);
    }

    #[test]
    fn test_builder() {
        let params = ExecutionParams::default()
            .with_request_timeout(Duration::from_secs(5))
            .with_retry(RetryPolicy::default().with_max_retries(1))
            .with_error_history_capacity(10);

        assert_eq!(params.request_timeout, Duration::from_secs(5));
        assert_eq!(params.retry.max_retries, 1);
        assert_eq!(params.error_history_capacity, 10);
    }
}
