//! Error observable

use super::agent_error::AgentError;
use super::strategy::ErrorRecoveryResult;
use super::taxonomy::{ErrorCategory, ErrorSeverity};
use crate::agent::AgentType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate counts over every error handled by the recovery coordinator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorStats {
    pub total_errors: u64,
    pub by_agent: BTreeMap<AgentType, u64>,
    pub by_category: BTreeMap<ErrorCategory, u64>,
    pub by_severity: BTreeMap<ErrorSeverity, u64>,
    pub successful_recoveries: u64,
    /// Share of handled errors whose recovery plan succeeded; 0 when empty
    pub recovery_success_rate: f64,
}

impl ErrorStats {
    pub fn record(&mut self, error: &AgentError, result: &ErrorRecoveryResult) {
        self.total_errors += 1;
        *self.by_agent.entry(error.agent_type).or_default() += 1;
        *self.by_category.entry(error.category).or_default() += 1;
        *self.by_severity.entry(error.severity).or_default() += 1;
        if result.success {
            self.successful_recoveries += 1;
        }
        self.recovery_success_rate = self.successful_recoveries as f64 / self.total_errors as f64;
    }
}
