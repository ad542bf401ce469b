//! Error taxonomy: categories, severities and recovery strategies

use serde::{Deserialize, Serialize};

/// Broad failure category of an agent error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Network,
    Authentication,
    RateLimit,
    Validation,
    Processing,
    Timeout,
    QuotaExceeded,
    ServiceUnavailable,
    Configuration,
    Permission,
    ContentFilter,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "NETWORK",
            ErrorCategory::Authentication => "AUTHENTICATION",
            ErrorCategory::RateLimit => "RATE_LIMIT",
            ErrorCategory::Validation => "VALIDATION",
            ErrorCategory::Processing => "PROCESSING",
            ErrorCategory::Timeout => "TIMEOUT",
            ErrorCategory::QuotaExceeded => "QUOTA_EXCEEDED",
            ErrorCategory::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorCategory::Configuration => "CONFIGURATION",
            ErrorCategory::Permission => "PERMISSION",
            ErrorCategory::ContentFilter => "CONTENT_FILTER",
            ErrorCategory::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSeverity::Low => "LOW",
            ErrorSeverity::Medium => "MEDIUM",
            ErrorSeverity::High => "HIGH",
            ErrorSeverity::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Remediation chosen for a classified error.
///
/// | Strategy | Auto-recoverable | Outcome |
/// |----------|:---:|---------|
/// | `Retry` | yes | backoff delay, same agent |
/// | `AlternativeAgent` | yes | substitute agent type |
/// | `Fallback` | yes | baseline agent type |
/// | `UserAction` | no | curated suggestion for the user |
/// | `ManualIntervention` | no | operator must fix configuration |
/// | `None` | no | recovery could not be planned |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecoveryStrategy {
    Retry,
    AlternativeAgent,
    Fallback,
    UserAction,
    ManualIntervention,
    None,
}

impl RecoveryStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecoveryStrategy::Retry => "RETRY",
            RecoveryStrategy::AlternativeAgent => "ALTERNATIVE_AGENT",
            RecoveryStrategy::Fallback => "FALLBACK",
            RecoveryStrategy::UserAction => "USER_ACTION",
            RecoveryStrategy::ManualIntervention => "MANUAL_INTERVENTION",
            RecoveryStrategy::None => "NONE",
        }
    }

    /// Whether the outcome must be surfaced to the user instead of handled silently.
    pub fn requires_human(&self) -> bool {
        matches!(
            self,
            RecoveryStrategy::UserAction | RecoveryStrategy::ManualIntervention
        )
    }
}

impl std::fmt::Display for RecoveryStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serde_matches_as_str() {
        let json = serde_json::to_string(&ErrorCategory::QuotaExceeded).unwrap();
        assert_eq!(json, format!("\"{}\"", ErrorCategory::QuotaExceeded.as_str()));
    }

    #[test]
    fn test_requires_human() {
        assert!(RecoveryStrategy::UserAction.requires_human());
        assert!(RecoveryStrategy::ManualIntervention.requires_human());
        assert!(!RecoveryStrategy::Retry.requires_human());
        assert!(!RecoveryStrategy::Fallback.requires_human());
    }
}
