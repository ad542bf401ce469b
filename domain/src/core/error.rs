//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown agent type: {0}")]
    UnknownAgentType(String),

    #[error("Invalid rollout percentage: {0} (expected 0-100)")]
    InvalidRolloutPercentage(u32),

    #[error("Invalid pool bounds: min {min} exceeds max {max}")]
    InvalidPoolBounds { min: usize, max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_agent_type_display() {
        let error = DomainError::UnknownAgentType("telepathy".to_string());
        assert_eq!(error.to_string(), "Unknown agent type: telepathy");
    }

    #[test]
    fn test_pool_bounds_display() {
        let error = DomainError::InvalidPoolBounds { min: 4, max: 2 };
        assert!(error.to_string().contains("min 4 exceeds max 2"));
    }
}
