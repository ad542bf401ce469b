//! Structured configuration issues
//!
//! Validation never fails a load: problems are reported as [`ConfigIssue`]s
//! and the offending value falls back to a safe default.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The value cannot work and was replaced.
    Error,
    /// The value works but may not behave as expected.
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A string field that must name one of a fixed set of values.
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
    /// A numeric field outside its accepted range.
    OutOfRange {
        field: String,
        value: String,
        expected: String,
    },
    /// A field that is required by another setting but missing.
    MissingValue { field: String },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub(crate) fn unknown_agent_type(field: &str, value: &str, fallback: &str) -> Self {
        Self {
            severity: Severity::Warning,
            code: ConfigIssueCode::InvalidEnumValue {
                field: field.to_string(),
                value: value.to_string(),
                valid_values: switchboard_domain::AgentType::ALL
                    .iter()
                    .map(|t| t.as_str().to_string())
                    .collect(),
            },
            message: format!("{}: unknown agent type '{}', {}", field, value, fallback),
        }
    }

    pub(crate) fn out_of_range(
        severity: Severity,
        field: &str,
        value: impl ToString,
        expected: &str,
        fallback: &str,
    ) -> Self {
        let value = value.to_string();
        Self {
            severity,
            message: format!("{}: {} is out of range ({}), {}", field, value, expected, fallback),
            code: ConfigIssueCode::OutOfRange {
                field: field.to_string(),
                value,
                expected: expected.to_string(),
            },
        }
    }
}
