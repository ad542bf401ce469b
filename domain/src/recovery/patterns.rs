//! Static per-agent-type error pattern table.
//!
//! Each [`ErrorPattern`] names an error code and lists lower-case substrings
//! tested in order against the lower-cased failure message. Tables are
//! scanned top to bottom and the first matching code wins, so more specific
//! codes sit above broader ones. Messages that match nothing in their
//! agent's table fall through to [`GENERIC_PATTERNS`], then to
//! [`UNKNOWN_ERROR`].

use super::taxonomy::{ErrorCategory, ErrorSeverity, RecoveryStrategy};
use crate::agent::AgentType;

/// One named error code and how to recognize and recover from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorPattern {
    pub code: &'static str,
    pub patterns: &'static [&'static str],
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub user_message: &'static str,
    pub recovery_strategy: RecoveryStrategy,
    pub is_recoverable: bool,
}

impl ErrorPattern {
    /// `message` must already be lower-cased.
    pub fn matches(&self, message: &str) -> bool {
        self.patterns.iter().any(|p| message.contains(p))
    }
}

const WEB_SEARCH_PATTERNS: &[ErrorPattern] = &[
    ErrorPattern {
        code: "SEARCH_TIMEOUT",
        patterns: &["timeout", "timed out"],
        category: ErrorCategory::Timeout,
        severity: ErrorSeverity::Medium,
        user_message: "The search took too long. Trying again.",
        recovery_strategy: RecoveryStrategy::Retry,
        is_recoverable: true,
    },
    ErrorPattern {
        code: "RATE_LIMIT_EXCEEDED",
        patterns: &["rate limit", "429", "too many requests"],
        category: ErrorCategory::RateLimit,
        severity: ErrorSeverity::Medium,
        user_message: "Search is busy right now. Trying again in a moment.",
        recovery_strategy: RecoveryStrategy::Retry,
        is_recoverable: true,
    },
    ErrorPattern {
        code: "SEARCH_QUOTA_EXCEEDED",
        patterns: &["quota", "billing", "usage limit"],
        category: ErrorCategory::QuotaExceeded,
        severity: ErrorSeverity::High,
        user_message: "Web search is unavailable for now. Using another source instead.",
        recovery_strategy: RecoveryStrategy::AlternativeAgent,
        is_recoverable: true,
    },
    ErrorPattern {
        code: "SEARCH_API_AUTH_FAILED",
        patterns: &["invalid api key", "api key", "unauthorized", "401"],
        category: ErrorCategory::Authentication,
        severity: ErrorSeverity::High,
        user_message: "Web search is not available. Answering without live results.",
        recovery_strategy: RecoveryStrategy::Fallback,
        is_recoverable: true,
    },
    ErrorPattern {
        code: "SEARCH_SERVICE_UNAVAILABLE",
        patterns: &["service unavailable", "503", "bad gateway", "502"],
        category: ErrorCategory::ServiceUnavailable,
        severity: ErrorSeverity::High,
        user_message: "The search service is down. Using another source instead.",
        recovery_strategy: RecoveryStrategy::AlternativeAgent,
        is_recoverable: true,
    },
    ErrorPattern {
        code: "NO_SEARCH_RESULTS",
        patterns: &["no results", "zero results", "empty result"],
        category: ErrorCategory::Processing,
        severity: ErrorSeverity::Low,
        user_message: "No web results were found. Answering from general knowledge.",
        recovery_strategy: RecoveryStrategy::Fallback,
        is_recoverable: true,
    },
    ErrorPattern {
        code: "SEARCH_QUERY_INVALID",
        patterns: &["invalid query", "query too long", "malformed query"],
        category: ErrorCategory::Validation,
        severity: ErrorSeverity::Low,
        user_message: "The search query could not be processed.",
        recovery_strategy: RecoveryStrategy::UserAction,
        is_recoverable: false,
    },
];

const CODE_INTERPRETER_PATTERNS: &[ErrorPattern] = &[
    ErrorPattern {
        code: "SANDBOX_UNAVAILABLE",
        patterns: &[
            "sandbox unavailable",
            "sandbox is unavailable",
            "sandbox not available",
            "no sandbox",
            "container unavailable",
        ],
        category: ErrorCategory::ServiceUnavailable,
        severity: ErrorSeverity::High,
        user_message: "The code runner is unavailable right now.",
        recovery_strategy: RecoveryStrategy::Retry,
        is_recoverable: true,
    },
    ErrorPattern {
        code: "EXECUTION_TIMEOUT",
        patterns: &["execution timeout", "timeout", "timed out"],
        category: ErrorCategory::Timeout,
        severity: ErrorSeverity::Medium,
        user_message: "The code took too long to run. Trying again.",
        recovery_strategy: RecoveryStrategy::Retry,
        is_recoverable: true,
    },
    ErrorPattern {
        code: "MEMORY_LIMIT_EXCEEDED",
        patterns: &["out of memory", "memory limit", "memoryerror", "oom killed"],
        category: ErrorCategory::Processing,
        severity: ErrorSeverity::High,
        user_message: "The code used more memory than the runner allows.",
        recovery_strategy: RecoveryStrategy::UserAction,
        is_recoverable: false,
    },
    ErrorPattern {
        code: "CODE_SYNTAX_ERROR",
        patterns: &["syntaxerror", "syntax error", "indentationerror"],
        category: ErrorCategory::Validation,
        severity: ErrorSeverity::Low,
        user_message: "The generated code had a syntax error. Trying again.",
        recovery_strategy: RecoveryStrategy::Retry,
        is_recoverable: true,
    },
    ErrorPattern {
        code: "FORBIDDEN_OPERATION",
        patterns: &["operation not permitted", "permission denied", "forbidden"],
        category: ErrorCategory::Permission,
        severity: ErrorSeverity::High,
        user_message: "That operation is not allowed in the code runner.",
        recovery_strategy: RecoveryStrategy::UserAction,
        is_recoverable: false,
    },
    ErrorPattern {
        code: "PACKAGE_NOT_AVAILABLE",
        patterns: &["modulenotfounderror", "no module named", "package not found"],
        category: ErrorCategory::Configuration,
        severity: ErrorSeverity::Medium,
        user_message: "A required package is not installed in the code runner.",
        recovery_strategy: RecoveryStrategy::Fallback,
        is_recoverable: true,
    },
];

const LOCAL_KNOWLEDGE_PATTERNS: &[ErrorPattern] = &[
    ErrorPattern {
        code: "KNOWLEDGE_TIMEOUT",
        patterns: &["timeout", "timed out"],
        category: ErrorCategory::Timeout,
        severity: ErrorSeverity::Medium,
        user_message: "Searching your documents took too long. Trying again.",
        recovery_strategy: RecoveryStrategy::Retry,
        is_recoverable: true,
    },
    ErrorPattern {
        code: "INDEX_NOT_FOUND",
        patterns: &["index not found", "collection not found", "no index"],
        category: ErrorCategory::Configuration,
        severity: ErrorSeverity::High,
        user_message: "Your knowledge base has not been set up yet.",
        recovery_strategy: RecoveryStrategy::UserAction,
        is_recoverable: false,
    },
    ErrorPattern {
        code: "KNOWLEDGE_ACCESS_DENIED",
        patterns: &["access denied", "permission denied", "403"],
        category: ErrorCategory::Permission,
        severity: ErrorSeverity::High,
        user_message: "You don't have access to these documents.",
        recovery_strategy: RecoveryStrategy::UserAction,
        is_recoverable: false,
    },
    ErrorPattern {
        code: "EMBEDDING_FAILED",
        patterns: &["embedding", "vectoriz"],
        category: ErrorCategory::Processing,
        severity: ErrorSeverity::Medium,
        user_message: "Your question could not be indexed. Trying again.",
        recovery_strategy: RecoveryStrategy::Retry,
        is_recoverable: true,
    },
    ErrorPattern {
        code: "NO_RELEVANT_DOCUMENTS",
        patterns: &["no relevant", "no documents", "no matches"],
        category: ErrorCategory::Processing,
        severity: ErrorSeverity::Low,
        user_message: "Nothing relevant was found in your documents. Searching the web instead.",
        recovery_strategy: RecoveryStrategy::AlternativeAgent,
        is_recoverable: true,
    },
];

const URL_PULL_PATTERNS: &[ErrorPattern] = &[
    ErrorPattern {
        code: "URL_FETCH_TIMEOUT",
        patterns: &["timeout", "timed out"],
        category: ErrorCategory::Timeout,
        severity: ErrorSeverity::Medium,
        user_message: "The page took too long to load. Trying again.",
        recovery_strategy: RecoveryStrategy::Retry,
        is_recoverable: true,
    },
    ErrorPattern {
        code: "URL_INVALID",
        patterns: &["invalid url", "malformed url", "unsupported protocol"],
        category: ErrorCategory::Validation,
        severity: ErrorSeverity::Low,
        user_message: "That link doesn't look valid.",
        recovery_strategy: RecoveryStrategy::UserAction,
        is_recoverable: false,
    },
    ErrorPattern {
        code: "DNS_RESOLUTION_FAILED",
        patterns: &["enotfound", "getaddrinfo", "dns"],
        category: ErrorCategory::Network,
        severity: ErrorSeverity::Medium,
        user_message: "The site's address could not be resolved. Trying again.",
        recovery_strategy: RecoveryStrategy::Retry,
        is_recoverable: true,
    },
    ErrorPattern {
        code: "URL_ACCESS_DENIED",
        patterns: &["403", "forbidden", "access denied", "401"],
        category: ErrorCategory::Permission,
        severity: ErrorSeverity::Medium,
        user_message: "The page blocks automated access. Searching for it instead.",
        recovery_strategy: RecoveryStrategy::AlternativeAgent,
        is_recoverable: true,
    },
    ErrorPattern {
        code: "URL_NOT_FOUND",
        patterns: &["404", "not found"],
        category: ErrorCategory::Processing,
        severity: ErrorSeverity::Medium,
        user_message: "The page could not be found.",
        recovery_strategy: RecoveryStrategy::UserAction,
        is_recoverable: false,
    },
    ErrorPattern {
        code: "CONTENT_TOO_LARGE",
        patterns: &["too large", "413", "content length"],
        category: ErrorCategory::Validation,
        severity: ErrorSeverity::Medium,
        user_message: "The page is too large to read in full.",
        recovery_strategy: RecoveryStrategy::Fallback,
        is_recoverable: true,
    },
];

const STANDARD_CHAT_PATTERNS: &[ErrorPattern] = &[
    ErrorPattern {
        code: "CONTENT_FILTERED",
        patterns: &["content filter", "content_filter", "content policy", "safety system"],
        category: ErrorCategory::ContentFilter,
        severity: ErrorSeverity::Medium,
        user_message: "Your request was blocked by the content policy.",
        recovery_strategy: RecoveryStrategy::UserAction,
        is_recoverable: false,
    },
    ErrorPattern {
        code: "CONTEXT_LENGTH_EXCEEDED",
        patterns: &[
            "context_length_exceeded",
            "context length",
            "maximum context",
            "too many tokens",
        ],
        category: ErrorCategory::Validation,
        severity: ErrorSeverity::Medium,
        user_message: "This conversation has grown too long.",
        recovery_strategy: RecoveryStrategy::UserAction,
        is_recoverable: false,
    },
    ErrorPattern {
        code: "MODEL_OVERLOADED",
        patterns: &["overloaded", "529", "capacity"],
        category: ErrorCategory::ServiceUnavailable,
        severity: ErrorSeverity::High,
        user_message: "The assistant is busy. Trying again.",
        recovery_strategy: RecoveryStrategy::Retry,
        is_recoverable: true,
    },
    ErrorPattern {
        code: "MODEL_RATE_LIMITED",
        patterns: &["rate limit", "429", "too many requests"],
        category: ErrorCategory::RateLimit,
        severity: ErrorSeverity::Medium,
        user_message: "The assistant is busy. Trying again in a moment.",
        recovery_strategy: RecoveryStrategy::Retry,
        is_recoverable: true,
    },
    ErrorPattern {
        code: "MODEL_AUTH_FAILED",
        patterns: &["api key", "unauthorized", "401"],
        category: ErrorCategory::Authentication,
        severity: ErrorSeverity::Critical,
        user_message: "The assistant is misconfigured.",
        recovery_strategy: RecoveryStrategy::ManualIntervention,
        is_recoverable: false,
    },
];

/// Broad fallbacks tried when no agent-specific code matches.
pub const GENERIC_PATTERNS: &[ErrorPattern] = &[
    ErrorPattern {
        code: "AGENT_POOL_UNAVAILABLE",
        patterns: &["agent pool"],
        category: ErrorCategory::ServiceUnavailable,
        severity: ErrorSeverity::High,
        user_message: "This feature is busy right now. Using the standard assistant.",
        recovery_strategy: RecoveryStrategy::Fallback,
        is_recoverable: true,
    },
    ErrorPattern {
        code: "NETWORK_ERROR",
        patterns: &[
            "network",
            "econnrefused",
            "econnreset",
            "connection",
            "socket hang up",
        ],
        category: ErrorCategory::Network,
        severity: ErrorSeverity::Medium,
        user_message: "A network problem interrupted the request. Trying again.",
        recovery_strategy: RecoveryStrategy::Retry,
        is_recoverable: true,
    },
    ErrorPattern {
        code: "AUTHENTICATION_ERROR",
        patterns: &["unauthorized", "authentication", "api key", "forbidden", "401", "403"],
        category: ErrorCategory::Authentication,
        severity: ErrorSeverity::High,
        user_message: "This feature is not available right now.",
        recovery_strategy: RecoveryStrategy::Fallback,
        is_recoverable: true,
    },
    ErrorPattern {
        code: "RATE_LIMIT_ERROR",
        patterns: &["rate limit", "429", "too many requests", "throttl"],
        category: ErrorCategory::RateLimit,
        severity: ErrorSeverity::Medium,
        user_message: "The service is busy. Trying again in a moment.",
        recovery_strategy: RecoveryStrategy::Retry,
        is_recoverable: true,
    },
    ErrorPattern {
        code: "TIMEOUT_ERROR",
        patterns: &["timeout", "timed out", "deadline exceeded"],
        category: ErrorCategory::Timeout,
        severity: ErrorSeverity::Medium,
        user_message: "The request took too long. Trying again.",
        recovery_strategy: RecoveryStrategy::Retry,
        is_recoverable: true,
    },
    ErrorPattern {
        code: "VALIDATION_ERROR",
        patterns: &["invalid", "validation", "malformed", "bad request"],
        category: ErrorCategory::Validation,
        severity: ErrorSeverity::Low,
        user_message: "The request could not be processed as written.",
        recovery_strategy: RecoveryStrategy::UserAction,
        is_recoverable: false,
    },
];

/// Last-resort classification when nothing else matches.
pub const UNKNOWN_ERROR: ErrorPattern = ErrorPattern {
    code: "UNKNOWN_ERROR",
    patterns: &[],
    category: ErrorCategory::Unknown,
    severity: ErrorSeverity::Medium,
    user_message: "Something went wrong. Trying again.",
    recovery_strategy: RecoveryStrategy::Retry,
    is_recoverable: true,
};

/// The agent-specific table for an agent type.
pub fn patterns_for(agent_type: AgentType) -> &'static [ErrorPattern] {
    match agent_type {
        AgentType::WebSearch => WEB_SEARCH_PATTERNS,
        AgentType::CodeInterpreter => CODE_INTERPRETER_PATTERNS,
        AgentType::LocalKnowledge => LOCAL_KNOWLEDGE_PATTERNS,
        AgentType::UrlPull => URL_PULL_PATTERNS,
        AgentType::StandardChat => STANDARD_CHAT_PATTERNS,
    }
}

/// Find an entry by code across every table, generic entries included.
pub fn find_by_code(code: &str) -> Option<&'static ErrorPattern> {
    AgentType::ALL
        .iter()
        .flat_map(|t| patterns_for(*t).iter())
        .chain(GENERIC_PATTERNS.iter())
        .chain(std::iter::once(&UNKNOWN_ERROR))
        .find(|p| p.code == code)
}
