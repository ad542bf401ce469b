//! Intent classifier port

use async_trait::async_trait;
use switchboard_domain::{ChatMessage, ChatRequest, IntentAnalysis};
use thiserror::Error;

/// Number of trailing turns handed to the classifier.
const RECENT_TURNS: usize = 6;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntentError {
    #[error("Intent analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Intent classifier unavailable")]
    Unavailable,
}

/// Conversation context handed to the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentContext {
    pub query: String,
    pub conversation_length: usize,
    pub recent_messages: Vec<ChatMessage>,
}

impl IntentContext {
    pub fn from_request(request: &ChatRequest) -> Self {
        let skip = request.history.len().saturating_sub(RECENT_TURNS);
        Self {
            query: request.query.clone(),
            conversation_length: request.conversation_length(),
            recent_messages: request.history.iter().skip(skip).cloned().collect(),
        }
    }
}

/// Recommends an agent type for a request.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn analyze(&self, context: &IntentContext) -> Result<IntentAnalysis, IntentError>;
}
