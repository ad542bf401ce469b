//! Keyword-heuristic intent classifier.
//!
//! Checks, in order: a URL in the query, code or computation requests,
//! references to private documents, then requests for fresh information.
//! Anything else stays on standard chat.

use async_trait::async_trait;
use switchboard_application::{IntentClassifier, IntentContext, IntentError};
use switchboard_domain::{AgentType, IntentAnalysis};

const ANALYSIS_METHOD: &str = "keyword";

const CODE_KEYWORDS: &[&str] = &[
    "```",
    "run this",
    "execute",
    "python",
    "calculate",
    "compute",
    "plot",
    "chart",
    "regression",
    "csv",
    "script",
];

const KNOWLEDGE_KEYWORDS: &[&str] = &[
    "my documents",
    "my files",
    "my notes",
    "our docs",
    "knowledge base",
    "uploaded",
    "internal wiki",
    "according to the document",
];

const FRESH_KEYWORDS: &[&str] = &[
    "latest",
    "today",
    "news",
    "current",
    "recent",
    "this week",
    "price of",
    "weather",
    "search",
    "look up",
];

/// How many of the recent turns are scanned alongside the query.
const CONTEXT_TURNS: usize = 2;

#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordIntentClassifier;

impl KeywordIntentClassifier {
    pub fn new() -> Self {
        Self
    }

    fn hits(text: &str, keywords: &[&str]) -> usize {
        keywords.iter().filter(|k| text.contains(*k)).count()
    }

    /// Confidence grows with keyword hits, capped below certainty.
    fn confidence(hits: usize) -> f64 {
        (0.5 + 0.1 * hits as f64).min(0.95)
    }
}

#[async_trait]
impl IntentClassifier for KeywordIntentClassifier {
    async fn analyze(&self, context: &IntentContext) -> Result<IntentAnalysis, IntentError> {
        let query = context.query.to_lowercase();
        if query.trim().is_empty() {
            return Err(IntentError::AnalysisFailed("empty query".to_string()));
        }

        if query.contains("http://") || query.contains("https://") {
            return Ok(IntentAnalysis::new(
                AgentType::UrlPull,
                0.9,
                "Query contains a URL",
                ANALYSIS_METHOD,
            ));
        }

        let skip = context.recent_messages.len().saturating_sub(CONTEXT_TURNS);
        let mut text = query.clone();
        for message in context.recent_messages.iter().skip(skip) {
            text.push('\n');
            text.push_str(&message.content.to_lowercase());
        }

        let candidates = [
            (AgentType::CodeInterpreter, Self::hits(&query, CODE_KEYWORDS), "code or computation"),
            (
                AgentType::LocalKnowledge,
                Self::hits(&text, KNOWLEDGE_KEYWORDS),
                "private documents",
            ),
            (AgentType::WebSearch, Self::hits(&query, FRESH_KEYWORDS), "fresh information"),
        ];

        // max_by_key keeps the last maximum; iterate reversed so ties go to the earlier entry
        let best = candidates
            .iter()
            .rev()
            .filter(|(_, hits, _)| *hits > 0)
            .max_by_key(|(_, hits, _)| *hits);

        Ok(match best {
            Some((agent_type, hits, topic)) => IntentAnalysis::new(
                *agent_type,
                Self::confidence(*hits),
                format!("Query asks for {} ({} keyword matches)", topic, hits),
                ANALYSIS_METHOD,
            ),
            None => IntentAnalysis::new(
                AgentType::StandardChat,
                0.6,
                "No agent keywords matched",
                ANALYSIS_METHOD,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchboard_domain::ChatMessage;

    fn context(query: &str) -> IntentContext {
        IntentContext {
            query: query.to_string(),
            conversation_length: 0,
            recent_messages: vec![],
        }
    }

    async fn recommend(query: &str) -> AgentType {
        KeywordIntentClassifier::new()
            .analyze(&context(query))
            .await
            .unwrap()
            .recommended_agent
    }

    #[tokio::test]
    async fn test_url_wins() {
        assert_eq!(
            recommend("summarize https://example.com/latest-news").await,
            AgentType::UrlPull
        );
    }

    #[tokio::test]
    async fn test_keyword_routes() {
        assert_eq!(recommend("calculate the mean of this csv").await, AgentType::CodeInterpreter);
        assert_eq!(recommend("what's the latest news on rust?").await, AgentType::WebSearch);
        assert_eq!(recommend("what do my notes say about q3?").await, AgentType::LocalKnowledge);
        assert_eq!(recommend("tell me a joke").await, AgentType::StandardChat);
    }

    #[tokio::test]
    async fn test_recent_turns_inform_knowledge_intent() {
        let mut ctx = context("and what about the second one?");
        ctx.recent_messages = vec![ChatMessage::user("check my documents for the contract")];
        let analysis = KeywordIntentClassifier::new().analyze(&ctx).await.unwrap();
        assert_eq!(analysis.recommended_agent, AgentType::LocalKnowledge);
        assert_eq!(analysis.analysis_method, "keyword");
    }

    #[tokio::test]
    async fn test_empty_query_fails() {
        assert!(KeywordIntentClassifier::new().analyze(&context("  ")).await.is_err());
    }
}
