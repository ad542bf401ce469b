//! Intent analysis result

use crate::agent::AgentType;
use serde::{Deserialize, Serialize};

/// What an intent classifier recommends for a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentAnalysis {
    pub recommended_agent: AgentType,
    /// Classifier confidence in `[0, 1]`
    pub confidence: f64,
    pub reasoning: String,
    /// Identifies the technique used, e.g. "keyword"
    pub analysis_method: String,
}

impl IntentAnalysis {
    pub fn new(
        recommended_agent: AgentType,
        confidence: f64,
        reasoning: impl Into<String>,
        analysis_method: impl Into<String>,
    ) -> Self {
        Self {
            recommended_agent,
            confidence: confidence.clamp(0.0, 1.0),
            reasoning: reasoning.into(),
            analysis_method: analysis_method.into(),
        }
    }
}
