//! Per-agent settings from TOML (`[agents.*]` sections)

use crate::config::issues::{ConfigIssue, Severity};
use serde::{Deserialize, Serialize};
use switchboard_domain::{
    AgentConfig, CodeInterpreterSettings, LocalKnowledgeSettings, StandardChatSettings,
    UrlPullSettings, WebSearchSettings,
};

/// Settings handed to the agent factory, one table per agent type.
///
/// ```toml
/// [agents.web_search]
/// max_results = 8
///
/// [agents.code_interpreter]
/// execution_timeout_ms = 15000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentsConfig {
    pub web_search: WebSearchSettings,
    pub code_interpreter: CodeInterpreterSettings,
    pub local_knowledge: LocalKnowledgeSettings,
    pub url_pull: UrlPullSettings,
    pub standard_chat: StandardChatSettings,
}

impl FileAgentsConfig {
    pub fn agent_configs(&self) -> Vec<AgentConfig> {
        vec![
            AgentConfig::WebSearch(self.web_search.clone()),
            AgentConfig::CodeInterpreter(self.code_interpreter.clone()),
            AgentConfig::LocalKnowledge(self.local_knowledge.clone()),
            AgentConfig::UrlPull(self.url_pull.clone()),
            AgentConfig::StandardChat(self.standard_chat.clone()),
        ]
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let score = self.local_knowledge.min_score;
        if !(0.0..=1.0).contains(&score) {
            issues.push(ConfigIssue::out_of_range(
                Severity::Warning,
                "agents.local_knowledge.min_score",
                score,
                "0.0-1.0",
                "results may be empty",
            ));
        }
        let temperature = self.standard_chat.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            issues.push(ConfigIssue::out_of_range(
                Severity::Warning,
                "agents.standard_chat.temperature",
                temperature,
                "0.0-2.0",
                "the model may reject it",
            ));
        }
        issues
    }
}
