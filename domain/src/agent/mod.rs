//! Agent domain module
//!
//! Agent types, their per-type configuration, and the request/response
//! values that flow through the orchestrator.

pub mod agent_type;
pub mod config;
pub mod request;
pub mod response;

pub use agent_type::AgentType;
pub use config::AgentConfig;
pub use request::{AgentContext, AgentSettings, ChatMessage, ChatRequest, UserContext};
pub use response::AgentResponse;
