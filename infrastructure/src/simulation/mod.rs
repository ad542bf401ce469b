//! Scripted collaborators for dry runs
//!
//! Stand-ins for real agents and the standard chat backend, so the whole
//! orchestrator can be driven from the command line without any provider.

mod agent;
mod standard_chat;

pub use agent::{FailureScript, ScriptedAgentFactory};
pub use standard_chat::EchoStandardChat;
