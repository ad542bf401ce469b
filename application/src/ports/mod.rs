//! Port definitions (interfaces for external collaborators)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod agent;
pub mod feature_flags;
pub mod intent_classifier;
pub mod standard_chat;
pub mod telemetry;
