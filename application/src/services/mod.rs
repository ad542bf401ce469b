//! Orchestration services
//!
//! Long-lived components shared by every request:
//!
//! - [`routing_engine::RoutingDecisionEngine`]: agents or not, and which type
//! - [`agent_pool::AgentPoolManager`]: bounded per-type pools with conversation affinity
//! - [`recovery_coordinator::RecoveryCoordinator`]: classification, history and recovery plans

pub mod agent_pool;
pub mod recovery_coordinator;
pub mod routing_engine;
