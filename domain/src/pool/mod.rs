//! Agent pool domain module
//!
//! Pool sizing policy, instance health, and the pool observable.

pub mod config;
pub mod health;
pub mod snapshot;
pub mod value_objects;

pub use config::PoolConfig;
pub use health::{ExecutionOutcome, HealthProbe, HealthStatus, SLOW_PROBE_THRESHOLD};
pub use snapshot::{PoolSnapshot, TypeSnapshot};
pub use value_objects::InstanceId;
