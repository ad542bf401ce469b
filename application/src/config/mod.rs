//! Application-level configuration.
//!
//! - [`ExecutionParams`]: request timeout, retry policy and error history bounds

pub mod execution_params;

pub use execution_params::ExecutionParams;
