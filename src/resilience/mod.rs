//! Resilience patterns for flaky end-to-end actions
//!
//! This module provides:
//! - [`backoff`]: `RetryPolicy` and its deterministic exponential delay
//! - [`sleep`]: injectable suspension between attempts
//! - [`executor`]: `ResilientExecutor`, bounded sequential retry with logging

pub mod backoff;
pub mod executor;
pub mod sleep;

pub use backoff::RetryPolicy;
pub use executor::{ExecutionResult, ResilientExecutor, RetryError};
pub use sleep::{RecordingSleeper, Sleeper, TokioSleeper};
