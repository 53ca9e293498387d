//! ResilientExecutor - bounded retry of fallible async actions
//!
//! Attempts are strictly sequential and numbered from 1. After a failed
//! attempt `n < max_attempts` the executor logs a warning, waits
//! `policy.delay(n)` through its [`Sleeper`] and starts attempt `n + 1`.
//! When the last attempt fails it logs one error entry and returns
//! [`RetryError::Exhausted`] carrying that attempt's error.
//!
//! Only the action's own failures are retried. A failing sleeper or an
//! invalid policy surfaces immediately as [`RetryError::Infrastructure`].

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use serde_json::json;
use thiserror::Error;

use super::backoff::RetryPolicy;
use super::sleep::{Sleeper, TokioSleeper};
use crate::error::{Result, SteadyError};
use crate::logs::{LogLevel, LogSink, NoopSink};

/// Final failure of a retried action
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed; carries the last attempt's error
    #[error("{last_error}")]
    Exhausted { attempts: u32, last_error: E },

    /// Retry machinery failed (not retried)
    #[error(transparent)]
    Infrastructure(#[from] SteadyError),
}

impl<E> RetryError<E> {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// Number of attempts made before giving up
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::Exhausted { attempts, .. } => Some(*attempts),
            Self::Infrastructure(_) => None,
        }
    }

    pub fn last_error(&self) -> Option<&E> {
        match self {
            Self::Exhausted { last_error, .. } => Some(last_error),
            Self::Infrastructure(_) => None,
        }
    }

    pub fn into_last_error(self) -> Option<E> {
        match self {
            Self::Exhausted { last_error, .. } => Some(last_error),
            Self::Infrastructure(_) => None,
        }
    }
}

/// Success value, or the final failure after retries
pub type ExecutionResult<T, E> = std::result::Result<T, RetryError<E>>;

/// Runs actions under a [`RetryPolicy`]
#[derive(Clone)]
pub struct ResilientExecutor {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    sink: Arc<dyn LogSink>,
    tag: Option<String>,
}

impl ResilientExecutor {
    /// Create an executor; fails if the policy is invalid
    ///
    /// Defaults to a real tokio timer and no logging.
    pub fn new(policy: RetryPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self::from_validated(policy))
    }

    /// Skip validation for a policy that already passed it
    pub(crate) fn from_validated(policy: RetryPolicy) -> Self {
        Self {
            policy,
            sleeper: Arc::new(TokioSleeper),
            sink: Arc::new(NoopSink),
            tag: None,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Send attempt events to `sink` (usually the run's `LogStore`)
    pub fn with_log(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Label every log entry (typically the test name)
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn sink(&self) -> &Arc<dyn LogSink> {
        &self.sink
    }

    /// Run `action` until it succeeds or `max_attempts` is reached
    pub async fn execute<F, Fut, T, E>(&self, mut action: F) -> ExecutionResult<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Display,
    {
        let max = self.policy.max_attempts;
        let mut attempt = 1;

        loop {
            self.log(
                LogLevel::Debug,
                format!("Attempt {}/{}", attempt, max),
                json!({ "attempt": attempt, "max_attempts": max }),
            );

            let error = match action().await {
                Ok(value) => {
                    if attempt > 1 {
                        self.log(
                            LogLevel::Info,
                            format!("Succeeded on attempt {}/{}", attempt, max),
                            json!({ "attempt": attempt, "max_attempts": max }),
                        );
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            let reason = error.to_string();
            if attempt >= max {
                self.log(
                    LogLevel::Warn,
                    format!("Attempt {}/{} failed: {}", attempt, max, reason),
                    json!({ "attempt": attempt, "max_attempts": max, "error": reason }),
                );
                self.log(
                    LogLevel::Error,
                    format!("All {} attempts failed: {}", max, reason),
                    json!({ "attempts": attempt, "error": reason }),
                );
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last_error: error,
                });
            }

            let delay = self.policy.delay(attempt)?;
            self.log(
                LogLevel::Warn,
                format!(
                    "Attempt {}/{} failed: {} (retrying in {}ms)",
                    attempt,
                    max,
                    reason,
                    delay.as_millis()
                ),
                json!({
                    "attempt": attempt,
                    "max_attempts": max,
                    "error": reason,
                    "delay_ms": delay.as_millis() as u64,
                }),
            );
            self.sleeper.sleep(delay).await?;
            attempt += 1;
        }
    }

    fn log(&self, level: LogLevel, message: String, context: serde_json::Value) {
        self.sink.log(level, message, Some(context), self.tag.as_deref());
    }
}

impl std::fmt::Debug for ResilientExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientExecutor")
            .field("policy", &self.policy)
            .field("tag", &self.tag)
            .finish()
    }
}
