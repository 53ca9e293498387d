//! Retry policy with exponential backoff
//!
//! `delay(a) = min(base_delay * backoff_multiplier^(a - 1), max_delay)`, with
//! `a` the 1-based index of the attempt that just failed. No jitter: the
//! sequence is deterministic, non-decreasing and capped at `max_delay`.

use std::time::Duration;

use crate::error::{Result, SteadyError};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Immutable retry configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub base_delay: Duration,
    /// Cap for any single delay
    pub max_delay: Duration,
    /// Growth factor between consecutive delays
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1000),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no delay
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
        }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Check the policy invariants
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts < 1 {
            return Err(SteadyError::InvalidPolicy {
                reason: "max_attempts must be at least 1".to_string(),
            });
        }
        if self.max_delay < self.base_delay {
            return Err(SteadyError::InvalidPolicy {
                reason: format!(
                    "max_delay ({}ms) is shorter than base_delay ({}ms)",
                    self.max_delay.as_millis(),
                    self.base_delay.as_millis()
                ),
            });
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(SteadyError::InvalidPolicy {
                reason: format!(
                    "backoff_multiplier must be a finite number >= 1, got {}",
                    self.backoff_multiplier
                ),
            });
        }
        Ok(())
    }

    /// Delay to wait after attempt `attempt` (1-based) failed
    ///
    /// `attempt = 0` is rejected rather than clamped.
    pub fn delay(&self, attempt: u32) -> Result<Duration> {
        if attempt == 0 {
            return Err(SteadyError::InvalidArgument {
                name: "attempt".to_string(),
                reason: "attempts are numbered from 1".to_string(),
            });
        }
        if self.base_delay.is_zero() {
            return Ok(Duration::ZERO);
        }

        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let base = self.base_delay.as_nanos() as f64;
        let cap = self.max_delay.as_nanos() as f64;
        let raw = base * self.backoff_multiplier.powi(exponent);

        if !raw.is_finite() || raw >= cap {
            return Ok(self.max_delay);
        }
        // u128 nanos: delays past u64::MAX ns are still below the cap here
        let nanos = raw.round() as u128;
        let secs = u64::try_from(nanos / NANOS_PER_SEC).unwrap_or(u64::MAX);
        let delay = Duration::new(secs, (nanos % NANOS_PER_SEC) as u32);
        Ok(delay.min(self.max_delay))
    }
}
