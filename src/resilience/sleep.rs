//! Sleeper - the suspension point between retry attempts
//!
//! Injected into the executor so tests can fake time: [`RecordingSleeper`]
//! returns immediately and remembers what it was asked to wait.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::Result;

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, delay: Duration) -> Result<()>;
}

/// Real timer backed by `tokio::time::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) -> Result<()> {
        tokio::time::sleep(delay).await;
        Ok(())
    }
}

/// Records requested delays without waiting
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far, in order
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().clone()
    }

    pub fn total(&self) -> Duration {
        self.delays.lock().iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, delay: Duration) -> Result<()> {
        self.delays.lock().push(delay);
        Ok(())
    }
}
