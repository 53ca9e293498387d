//! LogSink trait - where the executor sends its attempt events
//!
//! The real [`LogStore`] in a harness run, [`NoopSink`] when nothing
//! should be recorded.

use serde_json::Value;

use super::entry::LogLevel;
use super::store::LogStore;

pub trait LogSink: Send + Sync {
    /// Record an event; returns whether it was kept
    fn log(
        &self,
        level: LogLevel,
        message: String,
        context: Option<Value>,
        tag: Option<&str>,
    ) -> bool;
}

impl LogSink for LogStore {
    fn log(
        &self,
        level: LogLevel,
        message: String,
        context: Option<Value>,
        tag: Option<&str>,
    ) -> bool {
        self.append(level, message, context, tag)
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn log(&self, _: LogLevel, _: String, _: Option<Value>, _: Option<&str>) -> bool {
        false
    }
}
