//! Logs Module - structured, leveled, taggable run log
//!
//! Key types:
//! - `LogLevel` / `LogEntry`: immutable leveled entries with optional context and tag
//! - `LogStore`: thread-safe append-only store with a minimum-level filter
//! - `LogFilter` / `LogQuery`: exact-match queries over a snapshot
//! - `LogExport` / `LogSummary`: JSON export file shape
//! - `LogSink`: trait the resilient executor logs through

mod entry;
mod sink;
mod store;

pub(crate) use store::write_json;

pub use entry::{LogEntry, LogLevel};
pub use sink::{LogSink, NoopSink};
pub use store::{LogExport, LogFilter, LogQuery, LogStore, LogSummary};
