//! LogStore - thread-safe, append-only structured log
//!
//! - One mutex around the entries and the minimum level: every append is atomic
//! - Entries below the minimum level are dropped (not stored, not echoed)
//! - Stored entries are echoed to `tracing` at the matching level
//! - `query` snapshots the store and iterates the snapshot lazily

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entry::{LogEntry, LogLevel};
use crate::clock::{self, Clock};
use crate::error::{Result, SteadyError};

struct LogState {
    entries: Vec<Arc<LogEntry>>,
    min_level: LogLevel,
}

/// Process-wide structured log (shared through `Arc`)
pub struct LogStore {
    state: Mutex<LogState>,
    clock: Arc<dyn Clock>,
}

impl LogStore {
    /// Create an empty store at the default level (info)
    pub fn new() -> Self {
        Self::with_clock(clock::system())
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(LogState {
                entries: Vec::new(),
                min_level: LogLevel::default(),
            }),
            clock,
        }
    }

    /// Set the minimum level that will be stored
    pub fn set_level(&self, level: LogLevel) {
        self.state.lock().min_level = level;
    }

    pub fn level(&self) -> LogLevel {
        self.state.lock().min_level
    }

    /// Append an entry; returns `false` when it was filtered out by level
    pub fn append(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        context: Option<Value>,
        tag: Option<&str>,
    ) -> bool {
        let entry = {
            let mut state = self.state.lock();
            if level < state.min_level {
                return false;
            }
            let entry = Arc::new(LogEntry {
                timestamp: self.clock.now(),
                level,
                message: message.into(),
                context,
                tag: tag.map(str::to_string),
            });
            state.entries.push(entry.clone());
            entry
        };
        // outside the lock: subscribers may block on I/O
        echo(&entry);
        true
    }

    pub fn debug(&self, message: impl Into<String>, tag: Option<&str>) -> bool {
        self.append(LogLevel::Debug, message, None, tag)
    }

    pub fn info(&self, message: impl Into<String>, tag: Option<&str>) -> bool {
        self.append(LogLevel::Info, message, None, tag)
    }

    pub fn warn(&self, message: impl Into<String>, tag: Option<&str>) -> bool {
        self.append(LogLevel::Warn, message, None, tag)
    }

    pub fn error(&self, message: impl Into<String>, tag: Option<&str>) -> bool {
        self.append(LogLevel::Error, message, None, tag)
    }

    /// Entries matching `filter`, in insertion order
    ///
    /// The result is a snapshot: entries appended afterwards are not seen.
    pub fn query(&self, filter: LogFilter) -> LogQuery {
        LogQuery {
            entries: self.state.lock().entries.clone(),
            filter,
        }
    }

    /// All entries (cloned)
    pub fn entries(&self) -> Vec<LogEntry> {
        self.state
            .lock()
            .entries
            .iter()
            .map(|e| LogEntry::clone(e))
            .collect()
    }

    /// Remove all entries (the minimum level is kept)
    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counts per level and per tag
    pub fn summary(&self) -> LogSummary {
        let state = self.state.lock();
        LogSummary::from_entries(state.entries.iter().map(|e| e.as_ref()))
    }

    /// Write all entries plus a summary as JSON to `path`
    ///
    /// Parent directories are created. Callers decide whether a failure here
    /// is fatal (see [`crate::harness::Harness::export_artifacts`]).
    pub fn export(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let export = {
            let state = self.state.lock();
            LogExport {
                timestamp: self.clock.now(),
                summary: LogSummary::from_entries(state.entries.iter().map(|e| e.as_ref())),
                logs: state.entries.iter().map(|e| LogEntry::clone(e)).collect(),
            }
        };

        write_json(path, &export)?;
        tracing::info!(path = %path.display(), entries = export.logs.len(), "Exported logs");
        Ok(path.to_path_buf())
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("LogStore")
            .field("len", &state.entries.len())
            .field("min_level", &state.min_level)
            .finish()
    }
}

fn echo(entry: &LogEntry) {
    let tag = entry.tag.as_deref().unwrap_or("-");
    match entry.level {
        LogLevel::Debug => tracing::debug!(tag, "{}", entry.message),
        LogLevel::Info => tracing::info!(tag, "{}", entry.message),
        LogLevel::Warn => tracing::warn!(tag, "{}", entry.message),
        LogLevel::Error => tracing::error!(tag, "{}", entry.message),
    }
}

/// Serialize `value` as pretty JSON into `path`, creating parent directories
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| SteadyError::io(dir, e))?;
    }
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).map_err(|e| SteadyError::io(path, e))
}

// ═══════════════════════════════════════════════════════════════
// Query
// ═══════════════════════════════════════════════════════════════

/// Exact-match filter on level and/or tag (`None` matches everything)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub level: Option<LogLevel>,
    pub tag: Option<String>,
}

impl LogFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn level(level: LogLevel) -> Self {
        Self {
            level: Some(level),
            tag: None,
        }
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            level: None,
            tag: Some(tag.into()),
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        self.level.map_or(true, |l| entry.level == l)
            && self.tag.as_deref().map_or(true, |t| entry.has_tag(t))
    }
}

/// Snapshot of matching entries; `iter()` can be called any number of times
#[derive(Debug, Clone)]
pub struct LogQuery {
    entries: Vec<Arc<LogEntry>>,
    filter: LogFilter,
}

impl LogQuery {
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> + '_ {
        self.entries
            .iter()
            .map(|e| e.as_ref())
            .filter(move |e| self.filter.matches(e))
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.iter().cloned().collect()
    }
}

impl<'a> IntoIterator for &'a LogQuery {
    type Item = &'a LogEntry;
    type IntoIter = Box<dyn Iterator<Item = &'a LogEntry> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

// ═══════════════════════════════════════════════════════════════
// Summary + export file
// ═══════════════════════════════════════════════════════════════

/// Derived counts over a set of entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSummary {
    pub total: usize,
    pub by_level: BTreeMap<String, usize>,
    pub by_tag: BTreeMap<String, usize>,
}

impl LogSummary {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a LogEntry>) -> Self {
        let mut summary = Self {
            by_level: LogLevel::ALL
                .iter()
                .map(|l| (l.as_str().to_string(), 0))
                .collect(),
            ..Self::default()
        };
        for entry in entries {
            summary.total += 1;
            *summary
                .by_level
                .entry(entry.level.as_str().to_string())
                .or_default() += 1;
            if let Some(tag) = &entry.tag {
                *summary.by_tag.entry(tag.clone()).or_default() += 1;
            }
        }
        summary
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.by_level.get(level.as_str()).copied().unwrap_or(0)
    }
}

/// On-disk shape of a log export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogExport {
    pub timestamp: DateTime<Utc>,
    pub logs: Vec<LogEntry>,
    pub summary: LogSummary,
}

impl LogExport {
    /// Read an export file written by [`LogStore::export`]
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SteadyError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| SteadyError::InvalidExport {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
