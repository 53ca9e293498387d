//! DataStore - ephemeral key → JSON value store for a test run
//!
//! One `RwLock` over a `BTreeMap`: writes are atomic, exports list keys in
//! a stable order, and `import` swaps the whole map in one step.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::generate::{self, GenerateOptions, RecordKind};
use super::schema::{FieldType, Schema, Violation};
use crate::clock::{self, Clock};
use crate::error::{Result, SteadyError};
use crate::logs::write_json;

/// Thread-safe key/value storage shared through `Arc`
pub struct DataStore {
    entries: RwLock<BTreeMap<String, Value>>,
    clock: Arc<dyn Clock>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::with_clock(clock::system())
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            clock,
        }
    }

    /// Insert or overwrite `key` (last write wins); returns the previous value
    pub fn store(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.write().insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.read().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Remove one key
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.entries.write().remove(key)
    }

    /// Remove everything
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build a record of `kind` using this store's clock
    pub fn generate(&self, kind: RecordKind, options: &GenerateOptions) -> Value {
        generate::generate(kind, options, self.clock.now())
    }

    /// Generate a record and store it under `key`
    pub fn generate_and_store(
        &self,
        key: impl Into<String>,
        kind: RecordKind,
        options: &GenerateOptions,
    ) -> Value {
        let record = self.generate(kind, options);
        self.store(key, record.clone());
        record
    }

    /// Structural check, see [`super::schema::validate`]
    pub fn validate(&self, value: &Value, schema: &Schema) -> Vec<Violation> {
        super::schema::validate(value, schema)
    }

    /// Entry count, breakdown by value type, approximate footprint
    pub fn summarize(&self) -> StoreSummary {
        StoreSummary::of(&self.entries.read())
    }

    /// Write the whole store plus a summary as JSON to `path`
    pub fn export(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let export = {
            let entries = self.entries.read();
            DataExport {
                timestamp: self.clock.now(),
                summary: StoreSummary::of(&entries),
                data: entries.clone(),
            }
        };

        write_json(path, &export)?;
        tracing::info!(path = %path.display(), entries = export.data.len(), "Exported data");
        Ok(path.to_path_buf())
    }

    /// Replace the store contents with the `data` of an export file
    ///
    /// Returns the number of imported entries. On error the store is untouched.
    pub fn import(&self, path: impl AsRef<Path>) -> Result<usize> {
        let export = DataExport::read(path)?;
        let count = export.data.len();
        *self.entries.write() = export.data;
        tracing::info!(entries = count, "Imported data");
        Ok(count)
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStore")
            .field("len", &self.len())
            .finish()
    }
}

/// Summary reported by [`DataStore::summarize`] and embedded in exports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub entries: usize,
    pub by_type: BTreeMap<String, usize>,
    /// Serialized JSON length of the stored map, in bytes
    pub approx_bytes: usize,
}

impl StoreSummary {
    fn of(entries: &BTreeMap<String, Value>) -> Self {
        let mut by_type = BTreeMap::new();
        for value in entries.values() {
            *by_type
                .entry(FieldType::of(value).as_str().to_string())
                .or_default() += 1;
        }
        Self {
            entries: entries.len(),
            by_type,
            approx_bytes: serde_json::to_vec(entries).map(|b| b.len()).unwrap_or(0),
        }
    }
}

/// On-disk shape of a data export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataExport {
    pub timestamp: DateTime<Utc>,
    pub data: BTreeMap<String, Value>,
    #[serde(default)]
    pub summary: StoreSummary,
}

impl DataExport {
    /// Read an export file written by [`DataStore::export`]
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SteadyError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| SteadyError::InvalidExport {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn fixed_store() -> DataStore {
        let t = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        DataStore::with_clock(Arc::new(FixedClock::new(t)))
    }

    #[test]
    fn store_overwrites_by_key() {
        let store = fixed_store();
        assert_eq!(store.store("k", json!(1)), None);
        assert_eq!(store.store("k", json!(2)), Some(json!(1)));
        assert_eq!(store.get("k"), Some(json!(2)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_and_clear() {
        let store = fixed_store();
        store.store("a", json!("x"));
        store.store("b", json!("y"));

        assert_eq!(store.remove("a"), Some(json!("x")));
        assert!(!store.contains("a"));
        assert!(store.contains("b"));

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn summarize_counts_types() {
        let store = fixed_store();
        store.store("s", json!("text"));
        store.store("n", json!(3.5));
        store.store("o", json!({"a": 1}));
        store.store("o2", json!({}));
        store.store("z", Value::Null);

        let summary = store.summarize();
        assert_eq!(summary.entries, 5);
        assert_eq!(summary.by_type.get("object"), Some(&2));
        assert_eq!(summary.by_type.get("string"), Some(&1));
        assert_eq!(summary.by_type.get("number"), Some(&1));
        assert_eq!(summary.by_type.get("null"), Some(&1));
        assert!(summary.approx_bytes > 0);
    }

    #[test]
    fn generate_uses_store_clock() {
        let store = fixed_store();
        let record = store.generate(RecordKind::Leave, &GenerateOptions::deterministic());
        assert_eq!(record["from_date"], "2024-06-08");
    }

    #[test]
    fn generate_and_store_keeps_record() {
        let store = fixed_store();
        let record =
            store.generate_and_store("admin", RecordKind::Admin, &GenerateOptions::deterministic());
        assert_eq!(store.get("admin"), Some(record));
    }

    #[test]
    fn export_then_import_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/data.json");

        let store = fixed_store();
        store.store("user", json!({"username": "qa_user", "tags": ["a", "b"]}));
        store.store("count", json!(3));
        store.export(&path).unwrap();

        let fresh = fixed_store();
        fresh.store("stale", json!(true));
        assert_eq!(fresh.import(&path).unwrap(), 2);

        assert_eq!(fresh.keys(), store.keys());
        for key in store.keys() {
            assert_eq!(fresh.get(&key), store.get(&key));
        }
        assert!(!fresh.contains("stale"));
    }

    #[test]
    fn import_rejects_file_without_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs.json");
        fs::write(&path, r#"{"timestamp": "2024-06-01T00:00:00Z", "logs": []}"#).unwrap();

        let store = fixed_store();
        store.store("keep", json!(1));
        let err = store.import(&path).unwrap_err();

        assert_eq!(err.code(), "STEADY-012");
        assert_eq!(store.get("keep"), Some(json!(1)));
    }

    #[test]
    fn import_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = fixed_store().import(dir.path().join("nope.json")).unwrap_err();
        assert_eq!(err.code(), "STEADY-010");
    }

    #[test]
    fn concurrent_writes_all_stored() {
        use std::thread;

        let store = Arc::new(fixed_store());
        let handles: Vec<_> = (0..100)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store.store(format!("key_{}", i), json!({"index": i}));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        for i in 0..100 {
            assert!(store.contains(&format!("key_{}", i)), "key_{} should exist", i);
        }
    }
}
