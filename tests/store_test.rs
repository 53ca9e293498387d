//! Log store and data store integration tests

use std::sync::Arc;

use chrono::TimeZone;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

use steady::clock::FixedClock;
use steady::logs::{LogExport, LogFilter, LogLevel, LogStore};
use steady::store::{
    validate, validate_credentials, DataStore, FieldType, GenerateOptions, RecordKind, Schema,
    ViolationKind,
};

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        chrono::Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap(),
    ))
}

// ============================================================================
// Log store
// ============================================================================

#[test]
fn test_level_filter_and_queries() {
    let store = LogStore::with_clock(clock());
    store.set_level(LogLevel::Info);

    assert!(!store.debug("noise", Some("a")));
    assert!(store.info("start", Some("a")));
    assert!(store.warn("slow", Some("b")));
    assert!(store.error("boom", Some("a")));
    assert!(store.info("untagged", None));

    assert_eq!(store.len(), 4);
    let tagged_a: Vec<String> = store
        .query(LogFilter::tag("a"))
        .iter()
        .map(|e| e.message.clone())
        .collect();
    assert_eq!(tagged_a, vec!["start", "boom"]);
    assert_eq!(store.query(LogFilter::level(LogLevel::Debug)).count(), 0);
    assert_eq!(
        store
            .query(LogFilter::level(LogLevel::Info).with_tag("a"))
            .count(),
        1
    );

    let summary = store.summary();
    assert_eq!(summary.total, 4);
    assert_eq!(summary.count(LogLevel::Debug), 0);
    assert_eq!(summary.count(LogLevel::Info), 2);
    assert_eq!(summary.by_tag.get("a"), Some(&2));
    assert_eq!(summary.by_tag.get("b"), Some(&1));
}

#[test]
fn test_log_export_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = LogStore::with_clock(clock());
    store.append(
        LogLevel::Warn,
        "retrying".to_string(),
        Some(json!({ "attempt": 1 })),
        Some("checkout"),
    );
    store.error("gave up", Some("checkout"));

    let path = store.export(dir.path().join("logs").join("run.json")).unwrap();
    let export = LogExport::read(&path).unwrap();

    assert_eq!(export.logs, store.entries());
    assert_eq!(export.summary, store.summary());
    assert_eq!(
        export.timestamp,
        chrono::Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
    );

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["logs"][0]["level"], "warn");
    assert_eq!(raw["logs"][0]["context"]["attempt"], 1);
}

// ============================================================================
// Data store
// ============================================================================

#[test]
fn test_last_write_wins() {
    let store = DataStore::new();
    assert_eq!(store.store("employee", json!({ "id": 1 })), None);
    assert_eq!(
        store.store("employee", json!({ "id": 2 })),
        Some(json!({ "id": 1 }))
    );
    assert_eq!(store.get("employee"), Some(json!({ "id": 2 })));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_data_export_import_round_trip() {
    let dir = TempDir::new().unwrap();
    let source = DataStore::with_clock(clock());
    for kind in RecordKind::ALL {
        source.generate_and_store(kind.as_str(), kind, &GenerateOptions::default().with_seed(3));
    }
    source.store("note", json!("plain string"));
    source.store("count", json!(7));

    let path = source.export(dir.path().join("data.json")).unwrap();

    let target = DataStore::new();
    target.store("stale", json!(true));
    let imported = target.import(&path).unwrap();

    assert_eq!(imported, source.len());
    assert!(!target.contains("stale"));
    assert_eq!(target.keys(), source.keys());
    for key in source.keys() {
        assert_eq!(target.get(&key), source.get(&key));
    }
    assert_eq!(target.summarize(), source.summarize());
}

#[test]
fn test_summary_by_type() {
    let store = DataStore::new();
    store.store("a", json!({}));
    store.store("b", json!([1, 2]));
    store.store("c", json!("x"));
    store.store("d", json!("y"));

    let summary = store.summarize();
    assert_eq!(summary.entries, 4);
    assert_eq!(summary.by_type.get("string"), Some(&2));
    assert_eq!(summary.by_type.get("object"), Some(&1));
    assert_eq!(summary.by_type.get("array"), Some(&1));
    assert!(summary.approx_bytes > 0);
}

#[test]
fn test_generated_records_validate() {
    let store = DataStore::with_clock(clock());
    for kind in RecordKind::ALL {
        let record = store.generate(kind, &GenerateOptions::default());
        assert!(
            store.validate(&record, &kind.schema()).is_empty(),
            "{} record failed its schema",
            kind
        );
    }
}

#[test]
fn test_validation_reports_instead_of_raising() {
    let schema = Schema::new()
        .field("username", FieldType::String)
        .field("age", FieldType::Number);

    let violations = validate(&json!({ "username": 42 }), &schema);
    let messages: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
    assert_eq!(
        messages,
        vec![
            "Missing required field: age",
            "Field username should be of type string, got number",
        ]
    );

    let violations = validate(&json!([1]), &schema);
    assert_eq!(violations.len(), 1);
    assert!(matches!(violations[0].kind, ViolationKind::NotAnObject { .. }));

    assert!(validate_credentials("Admin", "admin123").is_empty());
    assert_eq!(validate_credentials(" ", "short").len(), 2);
}
