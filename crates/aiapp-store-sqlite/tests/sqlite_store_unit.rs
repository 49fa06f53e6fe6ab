// crates/aiapp-store-sqlite/tests/sqlite_store_unit.rs
// ============================================================================
// Module: SQLite Record Store Unit Tests
// Description: Lifecycle, durability, and integrity tests for the SQLite store.
// Purpose: Validate path safety, schema versioning, size limits, terminal
//          transitions, listing order, and corruption detection.
// ============================================================================

//! ## Overview
//! Unit-level tests for `SQLite` record store invariants:
//! - Path safety checks (empty/directory rejection)
//! - Schema version validation
//! - Exactly-once terminal transitions, including under contention
//! - Newest-first listing with filters and limits
//! - Fail-closed decoding of tampered rows

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use aiapp_core::ExecutionRecordStore;
use aiapp_core::NewRecord;
use aiapp_core::RecordId;
use aiapp_core::RecordQuery;
use aiapp_core::RecordStatus;
use aiapp_core::StoreError;
use aiapp_store_sqlite::SqliteExecutionRecordStore;
use aiapp_store_sqlite::SqliteStoreConfig;
use aiapp_store_sqlite::SqliteStoreError;
use aiapp_store_sqlite::SqliteStoreMode;
use aiapp_store_sqlite::SqliteSyncMode;
use rusqlite::Connection;
use rusqlite::params;
use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn config_for_path(path: PathBuf) -> SqliteStoreConfig {
    SqliteStoreConfig {
        path,
        busy_timeout_ms: 1_000,
        journal_mode: SqliteStoreMode::Wal,
        sync_mode: SqliteSyncMode::Normal,
        read_pool_size: 2,
        max_payload_bytes: None,
    }
}

fn open(temp: &TempDir) -> SqliteExecutionRecordStore {
    SqliteExecutionRecordStore::new(config_for_path(temp.path().join("records.db"))).unwrap()
}

fn new_record(user: &str, app: &str, task: Option<&str>) -> NewRecord {
    NewRecord::new(
        user,
        app,
        "async_workflow",
        json!({"workflowId": "wf", "apiKey": "k"}),
        task.map(str::to_string),
    )
    .with_display_input(json!({"workflowId": "wf", "apiKey": "******"}))
}

// ============================================================================
// SECTION: Configuration and Paths
// ============================================================================

#[test]
fn rejects_empty_and_directory_paths() {
    let temp = TempDir::new().unwrap();
    let empty = SqliteExecutionRecordStore::new(config_for_path(PathBuf::new()));
    assert!(matches!(empty, Err(SqliteStoreError::Invalid(_))));
    let directory = SqliteExecutionRecordStore::new(config_for_path(temp.path().to_path_buf()));
    assert!(matches!(directory, Err(SqliteStoreError::Invalid(_))));
}

#[test]
fn rejects_zero_read_pool_and_out_of_range_payload_limit() {
    let temp = TempDir::new().unwrap();
    let mut config = config_for_path(temp.path().join("a.db"));
    config.read_pool_size = 0;
    assert!(matches!(SqliteExecutionRecordStore::new(config), Err(SqliteStoreError::Invalid(_))));

    let mut config = config_for_path(temp.path().join("b.db"));
    config.max_payload_bytes = Some(0);
    assert!(matches!(SqliteExecutionRecordStore::new(config), Err(SqliteStoreError::Invalid(_))));
}

#[test]
fn creates_missing_parent_directories() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("deeper").join("records.db");
    let store = SqliteExecutionRecordStore::new(config_for_path(path.clone())).unwrap();
    store.readiness().unwrap();
    assert!(path.exists());
}

#[test]
fn readiness_checks_read_and_write_connections_after_writes() {
    let temp = TempDir::new().unwrap();
    let store = open(&temp);
    store.readiness().unwrap();
    let id = store.create_record(new_record("u", "app", Some("task-r"))).unwrap();
    store.mark_succeeded(&id, json!({"ok": true}), 3).unwrap();
    store.readiness().unwrap();
    assert_eq!(store.count_records().unwrap(), 1);
}

#[test]
fn rejects_unknown_schema_version() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("records.db");
    drop(SqliteExecutionRecordStore::new(config_for_path(path.clone())).unwrap());
    let connection = Connection::open(&path).unwrap();
    connection.execute("UPDATE store_meta SET version = ?1", params![99_i64]).unwrap();
    drop(connection);

    let reopened = SqliteExecutionRecordStore::new(config_for_path(path));
    assert!(matches!(reopened, Err(SqliteStoreError::VersionMismatch(_))));
}

// ============================================================================
// SECTION: Lifecycle
// ============================================================================

#[test]
fn record_lifecycle_round_trips_through_disk() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("records.db");
    let id = {
        let store = SqliteExecutionRecordStore::new(config_for_path(path.clone())).unwrap();
        let id = store.create_record(new_record("u1", "app", Some("t-1")).with_credit_cost(5)).unwrap();
        let running = store.get_record(&id).unwrap().unwrap();
        assert_eq!(running.status, RecordStatus::Running);
        assert_eq!(running.execution_time_ms, None);
        store.mark_succeeded(&id, json!({"answer": "ok"}), 120).unwrap();
        id
    };

    let store = SqliteExecutionRecordStore::new(config_for_path(path)).unwrap();
    let record = store.get_record(&id).unwrap().unwrap();
    assert_eq!(record.status, RecordStatus::Succeeded);
    assert_eq!(record.output, Some(json!({"answer": "ok"})));
    assert_eq!(record.error_message, None);
    assert_eq!(record.execution_time_ms, Some(120));
    assert_eq!(record.credit_cost, 5);
    assert_eq!(record.input["apiKey"], json!("k"));
    assert_eq!(record.display_input["apiKey"], json!("******"));
    assert_eq!(record.remote_task_id.as_deref(), Some("t-1"));
    assert!(record.updated_at_ms >= record.created_at_ms);
}

#[test]
fn terminal_records_reject_second_transition() {
    let temp = TempDir::new().unwrap();
    let store = open(&temp);
    let id = store.create_record(new_record("u1", "app", None)).unwrap();

    store.mark_failed(&id, "任务执行失败", 30).unwrap();
    let err = store.mark_succeeded(&id, json!(1), 40).unwrap_err();
    assert!(matches!(err, StoreError::Terminal(_)));

    let record = store.get_record(&id).unwrap().unwrap();
    assert_eq!(record.status, RecordStatus::Failed);
    assert_eq!(record.error_message.as_deref(), Some("任务执行失败"));
    assert_eq!(record.output, None);
}

#[test]
fn unknown_records_are_not_found() {
    let temp = TempDir::new().unwrap();
    let store = open(&temp);
    let missing = RecordId::new("missing");
    assert!(matches!(store.mark_failed(&missing, "x", 1), Err(StoreError::NotFound(_))));
    assert_eq!(store.get_record(&missing).unwrap(), None);
}

#[test]
fn concurrent_terminal_transitions_settle_once() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(open(&temp));
    let id = store.create_record(new_record("u1", "app", None)).unwrap();

    let handles: Vec<_> = (0 .. 8)
        .map(|worker| {
            let store = Arc::clone(&store);
            let id = id.clone();
            thread::spawn(move || store.mark_succeeded(&id, json!(worker), 1).is_ok())
        })
        .collect();
    let successes = handles.into_iter().map(|handle| handle.join().unwrap()).filter(|ok| *ok).count();

    assert_eq!(successes, 1);
    assert_eq!(store.get_record(&id).unwrap().unwrap().status, RecordStatus::Succeeded);
}

// ============================================================================
// SECTION: Queries
// ============================================================================

#[test]
fn lists_newest_first_with_filters_and_limit() {
    let temp = TempDir::new().unwrap();
    let store = open(&temp);
    let first = store.create_record(new_record("u1", "alpha", None)).unwrap();
    let second = store.create_record(new_record("u2", "alpha", None)).unwrap();
    let third = store.create_record(new_record("u1", "beta", None)).unwrap();
    store.mark_failed(&first, "boom", 1).unwrap();

    let all = store.list_records(&RecordQuery::default()).unwrap();
    let ids: Vec<RecordId> = all.into_iter().map(|record| record.id).collect();
    assert_eq!(ids, vec![third.clone(), second.clone(), first.clone()]);

    let by_user = store
        .list_records(&RecordQuery {
            user_id: Some("u1".into()),
            ..RecordQuery::default()
        })
        .unwrap();
    assert_eq!(by_user.len(), 2);

    let by_app_and_status = store
        .list_records(&RecordQuery {
            application_id: Some("alpha".into()),
            status: Some(RecordStatus::Running),
            ..RecordQuery::default()
        })
        .unwrap();
    assert_eq!(by_app_and_status.len(), 1);
    assert_eq!(by_app_and_status[0].id, second);

    let limited = store
        .list_records(&RecordQuery {
            limit: Some(1),
            ..RecordQuery::default()
        })
        .unwrap();
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].id, third);
    assert_eq!(store.count_records().unwrap(), 3);
}

#[test]
fn find_by_remote_task_returns_latest_match() {
    let temp = TempDir::new().unwrap();
    let store = open(&temp);
    store.create_record(new_record("u1", "app", Some("t-9"))).unwrap();
    let latest = store.create_record(new_record("u1", "app", Some("t-9"))).unwrap();

    assert_eq!(store.find_by_remote_task("t-9").unwrap().unwrap().id, latest);
    assert_eq!(store.find_by_remote_task("t-0").unwrap(), None);
}

// ============================================================================
// SECTION: Integrity
// ============================================================================

#[test]
fn oversized_payloads_are_rejected() {
    let temp = TempDir::new().unwrap();
    let mut config = config_for_path(temp.path().join("records.db"));
    config.max_payload_bytes = Some(64);
    let store = SqliteExecutionRecordStore::new(config).unwrap();

    let big = NewRecord::new("u1", "app", "sync_workflow", json!({"blob": "x".repeat(128)}), None);
    assert!(matches!(store.create_record(big), Err(StoreError::Invalid(_))));

    let id = store.create_record(new_record("u1", "app", None)).unwrap();
    let err = store.mark_succeeded(&id, json!({"blob": "y".repeat(128)}), 1).unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));
    assert_eq!(store.get_record(&id).unwrap().unwrap().status, RecordStatus::Running);
}

#[test]
fn tampered_rows_fail_closed() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("records.db");
    let store = SqliteExecutionRecordStore::new(config_for_path(path.clone())).unwrap();
    let bad_status = store.create_record(new_record("u1", "app", None)).unwrap();
    let bad_json = store.create_record(new_record("u1", "app", None)).unwrap();

    let connection = Connection::open(&path).unwrap();
    connection
        .execute(
            "UPDATE execution_records SET status = 7 WHERE record_id = ?1",
            params![bad_status.as_str()],
        )
        .unwrap();
    connection
        .execute(
            "UPDATE execution_records SET input_json = '{not json' WHERE record_id = ?1",
            params![bad_json.as_str()],
        )
        .unwrap();
    drop(connection);

    assert!(matches!(store.get_record(&bad_status), Err(StoreError::Invalid(_))));
    assert!(matches!(store.get_record(&bad_json), Err(StoreError::Invalid(_))));
    assert!(store.list_records(&RecordQuery::default()).is_err());
}
