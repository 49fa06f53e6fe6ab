// crates/aiapp-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for bounded reads, locale selection, and run helpers.
// Purpose: Ensure CLI inputs fail closed and background waits are bounded.
// Dependencies: aiapp-cli main helpers
// ============================================================================

//! ## Overview
//! Validates `read_bytes_with_limit` enforces size limits, locale resolution
//! prefers the flag over the environment, and record waits settle or time out.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use aiapp_core::ExecutionRecordStore;
use aiapp_core::InMemoryExecutionRecordStore;
use aiapp_core::NewRecord;
use aiapp_core::RecordId;
use aiapp_core::RecordStatus;
use serde_json::json;

use super::AiAppConfig;
use super::LangArg;
use super::Locale;
use super::ReadLimitError;
use super::read_bytes_with_limit;
use super::read_json_input;
use super::record_value;
use super::resolve_locale;
use super::submitted_record_id;
use super::wait_budget;
use super::wait_for_terminal;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn temp_file(label: &str) -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).expect("clock drift").as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("aiapp-cli-{label}-{nanos}.json"));
    path
}

fn cleanup(path: &PathBuf) {
    let _ = fs::remove_file(path);
}

// ============================================================================
// SECTION: Bounded Reads
// ============================================================================

#[test]
fn read_bytes_with_limit_accepts_small_file() {
    let path = temp_file("small");
    fs::write(&path, b"{}").expect("write");
    let bytes = read_bytes_with_limit(&path, 16).expect("read");
    assert_eq!(bytes, b"{}");
    cleanup(&path);
}

#[test]
fn read_bytes_with_limit_rejects_large_file() {
    let path = temp_file("large");
    fs::write(&path, vec![b'x'; 32]).expect("write");
    let err = read_bytes_with_limit(&path, 8).unwrap_err();
    match err {
        ReadLimitError::TooLarge {
            size,
            limit,
        } => {
            assert_eq!(size, 32);
            assert_eq!(limit, 8);
        }
        ReadLimitError::Io(err) => panic!("unexpected io error: {err}"),
    }
    cleanup(&path);
}

#[test]
fn read_json_input_reports_parse_errors_with_path() {
    let path = temp_file("bad-json");
    fs::write(&path, b"{not json").expect("write");
    let err = read_json_input(&path, "parameters", 1024).unwrap_err();
    assert!(err.to_string().contains(&path.display().to_string()));
    cleanup(&path);
}

#[test]
fn read_json_input_rejects_non_utf8() {
    let path = temp_file("binary");
    fs::write(&path, [0xff_u8, 0xfe]).expect("write");
    let err = read_json_input(&path, "parameters", 1024).unwrap_err();
    assert!(err.to_string().contains("UTF-8"));
    cleanup(&path);
}

// ============================================================================
// SECTION: Locale
// ============================================================================

#[test]
fn resolve_locale_prefers_flag_over_env() {
    assert_eq!(resolve_locale(Some(LangArg::Zh), Some("en")).unwrap(), Locale::Zh);
    assert_eq!(resolve_locale(None, Some("zh_CN.UTF-8")).unwrap(), Locale::Zh);
    assert_eq!(resolve_locale(None, None).unwrap(), Locale::En);
    assert!(resolve_locale(None, Some("fr")).is_err());
}

// ============================================================================
// SECTION: Run Helpers
// ============================================================================

#[test]
fn submitted_record_id_reads_async_envelope() {
    let envelope = json!({"aiAppRecordId": "rec-1", "taskId": "t", "status": 3});
    assert_eq!(submitted_record_id(&envelope), Some(RecordId::new("rec-1")));
    assert_eq!(submitted_record_id(&json!({"statusCode": 200})), None);
}

#[test]
fn wait_budget_covers_every_attempt() {
    let mut config = AiAppConfig::default();
    config.polling.max_attempts = 3;
    config.polling.interval_ms = 10;
    config.workflow.timeout_ms = 100;
    assert_eq!(wait_budget(&config), Duration::from_millis(3 * 110 + 100));
}

#[test]
fn wait_for_terminal_returns_settled_record() {
    let store = InMemoryExecutionRecordStore::new();
    let id = store.create_record(NewRecord::new("u", "app", "async_workflow", json!({}), None)).unwrap();
    store.mark_succeeded(&id, json!({"answer": "ok"}), 5).unwrap();
    let record = wait_for_terminal(&store, &id, Duration::from_millis(10)).unwrap();
    assert_eq!(record.status, RecordStatus::Succeeded);
}

#[test]
fn wait_for_terminal_gives_up_after_budget() {
    let store = InMemoryExecutionRecordStore::new();
    let id = store.create_record(NewRecord::new("u", "app", "async_workflow", json!({}), None)).unwrap();
    let err = wait_for_terminal(&store, &id, Duration::from_millis(60)).unwrap_err();
    assert!(err.to_string().contains(id.as_str()));
}

#[test]
fn record_value_hides_raw_input() {
    let store = InMemoryExecutionRecordStore::new();
    let id = store
        .create_record(
            NewRecord::new("u", "app", "sync_workflow", json!({"apiKey": "secret"}), None)
                .with_display_input(json!({"apiKey": "******"})),
        )
        .unwrap();
    let record = store.get_record(&id).unwrap().unwrap();
    let value = record_value(&record).unwrap();
    assert!(value.get("input").is_none());
    assert!(!value.to_string().contains("\"secret\""));
}
