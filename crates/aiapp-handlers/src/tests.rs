// crates/aiapp-handlers/src/tests.rs
// ============================================================================
// Module: Handlers Unit Tests
// Description: Parameter extraction and endpoint rendering checks.
// Purpose: Cover pure helpers without network access.
// Dependencies: aiapp-handlers
// ============================================================================

//! ## Overview
//! Unit tests for parameter helpers, URL templates, and cache keys.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

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

use aiapp_core::HandlerError;
use proptest::prelude::*;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::cached::cache_key;
use crate::http::HttpMethod;
use crate::params::optional_str;
use crate::params::required_object;
use crate::params::required_str;
use crate::params::string_map;
use crate::workflow::WorkflowApiConfig;
use crate::workflow::WorkflowRequest;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn invalid_message(err: HandlerError) -> String {
    match err {
        HandlerError::InvalidInput(message) => message,
        other => panic!("expected invalid input, got {other:?}"),
    }
}

// ============================================================================
// SECTION: Parameters
// ============================================================================

#[test]
fn required_str_reports_missing_and_mistyped_keys() {
    let params = object(json!({"url": "http://x", "count": 3}));
    assert_eq!(required_str(&params, "url").unwrap(), "http://x");
    assert_eq!(invalid_message(required_str(&params, "method").unwrap_err()), "缺少必填参数: method");
    assert_eq!(
        invalid_message(required_str(&params, "count").unwrap_err()),
        "参数 'count' 必须是字符串类型"
    );
}

#[test]
fn optional_str_treats_null_as_absent() {
    let params = object(json!({"method": null}));
    assert_eq!(optional_str(&params, "method").unwrap(), None);
    assert_eq!(optional_str(&params, "other").unwrap(), None);
}

#[test]
fn required_object_rejects_non_objects() {
    let params = object(json!({"params": [1, 2]}));
    assert_eq!(
        invalid_message(required_object(&params, "params").unwrap_err()),
        "参数 'params' 必须是对象类型"
    );
}

#[test]
fn string_map_stringifies_scalars_and_rejects_nesting() {
    let params = object(json!({"query": {"page": 2, "q": "cats", "exact": true}}));
    let map = string_map(&params, "query").unwrap();
    assert_eq!(map.get("page").map(String::as_str), Some("2"));
    assert_eq!(map.get("q").map(String::as_str), Some("cats"));
    assert_eq!(map.get("exact").map(String::as_str), Some("true"));

    let nested = object(json!({"query": {"inner": {"a": 1}}}));
    assert!(matches!(string_map(&nested, "query"), Err(HandlerError::InvalidInput(_))));
    assert!(string_map(&object(json!({})), "query").unwrap().is_empty());
}

// ============================================================================
// SECTION: Methods and Endpoints
// ============================================================================

#[test]
fn http_method_parse_is_case_insensitive() {
    assert_eq!(HttpMethod::parse("get").unwrap(), HttpMethod::Get);
    assert_eq!(HttpMethod::parse("POST").unwrap(), HttpMethod::Post);
    assert_eq!(invalid_message(HttpMethod::parse("PUT").unwrap_err()), "仅支持 GET 或 POST 方法");
}

#[test]
fn workflow_urls_substitute_ids_and_trim_slashes() {
    let config = WorkflowApiConfig {
        base_url: "https://api.example.com/".to_string(),
        ..WorkflowApiConfig::default()
    };
    assert_eq!(config.run_url("wf-1"), "https://api.example.com/workflow/run/wf-1");
    assert_eq!(config.result_url("t-9"), "https://api.example.com/task/result/t-9");
}

#[test]
fn workflow_request_requires_every_field() {
    let input = object(json!({
        "userId": "u1",
        "aiApplicationId": "app",
        "workflowId": "wf",
        "apiKey": "k",
        "params": {"q": 1}
    }));
    let request = WorkflowRequest::from_params(&input).unwrap();
    assert_eq!(request.workflow_id, "wf");
    assert_eq!(request.params.get("q"), Some(&json!(1)));

    let mut missing = input;
    missing.remove("apiKey");
    assert_eq!(
        invalid_message(WorkflowRequest::from_params(&missing).unwrap_err()),
        "缺少必填参数: apiKey"
    );
}

// ============================================================================
// SECTION: Cache Keys
// ============================================================================

#[test]
fn cache_key_ignores_caller_context_and_key_order() {
    let first = object(json!({"url": "http://x", "method": "GET", "userId": "u1"}));
    let second = object(json!({"method": "GET", "url": "http://x", "userId": "u2", "aiApplicationId": "a"}));
    let key = cache_key(&first).unwrap();
    assert!(key.starts_with("http-cache:"));
    assert_eq!(key, cache_key(&second).unwrap());

    let other = object(json!({"url": "http://y", "method": "GET"}));
    assert_ne!(key, cache_key(&other).unwrap());
}

proptest! {
    #[test]
    fn cache_key_is_stable_under_any_caller_context(
        user in "[a-z0-9-]{0,16}",
        app in "[a-z0-9-]{0,16}",
        path in "[a-z]{1,12}",
    ) {
        let url = format!("http://api.example.com/{path}");
        let bare = object(json!({"method": "GET", "url": url}));
        let with_context =
            object(json!({"url": url, "method": "GET", "userId": user, "aiApplicationId": app}));
        prop_assert_eq!(cache_key(&bare).unwrap(), cache_key(&with_context).unwrap());
    }
}
