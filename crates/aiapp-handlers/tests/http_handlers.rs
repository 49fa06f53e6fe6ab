// crates/aiapp-handlers/tests/http_handlers.rs
// ============================================================================
// Module: HTTP Handler Tests
// Description: Plain and cached HTTP passthrough handlers.
// Purpose: Validate request shaping, response capture, policy, and caching.
// Dependencies: aiapp-core, aiapp-handlers, tiny_http
// ============================================================================

//! ## Overview
//! Runs the HTTP handlers against a loopback echo server. The cached handler
//! must serve repeated 2xx responses from memory and never cache failures.

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

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use aiapp_core::AppHandler;
use aiapp_core::HandlerError;
use aiapp_handlers::CachedHttpHandler;
use aiapp_handlers::HttpClient;
use aiapp_handlers::HttpClientConfig;
use aiapp_handlers::HttpHandler;
use aiapp_handlers::ResponseCacheConfig;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::common::MemoryAuditSink;
use crate::common::MockResponse;
use crate::common::MockServer;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Echo server: `/status/{code}` answers with that code, everything else
/// echoes the request.
fn echo_server() -> MockServer {
    MockServer::start(|request| {
        let body = json!({
            "method": request.method,
            "url": request.url,
            "body": request.body,
            "contentType": request.header("Content-Type"),
            "trace": request.header("X-Trace"),
        });
        match request.path().strip_prefix("/status/") {
            Some(code) => MockResponse::with_status(code.parse().unwrap(), &body),
            None => MockResponse::json(&body),
        }
    })
}

fn client() -> HttpClient {
    HttpClient::new(HttpClientConfig::default()).unwrap()
}

fn params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

// ============================================================================
// SECTION: Plain Handler
// ============================================================================

#[test]
fn get_appends_query_params_and_headers() {
    let server = echo_server();
    let handler = HttpHandler::new(client());

    let output = handler
        .execute(&params(json!({
            "url": server.url("/search"),
            "method": "get",
            "headers": {"X-Trace": "abc"},
            "params": {"q": "cats", "page": 2},
        })))
        .unwrap();

    assert_eq!(output["statusCode"], json!(200));
    let echoed = &output["bodyObject"];
    assert_eq!(echoed["method"], json!("GET"));
    assert_eq!(echoed["url"], json!("/search?page=2&q=cats"));
    assert_eq!(echoed["trace"], json!("abc"));
    assert_eq!(output["headers"]["content-type"], json!("application/json"));
    assert_eq!(serde_json::from_str::<Value>(output["body"].as_str().unwrap()).unwrap(), *echoed);
}

#[test]
fn post_defaults_json_content_type_and_sends_body() {
    let server = echo_server();
    let handler = HttpHandler::new(client());

    let output = handler
        .execute(&params(json!({
            "url": server.url("/submit"),
            "method": "POST",
            "body": "{\"a\":1}",
        })))
        .unwrap();

    assert_eq!(output["bodyObject"]["method"], json!("POST"));
    assert_eq!(output["bodyObject"]["body"], json!("{\"a\":1}"));
    assert_eq!(output["bodyObject"]["contentType"], json!("application/json"));
}

#[test]
fn post_keeps_explicit_content_type() {
    let server = echo_server();
    let handler = HttpHandler::new(client());

    let output = handler
        .execute(&params(json!({
            "url": server.url("/submit"),
            "method": "POST",
            "headers": {"Content-Type": "text/plain"},
            "body": "hi",
        })))
        .unwrap();

    assert_eq!(output["bodyObject"]["contentType"], json!("text/plain"));
}

#[test]
fn non_success_status_is_returned_not_raised() {
    let server = echo_server();
    let handler = HttpHandler::new(client());

    let output = handler
        .execute(&params(json!({"url": server.url("/status/503"), "method": "GET"})))
        .unwrap();

    assert_eq!(output["statusCode"], json!(503));
}

#[test]
fn invalid_requests_fail_before_sending() {
    let server = echo_server();
    let handler = HttpHandler::new(client());

    let err = handler
        .execute(&params(json!({"url": server.url("/x"), "method": "DELETE"})))
        .unwrap_err();
    assert!(matches!(err, HandlerError::InvalidInput(message) if message == "仅支持 GET 或 POST 方法"));

    let err = handler.execute(&params(json!({"url": "not a url", "method": "GET"}))).unwrap_err();
    assert!(matches!(err, HandlerError::InvalidInput(message) if message.starts_with("URL 格式错误")));

    let err = handler.execute(&params(json!({"method": "GET"}))).unwrap_err();
    assert!(matches!(err, HandlerError::InvalidInput(message) if message == "缺少必填参数: url"));

    let err = handler
        .execute(&params(json!({"url": "ftp://127.0.0.1/file", "method": "GET"})))
        .unwrap_err();
    assert!(matches!(err, HandlerError::InvalidInput(_)));
    assert!(server.requests().is_empty());
}

#[test]
fn policy_blocks_cleartext_and_unlisted_hosts() {
    let server = echo_server();
    let strict = HttpHandler::new(
        HttpClient::new(HttpClientConfig {
            allow_http: false,
            ..HttpClientConfig::default()
        })
        .unwrap(),
    );
    let err = strict
        .execute(&params(json!({"url": server.url("/x"), "method": "GET"})))
        .unwrap_err();
    assert!(matches!(err, HandlerError::InvalidInput(_)));

    let mut hosts = BTreeSet::new();
    hosts.insert("example.com".to_string());
    let listed = HttpHandler::new(
        HttpClient::new(HttpClientConfig {
            allowed_hosts: Some(hosts),
            ..HttpClientConfig::default()
        })
        .unwrap(),
    );
    let err = listed
        .execute(&params(json!({"url": server.url("/x"), "method": "GET"})))
        .unwrap_err();
    assert!(matches!(err, HandlerError::InvalidInput(message) if message.contains("not allowed")));
    assert!(server.requests().is_empty());
}

#[test]
fn oversized_responses_are_rejected() {
    let server = MockServer::start(|_| MockResponse::json(&json!({"blob": "x".repeat(4096)})));
    let handler = HttpHandler::new(
        HttpClient::new(HttpClientConfig {
            max_response_bytes: 512,
            ..HttpClientConfig::default()
        })
        .unwrap(),
    );

    let err = handler
        .execute(&params(json!({"url": server.url("/big"), "method": "GET"})))
        .unwrap_err();

    assert!(matches!(err, HandlerError::Remote(_)));
}

// ============================================================================
// SECTION: Cached Handler
// ============================================================================

#[test]
fn cached_handler_serves_repeat_requests_from_memory() {
    let server = echo_server();
    let audit = MemoryAuditSink::default();
    let handler =
        CachedHttpHandler::new(client(), ResponseCacheConfig::default(), Arc::new(audit.clone()));
    let request = params(json!({"url": server.url("/cached"), "method": "GET", "userId": "u1"}));

    let first = handler.execute(&request).unwrap();
    let mut other_user = request.clone();
    other_user.insert("userId".to_string(), json!("u2"));
    let second = handler.execute(&other_user).unwrap();

    assert_eq!(first, second);
    assert_eq!(server.count("/cached"), 1);
    assert_eq!(handler.cached_entries(), 1);
    assert_eq!(audit.labels(), vec!["handler_cache_hit"]);
}

#[test]
fn cached_handler_does_not_cache_failures() {
    let server = echo_server();
    let handler = CachedHttpHandler::new(
        client(),
        ResponseCacheConfig::default(),
        Arc::new(MemoryAuditSink::default()),
    );
    let request = params(json!({"url": server.url("/status/500"), "method": "GET"}));

    handler.execute(&request).unwrap();
    handler.execute(&request).unwrap();

    assert_eq!(server.count("/status/500"), 2);
    assert_eq!(handler.cached_entries(), 0);
}

#[test]
fn cached_handler_expires_entries_after_ttl() {
    let server = echo_server();
    let handler = CachedHttpHandler::new(
        client(),
        ResponseCacheConfig {
            ttl_ms: 0,
            max_entries: 10,
        },
        Arc::new(MemoryAuditSink::default()),
    );
    let request = params(json!({"url": server.url("/short"), "method": "GET"}));

    handler.execute(&request).unwrap();
    handler.execute(&request).unwrap();

    assert_eq!(server.count("/short"), 2);
}

#[test]
fn cached_handler_bounds_entry_count() {
    let server = echo_server();
    let handler = CachedHttpHandler::new(
        client(),
        ResponseCacheConfig {
            max_entries: 2,
            ..ResponseCacheConfig::default()
        },
        Arc::new(MemoryAuditSink::default()),
    );

    for path in ["/a", "/b", "/c"] {
        handler.execute(&params(json!({"url": server.url(path), "method": "GET"}))).unwrap();
    }

    assert_eq!(handler.cached_entries(), 2);
}
