// crates/aiapp-core/tests/common/mod.rs
// ============================================================================
// Module: AI App Core Test Helpers
// Description: Shared handlers, sinks, and fixtures for core integration tests.
// Purpose: Keep test setup consistent across suites.
// Dependencies: aiapp-core, serde_json
// ============================================================================

//! ## Overview
//! Provides recording audit sinks, scripted handlers, and schema fixtures.

#![allow(dead_code, reason = "Helpers are shared across test crates that use subsets.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only helpers use panic-based assertions."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use aiapp_core::AppHandler;
use aiapp_core::AuditEvent;
use aiapp_core::AuditSink;
use aiapp_core::HandlerError;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink that keeps every event in memory.
#[derive(Default, Clone)]
pub struct MemoryAuditSink {
    /// Recorded events.
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl MemoryAuditSink {
    /// Returns the recorded event labels in order.
    pub fn labels(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|event| event.event).collect()
    }

    /// Returns the recorded events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &AuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Handler returning its parameters unchanged.
pub struct EchoHandler;

impl AppHandler for EchoHandler {
    fn execute(&self, params: &Map<String, Value>) -> Result<Value, HandlerError> {
        Ok(Value::Object(params.clone()))
    }
}

/// Handler that always fails remotely.
pub struct FailingHandler;

impl AppHandler for FailingHandler {
    fn execute(&self, _params: &Map<String, Value>) -> Result<Value, HandlerError> {
        Err(HandlerError::Remote("connection refused".to_string()))
    }
}

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Schema with one required string field defaulting to `hi`.
pub fn greeting_schema() -> String {
    json!({
        "type": "object",
        "properties": {"x": {"type": "string", "default": "hi"}},
        "required": ["x"]
    })
    .to_string()
}

/// Schema exercising nested objects, arrays, and constraints.
pub fn profile_schema() -> String {
    json!({
        "type": "object",
        "properties": {
            "name": {"type": "string", "description": "姓名", "minLength": 2, "maxLength": 8},
            "age": {"type": "integer", "description": "年龄", "minimum": 0, "maximum": 150},
            "nickname": {"type": "string", "default": "anon"},
            "level": {"type": "string", "enum": ["low", "high"], "default": "low"},
            "address": {
                "type": "object",
                "description": "地址",
                "properties": {
                    "city": {"type": "string", "default": "Paris"},
                    "zip": {"type": "string", "pattern": "^[0-9]{5}$"},
                    "note": {"type": "string", "default": "none"}
                },
                "required": ["city"]
            },
            "tags": {
                "type": "array",
                "minItems": 1,
                "maxItems": 3,
                "items": {
                    "type": "object",
                    "properties": {
                        "label": {"type": "string"},
                        "weight": {"type": "number", "default": 1}
                    },
                    "required": ["label", "weight"]
                }
            }
        },
        "required": ["name", "level"]
    })
    .to_string()
}
