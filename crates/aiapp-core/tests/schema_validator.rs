// crates/aiapp-core/tests/schema_validator.rs
// ============================================================================
// Module: Schema Validator Tests
// Description: Default filling, validation, and friendly message rendering.
// Purpose: Pin the caller-visible behavior of parameter normalization.
// ============================================================================

//! ## Overview
//! Covers required-only defaulting, nested/array recursion, parse failures,
//! and the combined human-readable validation message.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use aiapp_core::SchemaError;
use aiapp_core::SchemaValidator;
use serde_json::Value;
use serde_json::json;

use crate::common::greeting_schema;
use crate::common::profile_schema;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Validates against the profile schema and returns the validation message.
fn profile_failure(input: &Value) -> String {
    let validator = SchemaValidator::default();
    match validator.validate_and_apply_defaults(input, "profile", &profile_schema()) {
        Err(SchemaError::Validation(message)) => message,
        other => panic!("expected validation failure, got {other:?}"),
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

#[test]
fn required_default_fills_empty_input() {
    let validator = SchemaValidator::default();
    let filled =
        validator.validate_and_apply_defaults(&json!({}), "greeting", &greeting_schema()).unwrap();
    assert_eq!(Value::Object(filled), json!({"x": "hi"}));
}

#[test]
fn wrong_type_reports_type_message() {
    let validator = SchemaValidator::default();
    let err = validator
        .validate_and_apply_defaults(&json!({"x": 5}), "greeting", &greeting_schema())
        .unwrap_err();
    let SchemaError::Validation(message) = err else {
        panic!("expected validation error");
    };
    assert!(message.starts_with("参数校验失败: "), "{message}");
    assert!(message.contains("x 类型不正确"), "{message}");
}

#[test]
fn optional_defaults_are_not_injected() {
    let validator = SchemaValidator::default();
    let filled = validator
        .validate_and_apply_defaults(&json!({"name": "Ada"}), "profile", &profile_schema())
        .unwrap();
    assert_eq!(filled.get("level"), Some(&json!("low")));
    assert!(!filled.contains_key("nickname"));
    assert!(!filled.contains_key("age"));
}

#[test]
fn null_required_value_takes_default() {
    let validator = SchemaValidator::default();
    let filled = validator
        .validate_and_apply_defaults(&json!({"x": null}), "greeting", &greeting_schema())
        .unwrap();
    assert_eq!(filled.get("x"), Some(&json!("hi")));
}

#[test]
fn nested_objects_use_their_own_required_set() {
    let validator = SchemaValidator::default();
    let filled = validator
        .validate_and_apply_defaults(
            &json!({"name": "Ada", "address": {"zip": "75001"}}),
            "profile",
            &profile_schema(),
        )
        .unwrap();
    let address = filled.get("address").unwrap();
    assert_eq!(address, &json!({"zip": "75001", "city": "Paris"}));
}

#[test]
fn array_object_elements_are_defaulted_in_order() {
    let validator = SchemaValidator::default();
    let filled = validator
        .validate_and_apply_defaults(
            &json!({"name": "Ada", "tags": [{"label": "a"}, {"label": "b", "weight": 5}]}),
            "profile",
            &profile_schema(),
        )
        .unwrap();
    assert_eq!(
        filled.get("tags").unwrap(),
        &json!([{"label": "a", "weight": 1}, {"label": "b", "weight": 5}])
    );
}

#[test]
fn non_object_array_elements_pass_through_defaulting() {
    let validator = SchemaValidator::default();
    let message = match validator.validate_and_apply_defaults(
        &json!({"name": "Ada", "tags": ["plain"]}),
        "profile",
        &profile_schema(),
    ) {
        Err(SchemaError::Validation(message)) => message,
        other => panic!("expected validation failure, got {other:?}"),
    };
    assert!(message.contains("tags 类型不正确"), "{message}");
}

#[test]
fn schema_without_properties_returns_input() {
    let validator = SchemaValidator::default();
    let filled = validator
        .validate_and_apply_defaults(&json!({"free": 1}), "open", r#"{"type":"object"}"#)
        .unwrap();
    assert_eq!(Value::Object(filled), json!({"free": 1}));
}

// ============================================================================
// SECTION: Input Forms
// ============================================================================

#[test]
fn json_string_input_is_decoded() {
    let validator = SchemaValidator::default();
    let filled = validator
        .validate_and_apply_defaults(&json!("{}"), "greeting", &greeting_schema())
        .unwrap();
    assert_eq!(filled.get("x"), Some(&json!("hi")));
}

#[test]
fn undecodable_string_input_is_parse_error() {
    let validator = SchemaValidator::default();
    let err = validator
        .validate_and_apply_defaults(&json!("{not json"), "greeting", &greeting_schema())
        .unwrap_err();
    assert!(matches!(err, SchemaError::InputParse(_)));
    assert!(err.is_parse_error());
    assert!(err.to_string().starts_with("无法解析输入JSON字符串"));
}

#[test]
fn non_object_input_is_rejected() {
    let validator = SchemaValidator::default();
    for input in [json!(5), json!([1, 2]), json!("[1]"), Value::Null] {
        let err =
            validator.validate_and_apply_defaults(&input, "greeting", &greeting_schema()).unwrap_err();
        assert!(matches!(err, SchemaError::InputShape), "{input}");
    }
}

#[test]
fn malformed_schema_is_parse_error() {
    let validator = SchemaValidator::default();
    let err = validator.validate_and_apply_defaults(&json!({}), "broken", "{").unwrap_err();
    assert!(matches!(err, SchemaError::Parse(_)));
    assert!(err.to_string().starts_with("无法解析 JSON Schema"));
}

// ============================================================================
// SECTION: Messages
// ============================================================================

#[test]
fn missing_required_field_uses_description_label() {
    let message = profile_failure(&json!({}));
    assert_eq!(message, "参数校验失败: 姓名 是必填项");
}

#[test]
fn bounds_are_rendered_in_messages() {
    let message = profile_failure(&json!({"name": "A", "age": 200}));
    assert!(message.contains("姓名 长度不能少于 2"), "{message}");
    assert!(message.contains("年龄 不能大于 150"), "{message}");
    assert_eq!(message.matches('；').count(), 1, "two violations joined once: {message}");
}

#[test]
fn enum_pattern_and_item_messages() {
    let message = profile_failure(&json!({
        "name": "Ada",
        "level": "mid",
        "address": {"zip": "abc"},
        "tags": []
    }));
    assert!(message.contains("level 取值不在允许范围内"), "{message}");
    assert!(message.contains("地址 格式不符合要求"), "{message}");
    assert!(message.contains("tags 项目数不能少于 1"), "{message}");
}

#[test]
fn max_length_and_minimum_messages() {
    let message = profile_failure(&json!({"name": "abcdefghijk", "age": -1}));
    assert!(message.contains("姓名 长度不能超过 8"), "{message}");
    assert!(message.contains("年龄 不能小于 0"), "{message}");
}

#[test]
fn unrecognized_keyword_falls_back_to_raw_message() {
    let schema = json!({
        "type": "object",
        "properties": {"n": {"type": "number", "multipleOf": 5}}
    })
    .to_string();
    let validator = SchemaValidator::default();
    let err = validator.validate_and_apply_defaults(&json!({"n": 7}), "mult", &schema).unwrap_err();
    assert!(err.to_string().contains("n 校验失败: "), "{err}");
}

// ============================================================================
// SECTION: Caching
// ============================================================================

#[test]
fn compiled_validator_is_cached_per_key() {
    let validator = SchemaValidator::default();
    validator.validate_and_apply_defaults(&json!({}), "k1", &greeting_schema()).unwrap();
    validator.validate_and_apply_defaults(&json!({}), "k1", &greeting_schema()).unwrap();
    assert_eq!(validator.cache().len(), 1);
    validator.validate_and_apply_defaults(&json!({}), "k2", &greeting_schema()).unwrap();
    assert_eq!(validator.cache().len(), 2);
    assert!(validator.invalidate("k1"));
    assert_eq!(validator.cache().len(), 1);
}

#[test]
fn schema_text_key_is_used_without_explicit_key() {
    let validator = SchemaValidator::default();
    let schema = greeting_schema();
    validator.validate_with_schema_text(&json!({}), &schema).unwrap();
    assert!(validator.invalidate(&schema));
}
