// crates/aiapp-core/src/runtime/messages.rs
// ============================================================================
// Module: Validation Messages
// Description: Human-readable rendering of schema violations.
// Purpose: Turn raw validator errors into one sentence per failing field.
// Dependencies: crate::core::schema, jsonschema, serde_json
// ============================================================================

//! ## Overview
//! Each violation is attributed to the top-level property it occurs under and
//! labeled with that property's `description` (falling back to its name, or
//! to a generic label when the violation sits at the document root). The
//! sentence wording depends on the violated keyword; bounded keywords include
//! their limit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use jsonschema::ValidationError;
use jsonschema::error::ValidationErrorKind;
use serde_json::Value;

use crate::core::schema::SchemaNode;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Label used when a violation cannot be attributed to a field.
pub const DEFAULT_LABEL: &str = "参数";
/// Separator between messages for different violations.
pub const MESSAGE_SEPARATOR: &str = "；";
/// Prefix of the combined validation failure message.
pub const VALIDATION_PREFIX: &str = "参数校验失败: ";

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders one violation against the root schema.
#[must_use]
pub fn friendly_message(error: &ValidationError<'_>, schema: SchemaNode<'_>) -> String {
    let field = violating_field(error);
    let label = field_label(field.as_deref(), schema);
    match error.kind() {
        ValidationErrorKind::Required {
            ..
        } => format!("{label} 是必填项"),
        ValidationErrorKind::MinLength {
            limit,
        } => format!("{label} 长度不能少于 {limit}"),
        ValidationErrorKind::MaxLength {
            limit,
        } => format!("{label} 长度不能超过 {limit}"),
        ValidationErrorKind::Minimum {
            limit,
        } => format!("{label} 不能小于 {}", render_bound(limit)),
        ValidationErrorKind::Maximum {
            limit,
        } => format!("{label} 不能大于 {}", render_bound(limit)),
        ValidationErrorKind::MinItems {
            limit,
        } => format!("{label} 项目数不能少于 {limit}"),
        ValidationErrorKind::MaxItems {
            limit,
        } => format!("{label} 项目数不能超过 {limit}"),
        ValidationErrorKind::Enum {
            ..
        } => format!("{label} 取值不在允许范围内"),
        ValidationErrorKind::Type {
            ..
        } => format!("{label} 类型不正确"),
        ValidationErrorKind::Pattern {
            ..
        } => format!("{label} 格式不符合要求"),
        _ => format!("{label} 校验失败: {error}"),
    }
}

/// Joins per-violation messages into the single caller-facing message.
#[must_use]
pub fn combine_messages(messages: &[String]) -> String {
    format!("{VALIDATION_PREFIX}{}", messages.join(MESSAGE_SEPARATOR))
}

/// Resolves the display label for a top-level field.
#[must_use]
pub fn field_label(field: Option<&str>, schema: SchemaNode<'_>) -> String {
    let Some(name) = field else {
        return DEFAULT_LABEL.to_string();
    };
    schema
        .property(name)
        .and_then(|node| node.description())
        .filter(|description| !description.is_empty())
        .unwrap_or(name)
        .to_string()
}

/// Returns the first segment of a JSON pointer, unescaped.
#[must_use]
pub fn top_level_segment(pointer: &str) -> Option<String> {
    pointer
        .strip_prefix('/')?
        .split('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Attributes a violation to a top-level field name.
fn violating_field(error: &ValidationError<'_>) -> Option<String> {
    if let Some(field) = top_level_segment(error.instance_path().as_str()) {
        return Some(field);
    }
    match error.kind() {
        ValidationErrorKind::Required {
            property,
        } => property.as_str().map(str::to_string),
        _ => None,
    }
}

/// Renders a numeric keyword bound.
fn render_bound(limit: &Value) -> String {
    match limit {
        Value::Number(number) => number.to_string(),
        _ => "?".to_string(),
    }
}
