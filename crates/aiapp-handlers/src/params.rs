// crates/aiapp-handlers/src/params.rs
// ============================================================================
// Module: Handler Parameter Access
// Description: Typed extraction of handler input fields.
// Purpose: Report missing or mistyped inputs with stable messages.
// Dependencies: aiapp-core, serde_json
// ============================================================================

//! ## Overview
//! Handlers receive validated parameter maps whose shape is still untrusted
//! beyond what the application schema enforces. These helpers pull typed
//! values out and fail with [`HandlerError::InvalidInput`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use aiapp_core::HandlerError;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Accessors
// ============================================================================

/// Returns the string stored under `key`, failing when absent or null.
///
/// # Errors
///
/// Returns [`HandlerError::InvalidInput`] when the key is missing or the
/// value is not a string.
pub fn required_str<'a>(params: &'a Map<String, Value>, key: &str) -> Result<&'a str, HandlerError> {
    optional_str(params, key)?.ok_or_else(|| missing(key))
}

/// Returns the string stored under `key`, or `None` when absent or null.
///
/// # Errors
///
/// Returns [`HandlerError::InvalidInput`] when the value is not a string.
pub fn optional_str<'a>(
    params: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a str>, HandlerError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(_) => Err(HandlerError::InvalidInput(format!("参数 '{key}' 必须是字符串类型"))),
    }
}

/// Returns the object stored under `key`, failing when absent or null.
///
/// # Errors
///
/// Returns [`HandlerError::InvalidInput`] when the key is missing or the
/// value is not an object.
pub fn required_object<'a>(
    params: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a Map<String, Value>, HandlerError> {
    match params.get(key) {
        None | Some(Value::Null) => Err(missing(key)),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(HandlerError::InvalidInput(format!("参数 '{key}' 必须是对象类型"))),
    }
}

/// Returns the string map stored under `key`; scalars are stringified.
///
/// # Errors
///
/// Returns [`HandlerError::InvalidInput`] when the value is not an object or
/// holds nested objects or arrays.
pub fn string_map(
    params: &Map<String, Value>,
    key: &str,
) -> Result<BTreeMap<String, String>, HandlerError> {
    let map = match params.get(key) {
        None | Some(Value::Null) => return Ok(BTreeMap::new()),
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(HandlerError::InvalidInput(format!("参数 '{key}' 必须是对象类型")));
        }
    };
    map.iter()
        .map(|(name, value)| {
            let text = match value {
                Value::String(text) => text.clone(),
                Value::Bool(_) | Value::Number(_) => value.to_string(),
                Value::Null => String::new(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(HandlerError::InvalidInput(format!(
                        "参数 '{key}.{name}' 必须是字符串类型"
                    )));
                }
            };
            Ok((name.clone(), text))
        })
        .collect()
}

/// Builds the missing-parameter error.
fn missing(key: &str) -> HandlerError {
    HandlerError::InvalidInput(format!("缺少必填参数: {key}"))
}
