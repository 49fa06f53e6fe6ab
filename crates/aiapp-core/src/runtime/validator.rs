// crates/aiapp-core/src/runtime/validator.rs
// ============================================================================
// Module: Schema Validator
// Description: Default filling and validation of application parameters.
// Purpose: Normalize caller input against a dynamically loaded JSON Schema.
// Dependencies: crate::{core, runtime::cache, runtime::messages}, jsonschema
// ============================================================================

//! ## Overview
//! [`SchemaValidator`] parses the caller's input document, fills defaults for
//! missing *required* properties (recursing into nested objects and arrays of
//! objects), then validates the filled document with a compiled draft-07
//! validator fetched from the [`SchemaCache`] by caller key. The raw schema
//! tree is reparsed on every call; only the compiled validator is cached.
//!
//! Optional properties never receive defaults, even when the schema declares
//! one. The compiled validator never fills defaults itself, so defaults are
//! applied exactly once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use jsonschema::Draft;
use jsonschema::Validator;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::schema::SchemaNode;
use crate::runtime::cache::SchemaCache;
use crate::runtime::cache::SchemaCacheConfig;
use crate::runtime::messages::combine_messages;
use crate::runtime::messages::friendly_message;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Schema parsing and validation errors.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Schema text is not valid JSON.
    #[error("无法解析 JSON Schema: {0}")]
    Parse(String),
    /// Input string is not valid JSON.
    #[error("无法解析输入JSON字符串: {0}")]
    InputParse(String),
    /// Input is neither an object nor a JSON object string.
    #[error("输入数据必须是 Map 或 JSON 字符串。")]
    InputShape,
    /// Schema JSON is not a usable JSON Schema.
    #[error("无法编译 JSON Schema: {0}")]
    Compile(String),
    /// Filled input violates the schema (combined friendly message).
    #[error("{0}")]
    Validation(String),
}

impl SchemaError {
    /// Returns true for malformed schema or input errors.
    #[must_use]
    pub const fn is_parse_error(&self) -> bool {
        !matches!(self, Self::Validation(_))
    }
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Defaulting validator backed by a compiled-schema cache.
pub struct SchemaValidator {
    /// Compiled validators keyed by caller-supplied schema key.
    cache: SchemaCache<Validator>,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new(SchemaCacheConfig::default())
    }
}

impl SchemaValidator {
    /// Creates a validator with the given cache bounds.
    #[must_use]
    pub fn new(config: SchemaCacheConfig) -> Self {
        Self {
            cache: SchemaCache::new(config),
        }
    }

    /// Returns the compiled-validator cache.
    #[must_use]
    pub const fn cache(&self) -> &SchemaCache<Validator> {
        &self.cache
    }

    /// Fills defaults into `input` and validates it against `schema_text`.
    ///
    /// `input` must be a JSON object or a string holding one. `schema_key`
    /// selects the cached compiled validator; callers own key granularity.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Validation`] with one combined message when the
    /// filled document violates the schema, and a parse variant when the
    /// schema or input is malformed.
    pub fn validate_and_apply_defaults(
        &self,
        input: &Value,
        schema_key: &str,
        schema_text: &str,
    ) -> Result<Map<String, Value>, SchemaError> {
        let mut document = parse_input(input)?;
        let schema = parse_schema(schema_text)?;
        let root = SchemaNode::new(&schema);
        apply_defaults(&mut document, root, &root.required());

        let validator = self.compiled(schema_key, &schema)?;
        let document = Value::Object(document);
        let messages: Vec<String> =
            validator.iter_errors(&document).map(|error| friendly_message(&error, root)).collect();
        if !messages.is_empty() {
            return Err(SchemaError::Validation(combine_messages(&messages)));
        }
        match document {
            Value::Object(map) => Ok(map),
            _ => Err(SchemaError::InputShape),
        }
    }

    /// Validates using the schema text itself as the cache key.
    ///
    /// # Errors
    ///
    /// Same as [`SchemaValidator::validate_and_apply_defaults`].
    pub fn validate_with_schema_text(
        &self,
        input: &Value,
        schema_text: &str,
    ) -> Result<Map<String, Value>, SchemaError> {
        self.validate_and_apply_defaults(input, schema_text, schema_text)
    }

    /// Drops the compiled validator cached under `schema_key`.
    pub fn invalidate(&self, schema_key: &str) -> bool {
        self.cache.invalidate(schema_key)
    }

    /// Drops every compiled validator.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Fetches or compiles the validator for `schema_key`.
    fn compiled(&self, schema_key: &str, schema: &Value) -> Result<Arc<Validator>, SchemaError> {
        self.cache.get(schema_key, |_| compile_schema(schema))
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses schema text into a JSON tree.
///
/// # Errors
///
/// Returns [`SchemaError::Parse`] when the text is not JSON.
pub fn parse_schema(schema_text: &str) -> Result<Value, SchemaError> {
    serde_json::from_str(schema_text).map_err(|err| SchemaError::Parse(err.to_string()))
}

/// Parses caller input into an object document.
///
/// # Errors
///
/// Returns [`SchemaError::InputParse`] for undecodable strings and
/// [`SchemaError::InputShape`] for non-object input.
pub fn parse_input(input: &Value) -> Result<Map<String, Value>, SchemaError> {
    match input {
        Value::Object(map) => Ok(map.clone()),
        Value::String(text) => {
            let decoded: Value =
                serde_json::from_str(text).map_err(|err| SchemaError::InputParse(err.to_string()))?;
            match decoded {
                Value::Object(map) => Ok(map),
                _ => Err(SchemaError::InputShape),
            }
        }
        _ => Err(SchemaError::InputShape),
    }
}

/// Compiles a draft-07 validator.
fn compile_schema(schema: &Value) -> Result<Validator, SchemaError> {
    jsonschema::options()
        .with_draft(Draft::Draft7)
        .build(schema)
        .map_err(|err| SchemaError::Compile(err.to_string()))
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Fills defaults for missing required properties, recursively.
///
/// A property that is absent or `null` receives its `default` only when it is
/// listed in `required`. Present objects recurse with their own subschema's
/// required set; arrays recurse into each object element when `items`
/// declares properties, leaving other elements untouched.
pub fn apply_defaults(
    document: &mut Map<String, Value>,
    schema: SchemaNode<'_>,
    required: &BTreeSet<&str>,
) {
    for (name, property) in schema.property_nodes() {
        let missing = document.get(name).is_none_or(Value::is_null);
        if missing {
            if required.contains(name)
                && let Some(default) = property.default_value()
            {
                document.insert(name.to_string(), default.clone());
            }
            continue;
        }
        match document.get_mut(name) {
            Some(Value::Object(child)) if property.properties().is_some() => {
                apply_defaults(child, property, &property.required());
            }
            Some(Value::Array(elements)) => {
                let Some(items) = property.items().filter(|items| items.properties().is_some())
                else {
                    continue;
                };
                let item_required = items.required();
                for element in elements.iter_mut() {
                    if let Value::Object(child) = element {
                        apply_defaults(child, items, &item_required);
                    }
                }
            }
            _ => {}
        }
    }
}
