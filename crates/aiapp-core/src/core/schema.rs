// crates/aiapp-core/src/core/schema.rs
// ============================================================================
// Module: Schema Document View
// Description: Typed read-only view over the supported JSON Schema subset.
// Purpose: Give defaulting, labeling, and metadata conversion one keyword reader.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! [`SchemaNode`] borrows a parsed schema tree and exposes the keywords the
//! runtime understands: `type`, `properties`, `required`, `default`, `items`,
//! string/number/array constraints, `enum`, and `description`. Anything else
//! is ignored. Property order follows the schema text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Kinds
// ============================================================================

/// Node kinds supported by the schema subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    /// JSON object.
    Object,
    /// JSON array.
    Array,
    /// JSON string.
    String,
    /// Any JSON number.
    Number,
    /// Integral JSON number.
    Integer,
    /// JSON boolean.
    Boolean,
}

impl SchemaKind {
    /// Parses a `type` keyword value.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            _ => None,
        }
    }

    /// Returns the `type` keyword value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }
}

// ============================================================================
// SECTION: Node View
// ============================================================================

/// Borrowed view of one schema node.
///
/// # Invariants
/// - Accessors never fail; missing or mistyped keywords read as absent.
#[derive(Debug, Clone, Copy)]
pub struct SchemaNode<'a> {
    /// Raw schema value backing this node.
    raw: &'a Value,
}

impl<'a> SchemaNode<'a> {
    /// Wraps a parsed schema value.
    #[must_use]
    pub const fn new(raw: &'a Value) -> Self {
        Self {
            raw,
        }
    }

    /// Returns the raw schema value.
    #[must_use]
    pub const fn raw(&self) -> &'a Value {
        self.raw
    }

    /// Returns the raw `type` keyword when it is a string.
    #[must_use]
    pub fn type_name(&self) -> Option<&'a str> {
        self.str_keyword("type")
    }

    /// Returns the string members of a union `type` array.
    #[must_use]
    pub fn type_union(&self) -> Vec<&'a str> {
        self.raw
            .get("type")
            .and_then(Value::as_array)
            .map(|types| types.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns the parsed node kind.
    #[must_use]
    pub fn kind(&self) -> Option<SchemaKind> {
        self.type_name().and_then(SchemaKind::parse)
    }

    /// Returns the `description` keyword.
    #[must_use]
    pub fn description(&self) -> Option<&'a str> {
        self.str_keyword("description")
    }

    /// Returns the `default` keyword.
    #[must_use]
    pub fn default_value(&self) -> Option<&'a Value> {
        self.raw.get("default")
    }

    /// Returns the `properties` map when present.
    #[must_use]
    pub fn properties(&self) -> Option<&'a Map<String, Value>> {
        self.raw.get("properties").and_then(Value::as_object)
    }

    /// Returns the subschema for one property.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<SchemaNode<'a>> {
        self.properties().and_then(|props| props.get(name)).map(SchemaNode::new)
    }

    /// Iterates properties in schema order.
    pub fn property_nodes(&self) -> impl Iterator<Item = (&'a str, SchemaNode<'a>)> + use<'a> {
        self.properties().into_iter().flat_map(|props| {
            props.iter().map(|(name, node)| (name.as_str(), SchemaNode::new(node)))
        })
    }

    /// Returns the `required` name set.
    #[must_use]
    pub fn required(&self) -> BTreeSet<&'a str> {
        self.raw
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Returns the single `items` subschema when it is an object.
    #[must_use]
    pub fn items(&self) -> Option<SchemaNode<'a>> {
        self.raw.get("items").filter(|items| items.is_object()).map(SchemaNode::new)
    }

    /// Returns the `enum` keyword's members in order.
    #[must_use]
    pub fn enum_values(&self) -> Vec<Value> {
        self.raw.get("enum").and_then(Value::as_array).cloned().unwrap_or_default()
    }

    /// Reads a non-negative integer keyword.
    #[must_use]
    pub fn u64_keyword(&self, key: &str) -> Option<u64> {
        self.raw.get(key).and_then(Value::as_u64)
    }

    /// Reads a numeric keyword.
    #[must_use]
    pub fn f64_keyword(&self, key: &str) -> Option<f64> {
        self.raw.get(key).and_then(Value::as_f64)
    }

    /// Reads a string keyword.
    #[must_use]
    pub fn str_keyword(&self, key: &str) -> Option<&'a str> {
        self.raw.get(key).and_then(Value::as_str)
    }

    /// Reads a boolean keyword.
    #[must_use]
    pub fn bool_keyword(&self, key: &str) -> Option<bool> {
        self.raw.get(key).and_then(Value::as_bool)
    }
}
