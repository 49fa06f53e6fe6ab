// crates/aiapp-core/src/core/metadata.rs
// ============================================================================
// Module: Field Metadata
// Description: UI-oriented projection of schema properties.
// Purpose: Let form builders render and author schemas without raw JSON.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! [`FieldMetadata`] flattens one schema property into explicit fields, with
//! nested object properties in `children` and an array's item schema in
//! `array_item_schema`. It serializes in camelCase for form clients.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Metadata describing one schema property.
///
/// # Invariants
/// - `children` mirrors the node's nested `properties`, whatever its `type`.
/// - `array_item_schema` mirrors the node's `items` schema and is named `item`.
/// - A non-empty `type_options` is emitted instead of `field_type`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMetadata {
    /// Property name.
    #[serde(default)]
    pub name: String,
    /// Raw `type` keyword.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    /// Member types of a union `type` array, in schema order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_options: Vec<String>,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Whether the parent lists this property as required.
    #[serde(default)]
    pub required: bool,
    /// Minimum string length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    /// Maximum string length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// Regular expression the string must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Named string format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Inclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Inclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Exclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<f64>,
    /// Exclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<f64>,
    /// Required divisor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
    /// Allowed values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    /// Minimum array length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    /// Maximum array length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    /// Whether array items must be distinct.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
    /// Nested object properties.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Self>,
    /// Array item schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_item_schema: Option<Box<Self>>,
}

impl FieldMetadata {
    /// Creates metadata with a name and type.
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: Some(field_type.into()),
            ..Self::default()
        }
    }

    /// Marks the field as required.
    #[must_use]
    pub const fn mark_required(mut self) -> Self {
        self.required = true;
        self
    }
}
