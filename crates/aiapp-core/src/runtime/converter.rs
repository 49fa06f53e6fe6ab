// crates/aiapp-core/src/runtime/converter.rs
// ============================================================================
// Module: Schema Metadata Converter
// Description: Bidirectional mapping between schema text and field metadata.
// Purpose: Support form rendering and schema authoring without raw JSON.
// Dependencies: crate::core::{metadata, schema}, serde_json
// ============================================================================

//! ## Overview
//! [`SchemaMetadataConverter::schema_to_metadata`] projects top-level schema
//! properties into [`FieldMetadata`], recursing into nested object properties
//! and a single array `items` schema. [`SchemaMetadataConverter::metadata_to_schema`]
//! rebuilds an equivalent draft-07 object schema. The round trip preserves
//! property names, the required sets, single and union types, `enum` members
//! of any JSON type, and constraints. Nested `properties` and `items` are
//! followed whether or not the node declares a `type`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::core::metadata::FieldMetadata;
use crate::core::schema::SchemaKind;
use crate::core::schema::SchemaNode;
use crate::runtime::validator::parse_schema;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `$schema` URI emitted for generated schemas.
pub const DRAFT7_SCHEMA_URI: &str = "http://json-schema.org/draft-07/schema#";
/// Name given to array item metadata.
pub const ARRAY_ITEM_NAME: &str = "item";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Metadata conversion errors.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Schema text could not be parsed.
    #[error("无法解析 Schema 以提取元数据: {0}")]
    Parse(String),
    /// Generated schema could not be serialized.
    #[error("无法序列化元数据到 Schema: {0}")]
    Serialize(String),
}

// ============================================================================
// SECTION: Converter
// ============================================================================

/// Converts between schema text and field metadata trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaMetadataConverter;

impl SchemaMetadataConverter {
    /// Creates a converter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Projects the schema's top-level properties into metadata.
    ///
    /// Returns an empty list when the schema has no `properties`.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Parse`] when the schema text is not JSON.
    pub fn schema_to_metadata(
        &self,
        schema_text: &str,
    ) -> Result<Vec<FieldMetadata>, ConversionError> {
        let schema =
            parse_schema(schema_text).map_err(|err| ConversionError::Parse(err.to_string()))?;
        Ok(self.node_to_fields(SchemaNode::new(&schema)))
    }

    /// Projects a parsed schema node's properties into metadata.
    #[must_use]
    pub fn node_to_fields(&self, node: SchemaNode<'_>) -> Vec<FieldMetadata> {
        let required = node.required();
        node.property_nodes()
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, property)| field_from_node(name, property, required.contains(name)))
            .collect()
    }

    /// Builds pretty-printed draft-07 schema text from metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Serialize`] when serialization fails.
    pub fn metadata_to_schema(&self, fields: &[FieldMetadata]) -> Result<String, ConversionError> {
        serde_json::to_string_pretty(&self.metadata_to_schema_value(fields))
            .map_err(|err| ConversionError::Serialize(err.to_string()))
    }

    /// Builds the draft-07 schema document from metadata.
    #[must_use]
    pub fn metadata_to_schema_value(&self, fields: &[FieldMetadata]) -> Value {
        let (properties, required) = properties_from_fields(fields);
        let mut schema = Map::new();
        schema.insert("$schema".to_string(), json!(DRAFT7_SCHEMA_URI));
        schema.insert("type".to_string(), json!(SchemaKind::Object.as_str()));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), json!(required));
        }
        Value::Object(schema)
    }
}

// ============================================================================
// SECTION: Schema To Metadata
// ============================================================================

/// Projects one property node.
fn field_from_node(name: &str, node: SchemaNode<'_>, required: bool) -> FieldMetadata {
    let type_options: Vec<String> = node.type_union().into_iter().map(str::to_string).collect();
    let field_type = node
        .type_name()
        .or_else(|| type_options.iter().map(String::as_str).find(|member| *member != "null"))
        .map(str::to_string);
    let mut field = FieldMetadata {
        name: name.to_string(),
        field_type,
        type_options,
        description: node.description().map(str::to_string),
        default_value: node.default_value().cloned(),
        required,
        min_length: node.u64_keyword("minLength"),
        max_length: node.u64_keyword("maxLength"),
        pattern: node.str_keyword("pattern").map(str::to_string),
        format: node.str_keyword("format").map(str::to_string),
        minimum: node.f64_keyword("minimum"),
        maximum: node.f64_keyword("maximum"),
        exclusive_minimum: node.f64_keyword("exclusiveMinimum"),
        exclusive_maximum: node.f64_keyword("exclusiveMaximum"),
        multiple_of: node.f64_keyword("multipleOf"),
        enum_values: node.enum_values(),
        min_items: node.u64_keyword("minItems"),
        max_items: node.u64_keyword("maxItems"),
        unique_items: node.bool_keyword("uniqueItems"),
        children: Vec::new(),
        array_item_schema: None,
    };
    if node.properties().is_some() {
        let child_required = node.required();
        field.children = node
            .property_nodes()
            .filter(|(child, _)| !child.is_empty())
            .map(|(child, property)| {
                field_from_node(child, property, child_required.contains(child))
            })
            .collect();
    }
    field.array_item_schema =
        node.items().map(|items| Box::new(field_from_node(ARRAY_ITEM_NAME, items, false)));
    field
}

// ============================================================================
// SECTION: Metadata To Schema
// ============================================================================

/// Builds a `properties` map and `required` list, skipping unnamed fields.
fn properties_from_fields(fields: &[FieldMetadata]) -> (Map<String, Value>, Vec<String>) {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in fields {
        if field.name.trim().is_empty() {
            continue;
        }
        if field.required {
            required.push(field.name.clone());
        }
        properties.insert(field.name.clone(), property_node(field));
    }
    (properties, required)
}

/// Builds one property schema node.
fn property_node(field: &FieldMetadata) -> Value {
    let mut node = Map::new();
    if field.type_options.is_empty() {
        insert_opt(&mut node, "type", field.field_type.as_ref().map(|value| json!(value)));
    } else {
        node.insert("type".to_string(), json!(field.type_options));
    }
    insert_opt(&mut node, "description", field.description.as_ref().map(|value| json!(value)));
    insert_opt(&mut node, "default", field.default_value.clone());
    insert_opt(&mut node, "minLength", field.min_length.map(|value| json!(value)));
    insert_opt(&mut node, "maxLength", field.max_length.map(|value| json!(value)));
    insert_opt(&mut node, "pattern", field.pattern.as_ref().map(|value| json!(value)));
    insert_opt(&mut node, "format", field.format.as_ref().map(|value| json!(value)));
    insert_opt(&mut node, "minimum", field.minimum.map(|value| json!(value)));
    insert_opt(&mut node, "maximum", field.maximum.map(|value| json!(value)));
    insert_opt(&mut node, "exclusiveMinimum", field.exclusive_minimum.map(|value| json!(value)));
    insert_opt(&mut node, "exclusiveMaximum", field.exclusive_maximum.map(|value| json!(value)));
    insert_opt(&mut node, "multipleOf", field.multiple_of.map(|value| json!(value)));
    if !field.enum_values.is_empty() {
        node.insert("enum".to_string(), json!(field.enum_values));
    }
    insert_opt(&mut node, "minItems", field.min_items.map(|value| json!(value)));
    insert_opt(&mut node, "maxItems", field.max_items.map(|value| json!(value)));
    insert_opt(&mut node, "uniqueItems", field.unique_items.map(|value| json!(value)));
    if !field.children.is_empty() {
        let (properties, required) = properties_from_fields(&field.children);
        node.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            node.insert("required".to_string(), json!(required));
        }
    }
    if let Some(item) = &field.array_item_schema {
        node.insert("items".to_string(), property_node(item));
    }
    Value::Object(node)
}

/// Inserts `value` under `key` when present.
fn insert_opt(node: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        node.insert(key.to_string(), value);
    }
}
