// crates/aiapp-core/src/core/application.rs
// ============================================================================
// Module: AI Application Definitions
// Description: Registered application configuration consumed by the orchestrator.
// Purpose: Bind a parameter schema to a named execution handler.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! An [`AiApplication`] is a named, independently configured unit of work. Its
//! `param_schema` holds raw JSON Schema text (draft-07 subset) and `handler`
//! names the registered strategy that executes it. The core only reads these
//! definitions; authoring them is owned by the catalog backend.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::ApplicationId;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Registered AI application definition.
///
/// # Invariants
/// - `handler` names an entry in the handler registry at execution time.
/// - `param_schema` is JSON text; it is parsed on every execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiApplication {
    /// Application identifier.
    pub id: ApplicationId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Registered handler name.
    pub handler: String,
    /// Raw JSON Schema text describing input parameters.
    pub param_schema: String,
    /// Optional JSON Schema text describing the result payload.
    #[serde(default)]
    pub result_schema: Option<String>,
    /// Whether the application accepts executions.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Advisory execution timeout in milliseconds (0 means unset).
    #[serde(default)]
    pub timeout_ms: u64,
    /// Credits charged per execution.
    #[serde(default)]
    pub price: u64,
    /// Optional application version label.
    #[serde(default)]
    pub version: Option<String>,
    /// Free-form handler configuration.
    #[serde(default)]
    pub config: Option<Value>,
}

impl AiApplication {
    /// Creates an enabled application with the minimal required fields.
    #[must_use]
    pub fn new(
        id: impl Into<ApplicationId>,
        handler: impl Into<String>,
        param_schema: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            description: None,
            handler: handler.into(),
            param_schema: param_schema.into(),
            result_schema: None,
            enabled: true,
            timeout_ms: 0,
            price: 0,
            version: None,
            config: None,
        }
    }

    /// Returns the schema cache key for this application's parameter schema.
    #[must_use]
    pub fn schema_key(&self) -> String {
        match &self.version {
            Some(version) => format!("app:{}:{version}", self.id),
            None => format!("app:{}", self.id),
        }
    }
}

/// Returns the default enabled flag for applications.
const fn default_enabled() -> bool {
    true
}
