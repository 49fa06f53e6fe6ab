// crates/aiapp-core/src/runtime/orchestrator.rs
// ============================================================================
// Module: Execution Orchestrator
// Description: Validate, dispatch, and execute AI applications.
// Purpose: Provide the single entry point callers use to run an application.
// Dependencies: crate::{audit, core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! [`ExecutionOrchestrator::execute`] loads the application definition, fills
//! defaults and validates the caller's parameters, resolves the handler by
//! name, and returns whatever the handler returns. Validation and lookup
//! failures happen before dispatch, so they never reach a background worker.
//! Workflow handlers create and finalize their own execution records.
//!
//! The invoking user and application are added to the validated parameters
//! under `userId` and `aiApplicationId` unless the caller already set them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use thiserror::Error;

use crate::audit::AuditEvent;
use crate::audit::AuditSink;
use crate::core::ApplicationId;
use crate::core::UserId;
use crate::interfaces::ApplicationCatalog;
use crate::interfaces::CatalogError;
use crate::interfaces::HandlerError;
use crate::runtime::polling::elapsed_millis;
use crate::runtime::registry::HandlerRegistry;
use crate::runtime::registry::RegistryError;
use crate::runtime::validator::SchemaError;
use crate::runtime::validator::SchemaValidator;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Parameter key carrying the invoking user.
pub const USER_ID_PARAM: &str = "userId";
/// Parameter key carrying the executed application.
pub const APPLICATION_ID_PARAM: &str = "aiApplicationId";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Orchestrator errors surfaced to callers as a single message.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Application catalog lookup failed.
    #[error("{0}")]
    Catalog(#[from] CatalogError),
    /// No application exists with the identifier.
    #[error("application not found: {0}")]
    ApplicationNotFound(String),
    /// Application exists but is disabled.
    #[error("application disabled: {0}")]
    ApplicationDisabled(String),
    /// Schema or input parsing failed, or validation failed.
    #[error("{0}")]
    Schema(#[from] SchemaError),
    /// Handler name is empty or unregistered.
    #[error("{0}")]
    HandlerNotFound(#[from] RegistryError),
    /// Handler failed while executing.
    #[error("{source}")]
    Execution {
        /// Handler name.
        handler: String,
        /// Underlying handler failure.
        source: HandlerError,
    },
}

impl ExecutionError {
    /// Returns a stable label for audit events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Catalog(_) => "catalog",
            Self::ApplicationNotFound(_) => "application_not_found",
            Self::ApplicationDisabled(_) => "application_disabled",
            Self::Schema(SchemaError::Validation(_)) => "validation",
            Self::Schema(_) => "schema_parse",
            Self::HandlerNotFound(_) => "handler_not_found",
            Self::Execution {
                ..
            } => "execution",
        }
    }
}

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Façade running applications end to end.
#[derive(Clone)]
pub struct ExecutionOrchestrator {
    /// Application definitions.
    catalog: Arc<dyn ApplicationCatalog>,
    /// Defaulting validator with its compiled-schema cache.
    validator: Arc<SchemaValidator>,
    /// Registered handlers.
    registry: Arc<HandlerRegistry>,
    /// Audit sink for execution events.
    audit: Arc<dyn AuditSink>,
}

impl ExecutionOrchestrator {
    /// Creates an orchestrator from its collaborators.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn ApplicationCatalog>,
        validator: Arc<SchemaValidator>,
        registry: Arc<HandlerRegistry>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            catalog,
            validator,
            registry,
            audit,
        }
    }

    /// Returns the validator.
    #[must_use]
    pub fn validator(&self) -> &SchemaValidator {
        &self.validator
    }

    /// Returns the handler registry.
    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Executes an application on behalf of a user.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError`] when the application is unknown or
    /// disabled, the parameters fail validation, the handler is missing, or
    /// the handler fails.
    pub fn execute(
        &self,
        user_id: &UserId,
        application_id: &ApplicationId,
        raw_params: &Value,
    ) -> Result<Value, ExecutionError> {
        let started = Instant::now();
        let result = self.run(user_id, application_id, raw_params);
        let event = AuditEvent::new("execution_completed")
            .application(application_id.as_str())
            .elapsed(elapsed_millis(started));
        match &result {
            Ok(_) => self.audit.record(&event.outcome("ok")),
            Err(err) => self.audit.record(&event.outcome(err.kind()).message(err.to_string())),
        }
        result
    }

    /// Runs the execution pipeline.
    fn run(
        &self,
        user_id: &UserId,
        application_id: &ApplicationId,
        raw_params: &Value,
    ) -> Result<Value, ExecutionError> {
        let application = self
            .catalog
            .get_application(application_id)?
            .ok_or_else(|| ExecutionError::ApplicationNotFound(application_id.to_string()))?;
        if !application.enabled {
            return Err(ExecutionError::ApplicationDisabled(application_id.to_string()));
        }
        let mut params = self.validator.validate_and_apply_defaults(
            raw_params,
            &application.schema_key(),
            &application.param_schema,
        )?;
        let handler = self.registry.lookup(&application.handler)?;
        params
            .entry(USER_ID_PARAM)
            .or_insert_with(|| Value::String(user_id.to_string()));
        params
            .entry(APPLICATION_ID_PARAM)
            .or_insert_with(|| Value::String(application_id.to_string()));
        self.audit.record(
            &AuditEvent::new("execution_started")
                .application(application_id.as_str())
                .handler(application.handler.as_str()),
        );
        handler.execute(&params).map_err(|source| ExecutionError::Execution {
            handler: application.handler.clone(),
            source,
        })
    }
}
