// crates/aiapp-core/src/interfaces/mod.rs
// ============================================================================
// Module: AI App Interfaces
// Description: Backend-agnostic interfaces for handlers, catalogs, and records.
// Purpose: Define the contract surfaces used by the execution runtime.
// Dependencies: crate::core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the runtime integrates with execution strategies and
//! persistence without embedding backend details. Every method takes `&self`;
//! implementations are shared across threads and guard their own state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::application::AiApplication;
use crate::core::identifiers::ApplicationId;
use crate::core::identifiers::RecordId;
use crate::core::record::ExecutionRecord;
use crate::core::record::NewRecord;
use crate::core::record::RecordQuery;

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Handler execution errors.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Handler parameters are missing or mistyped.
    #[error("invalid handler input: {0}")]
    InvalidInput(String),
    /// Remote call failed at the transport or protocol level.
    #[error("remote call failed: {0}")]
    Remote(String),
    /// Remote service answered but refused the request.
    #[error("remote request rejected: {0}")]
    Rejected(String),
    /// Execution record persistence failed.
    #[error("execution record error: {0}")]
    Store(#[from] StoreError),
    /// Execution was interrupted by shutdown.
    #[error("execution interrupted: {0}")]
    Interrupted(String),
    /// Internal handler failure.
    #[error("handler failure: {0}")]
    Internal(String),
}

/// Pluggable execution strategy bound to applications by name.
pub trait AppHandler: Send + Sync {
    /// Executes the handler with validated, defaulted parameters.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] when execution fails.
    fn execute(&self, params: &Map<String, Value>) -> Result<Value, HandlerError>;
}

// ============================================================================
// SECTION: Application Catalog
// ============================================================================

/// Application catalog errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog backend reported an error.
    #[error("application catalog error: {0}")]
    Backend(String),
}

/// Read-only source of application definitions.
pub trait ApplicationCatalog: Send + Sync {
    /// Loads an application by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the backend fails.
    fn get_application(&self, id: &ApplicationId) -> Result<Option<AiApplication>, CatalogError>;
}

// ============================================================================
// SECTION: Execution Record Store
// ============================================================================

/// Execution record store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("execution record store io error: {0}")]
    Io(String),
    /// Store reported an error.
    #[error("execution record store error: {0}")]
    Store(String),
    /// Record does not exist.
    #[error("execution record not found: {0}")]
    NotFound(String),
    /// Stored or supplied data is invalid.
    #[error("execution record store invalid data: {0}")]
    Invalid(String),
    /// Record already reached a terminal status.
    #[error("execution record already terminal: {0}")]
    Terminal(String),
}

/// Persistence for execution records.
///
/// Terminal transitions must fail with [`StoreError::Terminal`] when the
/// record is no longer running, so a record is finalized exactly once.
pub trait ExecutionRecordStore: Send + Sync {
    /// Creates a running record and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when persistence fails.
    fn create_record(&self, record: NewRecord) -> Result<RecordId, StoreError>;

    /// Marks a running record as succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the record is missing, terminal, or persistence fails.
    fn mark_succeeded(
        &self,
        id: &RecordId,
        output: Value,
        elapsed_ms: u64,
    ) -> Result<(), StoreError>;

    /// Marks a running record as failed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the record is missing, terminal, or persistence fails.
    fn mark_failed(&self, id: &RecordId, message: &str, elapsed_ms: u64) -> Result<(), StoreError>;

    /// Loads a record by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get_record(&self, id: &RecordId) -> Result<Option<ExecutionRecord>, StoreError>;

    /// Loads the record tracking a remote task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn find_by_remote_task(&self, task_id: &str) -> Result<Option<ExecutionRecord>, StoreError>;

    /// Lists records matching a query, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn list_records(&self, query: &RecordQuery) -> Result<Vec<ExecutionRecord>, StoreError>;
}
