// crates/aiapp-handlers/src/registry.rs
// ============================================================================
// Module: Built-in Handler Registry
// Description: Assembles the built-in handlers into a handler registry.
// Purpose: Wire shared clients, stores, and pools once at startup.
// Dependencies: aiapp-core, crate::*
// ============================================================================

//! ## Overview
//! [`BuiltinHandlers::build`] constructs one shared HTTP client, one
//! workflow client, one polling engine, and one worker pool, then registers
//! every built-in handler under its stable name. The returned
//! [`BuiltinHandlers`] keeps the pool so the caller can shut it down.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use aiapp_core::AuditSink;
use aiapp_core::HandlerRegistry;
use aiapp_core::KeyRedactor;
use aiapp_core::PollSettings;
use aiapp_core::PollingCompletionEngine;
use aiapp_core::Redactor;
use aiapp_core::RegistryError;
use aiapp_core::SharedExecutionRecordStore;
use aiapp_core::ShutdownSignal;
use thiserror::Error;

use crate::action::WORKFLOW_ACTION_HANDLER;
use crate::action::WorkflowActionHandler;
use crate::async_workflow::ASYNC_WORKFLOW_HANDLER;
use crate::async_workflow::AsyncWorkflowHandler;
use crate::cached::CachedHttpHandler;
use crate::cached::ResponseCacheConfig;
use crate::client::HttpClient;
use crate::client::HttpClientConfig;
use crate::http::HttpHandler;
use crate::pool::PoolError;
use crate::pool::WorkerPool;
use crate::pool::WorkerPoolConfig;
use crate::sync_workflow::SYNC_WORKFLOW_HANDLER;
use crate::sync_workflow::SyncWorkflowHandler;
use crate::workflow::WorkflowApiClient;
use crate::workflow::WorkflowApiConfig;
use crate::workflow::WorkflowServices;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Registered name of the HTTP passthrough handler.
pub const HTTP_HANDLER: &str = "http_request";
/// Registered name of the cached HTTP passthrough handler.
pub const CACHED_HTTP_HANDLER: &str = "http_cached";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration bundle for built-in handlers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuiltinHandlerConfigs {
    /// Generic HTTP handler client settings.
    pub http: HttpClientConfig,
    /// Response cache bounds for the cached HTTP handler.
    pub http_cache: ResponseCacheConfig,
    /// Workflow API endpoints.
    pub workflow: WorkflowApiConfig,
    /// Client settings for workflow API calls.
    pub workflow_http: HttpClientConfig,
    /// Polling budget for workflow handlers.
    pub polling: PollSettings,
    /// Background worker sizing.
    pub workers: WorkerPoolConfig,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Built-in registry assembly errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A client could not be constructed.
    #[error("handler setup failed: {0}")]
    Setup(String),
    /// The worker pool could not start.
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// Registration failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

// ============================================================================
// SECTION: Assembly
// ============================================================================

/// Built-in handler registry plus the resources it owns.
pub struct BuiltinHandlers {
    /// Registry with every built-in handler.
    pub registry: HandlerRegistry,
    /// Worker pool backing the asynchronous workflow handler.
    pub pool: Arc<WorkerPool>,
    /// Shutdown signal shared by pool and pollers.
    pub shutdown: ShutdownSignal,
}

impl BuiltinHandlers {
    /// Builds the built-in handlers.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] when a client, the pool, or a registration fails.
    pub fn build(
        configs: &BuiltinHandlerConfigs,
        store: SharedExecutionRecordStore,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self, BuildError> {
        Self::build_with_redactor(configs, store, Arc::new(KeyRedactor::default()), audit)
    }

    /// Builds the built-in handlers with a custom display redactor.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] when a client, the pool, or a registration fails.
    pub fn build_with_redactor(
        configs: &BuiltinHandlerConfigs,
        store: SharedExecutionRecordStore,
        redactor: Arc<dyn Redactor>,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self, BuildError> {
        let shutdown = ShutdownSignal::new();
        let http = HttpClient::new(configs.http.clone())
            .map_err(|err| BuildError::Setup(err.to_string()))?;
        let workflow_http = HttpClient::new(configs.workflow_http.clone())
            .map_err(|err| BuildError::Setup(err.to_string()))?;
        let workflow_client =
            Arc::new(WorkflowApiClient::new(configs.workflow.clone(), workflow_http));
        let engine =
            PollingCompletionEngine::new(configs.polling, shutdown.clone(), Arc::clone(&audit));
        let pool = Arc::new(WorkerPool::new(configs.workers, shutdown.clone(), Arc::clone(&audit))?);
        let services = WorkflowServices {
            client: Arc::clone(&workflow_client),
            store,
            engine,
            redactor,
            audit: Arc::clone(&audit),
        };

        let mut registry = HandlerRegistry::new();
        registry.register(HTTP_HANDLER, HttpHandler::new(http.clone()))?;
        registry.register(
            CACHED_HTTP_HANDLER,
            CachedHttpHandler::new(http, configs.http_cache, Arc::clone(&audit)),
        )?;
        registry.register(SYNC_WORKFLOW_HANDLER, SyncWorkflowHandler::new(services.clone()))?;
        registry.register(
            ASYNC_WORKFLOW_HANDLER,
            AsyncWorkflowHandler::new(services, Arc::clone(&pool)),
        )?;
        registry.register(WORKFLOW_ACTION_HANDLER, WorkflowActionHandler::new(workflow_client))?;
        Ok(Self {
            registry,
            pool,
            shutdown,
        })
    }

    /// Stops background work and joins the workers.
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }
}
