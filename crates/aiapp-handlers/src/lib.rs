// crates/aiapp-handlers/src/lib.rs
// ============================================================================
// Module: AI App Handlers
// Description: Built-in execution handlers and their shared plumbing.
// Purpose: Provide HTTP passthrough and remote workflow handlers for AI apps.
// Dependencies: aiapp-core, reqwest, serde, serde_json, url
// ============================================================================

//! ## Overview
//! This crate ships the built-in execution handlers (plain and cached HTTP
//! passthrough, synchronous and asynchronous remote workflows, and a direct
//! workflow run/query action) plus the bounded worker pool that runs
//! asynchronous completions. [`BuiltinHandlers`] wires them into a
//! [`aiapp_core::HandlerRegistry`].
//! Invariants:
//! - Workflow handlers create exactly one execution record per accepted task.
//! - Every record created by a handler reaches a terminal state unless
//!   shutdown interrupts polling.
//!
//! Security posture: handler parameters are untrusted; outbound requests are
//! size-limited and credentials are redacted from record display snapshots.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod action;
pub mod async_workflow;
pub mod cached;
pub mod client;
pub mod http;
pub mod params;
pub mod pool;
pub mod registry;
pub mod sync_workflow;
pub mod workflow;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use action::WORKFLOW_ACTION_HANDLER;
pub use action::WorkflowActionHandler;
pub use async_workflow::ASYNC_WORKFLOW_HANDLER;
pub use async_workflow::AsyncWorkflowHandler;
pub use cached::CachedHttpHandler;
pub use cached::ResponseCacheConfig;
pub use client::HttpClient;
pub use client::HttpClientConfig;
pub use client::HttpResponseData;
pub use http::HttpHandler;
pub use http::HttpMethod;
pub use pool::Dispatch;
pub use pool::PoolError;
pub use pool::WorkerPool;
pub use pool::WorkerPoolConfig;
pub use registry::BuildError;
pub use registry::BuiltinHandlerConfigs;
pub use registry::BuiltinHandlers;
pub use registry::CACHED_HTTP_HANDLER;
pub use registry::HTTP_HANDLER;
pub use sync_workflow::SYNC_WORKFLOW_HANDLER;
pub use sync_workflow::SyncWorkflowHandler;
pub use workflow::WorkflowApiClient;
pub use workflow::WorkflowApiConfig;
pub use workflow::WorkflowServices;

#[cfg(test)]
mod tests;
