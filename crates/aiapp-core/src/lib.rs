// crates/aiapp-core/src/lib.rs
// ============================================================================
// Module: AI App Core Library
// Description: Public API surface for the AI application execution core.
// Purpose: Expose core types, interfaces, and runtime services.
// Dependencies: crate::{audit, core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! AI App core validates caller parameters against per-application JSON
//! Schemas, dispatches them to named execution handlers, and tracks remote
//! workflow tasks through a bounded polling loop while persisting one
//! execution record per invocation. Concrete handlers and durable stores live
//! in sibling crates and integrate through the traits in [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use audit::AuditEvent;
pub use audit::AuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use interfaces::AppHandler;
pub use interfaces::ApplicationCatalog;
pub use interfaces::CatalogError;
pub use interfaces::ExecutionRecordStore;
pub use interfaces::HandlerError;
pub use interfaces::StoreError;
pub use runtime::ConversionError;
pub use runtime::ExecutionError;
pub use runtime::ExecutionOrchestrator;
pub use runtime::HandlerRegistry;
pub use runtime::InMemoryApplicationCatalog;
pub use runtime::InMemoryExecutionRecordStore;
pub use runtime::KeyRedactor;
pub use runtime::PollError;
pub use runtime::PollOutcome;
pub use runtime::PollSettings;
pub use runtime::PollState;
pub use runtime::PollingCompletionEngine;
pub use runtime::Redactor;
pub use runtime::RegistryError;
pub use runtime::SchemaCache;
pub use runtime::SchemaCacheConfig;
pub use runtime::SchemaError;
pub use runtime::SchemaMetadataConverter;
pub use runtime::SchemaValidator;
pub use runtime::SharedExecutionRecordStore;
pub use runtime::ShutdownSignal;
