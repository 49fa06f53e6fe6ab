// crates/aiapp-core/src/runtime/mod.rs
// ============================================================================
// Module: AI App Runtime
// Description: Schema validation, handler dispatch, polling, and record stores.
// Purpose: Execute AI applications against registered handlers.
// Dependencies: crate::{audit, core, interfaces}, jsonschema
// ============================================================================

//! ## Overview
//! Runtime modules implement the execution core: a single-flight schema cache,
//! the defaulting validator and its friendly messages, metadata conversion,
//! the handler registry, the remote task polling engine, in-memory stores,
//! and the orchestrator façade that ties them together.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod cache;
pub mod catalog;
pub mod converter;
pub mod messages;
pub mod orchestrator;
pub mod polling;
pub mod redaction;
pub mod registry;
pub mod store;
pub mod validator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cache::SchemaCache;
pub use cache::SchemaCacheConfig;
pub use catalog::InMemoryApplicationCatalog;
pub use converter::ConversionError;
pub use converter::SchemaMetadataConverter;
pub use orchestrator::ExecutionError;
pub use orchestrator::ExecutionOrchestrator;
pub use polling::PollError;
pub use polling::PollOutcome;
pub use polling::PollSettings;
pub use polling::PollState;
pub use polling::PollingCompletionEngine;
pub use polling::ShutdownSignal;
pub use redaction::KeyRedactor;
pub use redaction::Redactor;
pub use registry::HandlerRegistry;
pub use registry::RegistryError;
pub use store::InMemoryExecutionRecordStore;
pub use store::SharedExecutionRecordStore;
pub use validator::SchemaError;
pub use validator::SchemaValidator;
