// crates/aiapp-core/src/core/mod.rs
// ============================================================================
// Module: AI App Core Types
// Description: Canonical application, schema, metadata, and record structures.
// Purpose: Provide stable, serializable types shared by the runtime and adapters.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Core types describe registered AI applications, the JSON Schema subset used
//! for their inputs, the UI-facing field metadata projection, and the
//! execution records persisted for every invocation. These types are the
//! canonical source of truth for any derived surface (CLI, HTTP, storage).

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod application;
pub mod hashing;
pub mod identifiers;
pub mod metadata;
pub mod record;
pub mod schema;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use application::AiApplication;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use identifiers::ApplicationId;
pub use identifiers::RecordId;
pub use identifiers::UserId;
pub use metadata::FieldMetadata;
pub use record::ExecutionRecord;
pub use record::NewRecord;
pub use record::RecordQuery;
pub use record::RecordStatus;
pub use schema::SchemaKind;
pub use schema::SchemaNode;
pub use time::unix_millis;
