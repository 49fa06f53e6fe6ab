// crates/aiapp-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Execution Record Store
// Description: Durable ExecutionRecordStore backend using SQLite WAL.
// Purpose: Persist execution records across process restarts.
// Dependencies: aiapp-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`ExecutionRecordStore`] that keeps
//! one row per handler invocation. Terminal transitions are conditional
//! updates, so a record settles exactly once even when several workers race.
//! Security posture: database contents are untrusted and decoded fail-closed.
//!
//! [`ExecutionRecordStore`]: aiapp_core::ExecutionRecordStore

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::MAX_PAYLOAD_BYTES;
pub use store::SqliteExecutionRecordStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
