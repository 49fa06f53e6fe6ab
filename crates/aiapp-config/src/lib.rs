// crates/aiapp-config/src/lib.rs
// ============================================================================
// Module: AI App Config Library
// Description: Canonical config model and validation for aiapp.toml.
// Purpose: Single source of truth for runtime configuration semantics.
// Dependencies: aiapp-core, aiapp-handlers, aiapp-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `aiapp-config` defines the configuration model for the AI App runtime:
//! schema cache bounds, polling budgets, remote workflow endpoints, outbound
//! HTTP policy, worker sizing, record store backend, audit sink, and an
//! inline application catalog. Validation is strict and fails closed.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
