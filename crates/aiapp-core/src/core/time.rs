// crates/aiapp-core/src/core/time.rs
// ============================================================================
// Module: AI App Time Helpers
// Description: Wall-clock helpers for record and audit timestamps.
// Purpose: Keep timestamp derivation in one place.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Records and audit events carry unix epoch milliseconds. Clock skew before
//! the epoch collapses to zero instead of failing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the current unix epoch in milliseconds.
#[must_use]
pub fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
