// crates/aiapp-core/src/core/record.rs
// ============================================================================
// Module: Execution Records
// Description: Lifecycle record persisted for each handler invocation.
// Purpose: Capture status, input/output snapshots, timing, and failure detail.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! An [`ExecutionRecord`] is created once in [`RecordStatus::Running`] when a
//! workflow handler dispatches remote work, and transitions exactly once to a
//! terminal status. Status codes mirror the remote workflow API: `1` success,
//! `2` failure, `3` running.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::ApplicationId;
use crate::core::identifiers::RecordId;
use crate::core::identifiers::UserId;

// ============================================================================
// SECTION: Status
// ============================================================================

/// Lifecycle status of an execution record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Remote work is in flight.
    Running,
    /// Execution finished successfully.
    Succeeded,
    /// Execution failed or timed out.
    Failed,
}

impl RecordStatus {
    /// Returns the numeric status code used by the remote workflow API.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Succeeded => 1,
            Self::Failed => 2,
            Self::Running => 3,
        }
    }

    /// Parses a numeric status code.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Succeeded),
            2 => Some(Self::Failed),
            3 => Some(Self::Running),
            _ => None,
        }
    }

    /// Returns true for statuses after which no transition is allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Returns the stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

// ============================================================================
// SECTION: Records
// ============================================================================

/// Persisted lifecycle row for one handler invocation.
///
/// # Invariants
/// - `status` moves from `Running` to a terminal status at most once.
/// - `output` is set only when `status` is `Succeeded`.
/// - `error_message` is set only when `status` is `Failed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Record identifier.
    pub id: RecordId,
    /// Invoking user.
    pub user_id: UserId,
    /// Executed application.
    pub application_id: ApplicationId,
    /// Handler that produced the record.
    pub handler: String,
    /// Lifecycle status.
    pub status: RecordStatus,
    /// Validated input parameters.
    pub input: Value,
    /// Redaction-safe copy of the input parameters.
    pub display_input: Value,
    /// Result payload on success.
    pub output: Option<Value>,
    /// Failure message on failure.
    pub error_message: Option<String>,
    /// Remote task identifier when the work runs remotely.
    pub remote_task_id: Option<String>,
    /// Credits charged for the invocation.
    pub credit_cost: u64,
    /// Elapsed execution time in milliseconds once terminal.
    pub execution_time_ms: Option<u64>,
    /// Creation time (unix millis).
    pub created_at_ms: i64,
    /// Last update time (unix millis).
    pub updated_at_ms: i64,
}

impl ExecutionRecord {
    /// Builds a running record from a creation request.
    #[must_use]
    pub fn running(id: RecordId, request: NewRecord, now_ms: i64) -> Self {
        Self {
            id,
            user_id: request.user_id,
            application_id: request.application_id,
            handler: request.handler,
            status: RecordStatus::Running,
            input: request.input,
            display_input: request.display_input,
            output: None,
            error_message: None,
            remote_task_id: request.remote_task_id,
            credit_cost: request.credit_cost,
            execution_time_ms: None,
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
        }
    }

    /// Returns true when the record reached a terminal status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Request to create a running execution record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    /// Invoking user.
    pub user_id: UserId,
    /// Executed application.
    pub application_id: ApplicationId,
    /// Handler creating the record.
    pub handler: String,
    /// Validated input parameters.
    pub input: Value,
    /// Redaction-safe input copy (defaults to `input`).
    pub display_input: Value,
    /// Remote task identifier.
    pub remote_task_id: Option<String>,
    /// Credits charged for the invocation.
    pub credit_cost: u64,
}

impl NewRecord {
    /// Creates a request whose display snapshot equals the input.
    #[must_use]
    pub fn new(
        user_id: impl Into<UserId>,
        application_id: impl Into<ApplicationId>,
        handler: impl Into<String>,
        input: Value,
        remote_task_id: Option<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            application_id: application_id.into(),
            handler: handler.into(),
            display_input: input.clone(),
            input,
            remote_task_id,
            credit_cost: 0,
        }
    }

    /// Replaces the display snapshot.
    #[must_use]
    pub fn with_display_input(mut self, display_input: Value) -> Self {
        self.display_input = display_input;
        self
    }

    /// Sets the credit cost.
    #[must_use]
    pub const fn with_credit_cost(mut self, credit_cost: u64) -> Self {
        self.credit_cost = credit_cost;
        self
    }
}

// ============================================================================
// SECTION: Queries
// ============================================================================

/// Filter for listing execution records, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    /// Restrict to one user.
    pub user_id: Option<UserId>,
    /// Restrict to one application.
    pub application_id: Option<ApplicationId>,
    /// Restrict to one status.
    pub status: Option<RecordStatus>,
    /// Maximum number of records returned.
    pub limit: Option<usize>,
}

impl RecordQuery {
    /// Returns true when the record satisfies every set filter.
    #[must_use]
    pub fn matches(&self, record: &ExecutionRecord) -> bool {
        self.user_id.as_ref().is_none_or(|user| *user == record.user_id)
            && self.application_id.as_ref().is_none_or(|app| *app == record.application_id)
            && self.status.is_none_or(|status| status == record.status)
    }
}
