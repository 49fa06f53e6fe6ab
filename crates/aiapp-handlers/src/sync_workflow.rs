// crates/aiapp-handlers/src/sync_workflow.rs
// ============================================================================
// Module: Synchronous Workflow Handler
// Description: Runs a remote workflow and blocks until it settles.
// Purpose: Return the final workflow result to the caller directly.
// Dependencies: aiapp-core, crate::workflow
// ============================================================================

//! ## Overview
//! Submit, record `Running`, poll on the calling thread, settle the record,
//! and return the final poll result with `aiAppRecordId` and `executionTime`
//! added. A poll timeout is a normal result whose record is `Failed`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Instant;

use aiapp_core::AppHandler;
use aiapp_core::HandlerError;
use aiapp_core::PollError;
use aiapp_core::runtime::polling::elapsed_millis;
use serde_json::Map;
use serde_json::Value;

use crate::workflow::WorkflowRequest;
use crate::workflow::WorkflowServices;

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Registered name of the synchronous workflow handler.
pub const SYNC_WORKFLOW_HANDLER: &str = "sync_workflow";

/// Synchronous workflow handler.
pub struct SyncWorkflowHandler {
    /// Shared workflow collaborators.
    services: WorkflowServices,
}

impl SyncWorkflowHandler {
    /// Creates the handler.
    #[must_use]
    pub const fn new(services: WorkflowServices) -> Self {
        Self {
            services,
        }
    }
}

impl AppHandler for SyncWorkflowHandler {
    fn execute(&self, params: &Map<String, Value>) -> Result<Value, HandlerError> {
        let started = Instant::now();
        let request = WorkflowRequest::from_params(params)?;
        let submission = self.services.submit(SYNC_WORKFLOW_HANDLER, params, &request)?;
        let outcome = match self.services.poll(&submission, request.api_key) {
            Ok(outcome) => outcome,
            Err(PollError::Interrupted) => {
                return Err(HandlerError::Interrupted(PollError::Interrupted.to_string()));
            }
            Err(err @ PollError::Query(_)) => {
                self.services.fail(&submission.record_id, &err.to_string(), elapsed_millis(started))?;
                return Err(HandlerError::Remote(err.to_string()));
            }
        };
        let elapsed_ms = elapsed_millis(started);
        self.services.settle(&submission.record_id, &outcome, elapsed_ms)?;
        let mut result = match outcome.result {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        result.insert("aiAppRecordId".to_string(), Value::String(submission.record_id.to_string()));
        result.insert("executionTime".to_string(), Value::from(elapsed_ms));
        Ok(Value::Object(result))
    }
}
