// crates/aiapp-handlers/src/action.rs
// ============================================================================
// Module: Workflow Action Handler
// Description: Direct access to the workflow run and query endpoints.
// Purpose: Let applications submit or inspect workflows without records.
// Dependencies: aiapp-core, crate::{params, workflow}
// ============================================================================

//! ## Overview
//! Input `action` selects the call: `run` needs `workflowId` and `params`,
//! `query` needs `taskId`; both need `apiKey`. The flattened response
//! envelope is returned as-is and no execution record is written.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use aiapp_core::AppHandler;
use aiapp_core::HandlerError;
use serde_json::Map;
use serde_json::Value;

use crate::params::required_object;
use crate::params::required_str;
use crate::workflow::WorkflowApiClient;

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Registered name of the workflow action handler.
pub const WORKFLOW_ACTION_HANDLER: &str = "workflow_action";

/// Workflow run/query passthrough handler.
pub struct WorkflowActionHandler {
    /// Remote workflow API client.
    client: Arc<WorkflowApiClient>,
}

impl WorkflowActionHandler {
    /// Creates the handler.
    #[must_use]
    pub const fn new(client: Arc<WorkflowApiClient>) -> Self {
        Self {
            client,
        }
    }
}

impl AppHandler for WorkflowActionHandler {
    fn execute(&self, params: &Map<String, Value>) -> Result<Value, HandlerError> {
        let action = required_str(params, "action")?;
        let api_key = required_str(params, "apiKey")?;
        if action.eq_ignore_ascii_case("run") {
            let workflow_id = required_str(params, "workflowId")?;
            let workflow_params = required_object(params, "params")?;
            Ok(self.client.run_workflow(workflow_id, api_key, workflow_params)?.envelope)
        } else if action.eq_ignore_ascii_case("query") {
            let task_id = required_str(params, "taskId")?;
            self.client.query_task_result(task_id, api_key)
        } else {
            Err(HandlerError::InvalidInput("action 参数必须是 'run' 或 'query'".to_string()))
        }
    }
}
