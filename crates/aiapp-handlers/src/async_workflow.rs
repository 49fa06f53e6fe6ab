// crates/aiapp-handlers/src/async_workflow.rs
// ============================================================================
// Module: Asynchronous Workflow Handler
// Description: Runs a remote workflow and completes it on a worker thread.
// Purpose: Return a record id immediately while polling in the background.
// Dependencies: aiapp-core, crate::{pool, workflow}
// ============================================================================

//! ## Overview
//! Submit, record `Running`, hand polling to the [`WorkerPool`], and return
//! `{aiAppRecordId, taskId, status: 3, message}`. The worker owns the record
//! from then on: it settles it on success, failure, or timeout, and writes
//! `"后台执行异常: <err>"` when the final query fails. Once shutdown begins
//! no terminal status is written: neither the worker nor a submission that
//! loses the race with shutdown touches the `Running` record.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use aiapp_core::AppHandler;
use aiapp_core::AuditEvent;
use aiapp_core::HandlerError;
use aiapp_core::PollError;
use aiapp_core::RecordStatus;
use aiapp_core::runtime::polling::elapsed_millis;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::pool::PoolError;
use crate::pool::WorkerPool;
use crate::workflow::Submission;
use crate::workflow::WorkflowRequest;
use crate::workflow::WorkflowServices;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Registered name of the asynchronous workflow handler.
pub const ASYNC_WORKFLOW_HANDLER: &str = "async_workflow";
/// Message returned with the immediate response.
pub const SUBMITTED_MESSAGE: &str = "任务已提交，正在后台执行";
/// Prefix of failure messages written at the worker boundary.
pub const WORKER_FAILURE_PREFIX: &str = "后台执行异常: ";

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Asynchronous workflow handler.
pub struct AsyncWorkflowHandler {
    /// Shared workflow collaborators.
    services: WorkflowServices,
    /// Background pool owning the polling loops.
    pool: Arc<WorkerPool>,
}

impl AsyncWorkflowHandler {
    /// Creates the handler.
    #[must_use]
    pub const fn new(services: WorkflowServices, pool: Arc<WorkerPool>) -> Self {
        Self {
            services,
            pool,
        }
    }
}

impl AppHandler for AsyncWorkflowHandler {
    fn execute(&self, params: &Map<String, Value>) -> Result<Value, HandlerError> {
        let request = WorkflowRequest::from_params(params)?;
        if self.pool.shutdown_signal().is_triggered() {
            return Err(HandlerError::Interrupted(PoolError::ShutDown.to_string()));
        }
        let submission = self.services.submit(ASYNC_WORKFLOW_HANDLER, params, &request)?;
        let services = self.services.clone();
        let job_submission = submission.clone();
        let api_key = request.api_key.to_string();
        let dispatch = self
            .pool
            .submit(move || complete_in_background(&services, &job_submission, &api_key));
        match dispatch {
            Ok(_) => {}
            Err(PoolError::ShutDown) => {
                // No terminal write once shutdown has begun; the record stays RUNNING.
                self.services.audit.record(
                    &AuditEvent::new("async_worker_failed")
                        .handler(ASYNC_WORKFLOW_HANDLER)
                        .record(submission.record_id.as_str())
                        .task(submission.task_id.as_str())
                        .message(PoolError::ShutDown.to_string()),
                );
                return Err(HandlerError::Interrupted(PoolError::ShutDown.to_string()));
            }
            Err(err) => {
                let message = format!("{WORKER_FAILURE_PREFIX}{err}");
                self.services.fail(&submission.record_id, &message, 0)?;
                return Err(HandlerError::Interrupted(err.to_string()));
            }
        }
        self.services.audit.record(
            &AuditEvent::new("async_submitted")
                .application(request.application_id)
                .handler(ASYNC_WORKFLOW_HANDLER)
                .record(submission.record_id.as_str())
                .task(submission.task_id.as_str()),
        );
        Ok(json!({
            "aiAppRecordId": submission.record_id.as_str(),
            "taskId": submission.task_id,
            "status": RecordStatus::Running.code(),
            "message": SUBMITTED_MESSAGE,
        }))
    }
}

/// Worker body: polls the task and settles its record.
fn complete_in_background(services: &WorkflowServices, submission: &Submission, api_key: &str) {
    let started = Instant::now();
    let settled = match services.poll(submission, api_key) {
        Ok(outcome) => services.settle(&submission.record_id, &outcome, elapsed_millis(started)),
        Err(PollError::Interrupted) => {
            services.audit.record(
                &AuditEvent::new("async_worker_failed")
                    .record(submission.record_id.as_str())
                    .task(submission.task_id.as_str())
                    .message(PollError::Interrupted.to_string()),
            );
            return;
        }
        Err(err @ PollError::Query(_)) => services.fail(
            &submission.record_id,
            &format!("{WORKER_FAILURE_PREFIX}{err}"),
            elapsed_millis(started),
        ),
    };
    if let Err(err) = settled {
        services.audit.record(
            &AuditEvent::new("async_worker_failed")
                .record(submission.record_id.as_str())
                .message(err.to_string()),
        );
    }
}
