// crates/aiapp-handlers/src/workflow.rs
// ============================================================================
// Module: Remote Workflow API
// Description: Workflow run/query client and shared workflow handler plumbing.
// Purpose: Submit remote workflows and settle their execution records.
// Dependencies: aiapp-core, crate::{client, params}, serde_json
// ============================================================================

//! ## Overview
//! [`WorkflowApiClient`] speaks the remote workflow API:
//! `POST {base}{run_path}` submits a workflow and returns a task id in the
//! response `data`; `GET {base}{result_path}` returns `data.status`
//! (`1` success, `2` failed, `3` running), `data.data`, and `message`.
//! Both responses are flattened into envelopes carrying `statusCode` and
//! `rawBody` next to the extracted fields.
//!
//! [`WorkflowServices`] bundles what the sync and async workflow handlers
//! share: submission with record creation and terminal record updates.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use aiapp_core::AuditEvent;
use aiapp_core::AuditSink;
use aiapp_core::ExecutionRecordStore;
use aiapp_core::HandlerError;
use aiapp_core::NewRecord;
use aiapp_core::PollError;
use aiapp_core::PollOutcome;
use aiapp_core::PollingCompletionEngine;
use aiapp_core::RecordId;
use aiapp_core::Redactor;
use aiapp_core::SharedExecutionRecordStore;
use aiapp_core::StoreError;
use aiapp_core::runtime::polling::is_success_status;
use aiapp_core::runtime::polling::is_terminal_status;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use crate::client::HttpClient;
use crate::client::HttpResponseData;
use crate::params::required_object;
use crate::params::required_str;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Placeholder replaced by the workflow or task identifier in API paths.
pub const ID_PLACEHOLDER: &str = "{id}";
/// Message used when a run response carries none.
pub const DEFAULT_RUN_MESSAGE: &str = "任务提交成功";
/// Message used when a query response carries none.
pub const DEFAULT_QUERY_MESSAGE: &str = "查询成功";
/// Failure message used when a terminal result carries none.
pub const DEFAULT_FAILURE_MESSAGE: &str = "任务执行失败";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Remote workflow API endpoint configuration.
///
/// # Invariants
/// - `run_path` and `result_path` contain [`ID_PLACEHOLDER`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorkflowApiConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Run endpoint path template.
    pub run_path: String,
    /// Task result endpoint path template.
    pub result_path: String,
    /// Optional `X-Client-Type` header value.
    pub client_type: Option<String>,
}

impl Default for WorkflowApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            run_path: "/workflow/run/{id}".to_string(),
            result_path: "/task/result/{id}".to_string(),
            client_type: None,
        }
    }
}

impl WorkflowApiConfig {
    /// Renders the run URL for `workflow_id`.
    #[must_use]
    pub fn run_url(&self, workflow_id: &str) -> String {
        self.render(&self.run_path, workflow_id)
    }

    /// Renders the task result URL for `task_id`.
    #[must_use]
    pub fn result_url(&self, task_id: &str) -> String {
        self.render(&self.result_path, task_id)
    }

    /// Joins the base URL with a path template.
    fn render(&self, template: &str, id: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), template.replace(ID_PLACEHOLDER, id))
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Accepted workflow submission.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReceipt {
    /// Remote task identifier, when the API returned one.
    pub task_id: Option<String>,
    /// Response message.
    pub message: String,
    /// Flattened response envelope.
    pub envelope: Value,
}

/// Client for the remote workflow API.
#[derive(Debug, Clone)]
pub struct WorkflowApiClient {
    /// Endpoint configuration.
    config: WorkflowApiConfig,
    /// Shared outbound client.
    http: HttpClient,
}

impl WorkflowApiClient {
    /// Creates a client.
    #[must_use]
    pub const fn new(config: WorkflowApiConfig, http: HttpClient) -> Self {
        Self {
            config,
            http,
        }
    }

    /// Returns the endpoint configuration.
    #[must_use]
    pub const fn config(&self) -> &WorkflowApiConfig {
        &self.config
    }

    /// Submits a workflow run.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] when the request cannot be sent or read.
    pub fn run_workflow(
        &self,
        workflow_id: &str,
        api_key: &str,
        params: &Map<String, Value>,
    ) -> Result<RunReceipt, HandlerError> {
        let body = serde_json::to_string(params)
            .map_err(|err| HandlerError::Internal(format!("workflow params encode: {err}")))?;
        let mut headers = self.headers(api_key);
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        let response = self.http.post(&self.config.run_url(workflow_id), &headers, Some(body))?;
        Ok(parse_run_response(&response))
    }

    /// Queries a task's status and result.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] when the request cannot be sent or read.
    pub fn query_task_result(&self, task_id: &str, api_key: &str) -> Result<Value, HandlerError> {
        let response =
            self.http.get(&self.config.result_url(task_id), &self.headers(api_key), &BTreeMap::new())?;
        Ok(parse_query_response(&response))
    }

    /// Builds the authentication headers.
    fn headers(&self, api_key: &str) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), api_key.to_string());
        if let Some(client_type) = &self.config.client_type {
            headers.insert("X-Client-Type".to_string(), client_type.clone());
        }
        headers
    }
}

/// Starts an envelope with the status code and raw body.
fn envelope(response: &HttpResponseData) -> Map<String, Value> {
    let mut envelope = Map::new();
    envelope.insert("statusCode".to_string(), Value::from(response.status_code));
    envelope.insert("rawBody".to_string(), Value::String(response.body.clone()));
    envelope
}

/// Renders a JSON scalar as text; strings are taken verbatim.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Flattens a run response.
fn parse_run_response(response: &HttpResponseData) -> RunReceipt {
    let mut envelope = envelope(response);
    let mut task_id = None;
    let mut message = None;
    if let Some(Value::Object(body)) = &response.body_object {
        task_id = body.get("data").filter(|value| !value.is_null()).map(scalar_text);
        let text = body
            .get("message")
            .filter(|value| !value.is_null())
            .map_or_else(|| DEFAULT_RUN_MESSAGE.to_string(), scalar_text);
        if let Some(task_id) = &task_id {
            envelope.insert("taskId".to_string(), Value::String(task_id.clone()));
        }
        envelope.insert("message".to_string(), Value::String(text.clone()));
        if let Some(success) = body.get("success") {
            envelope.insert("success".to_string(), success.clone());
        }
        message = Some(text);
    }
    RunReceipt {
        task_id: task_id.filter(|id| !id.trim().is_empty()),
        message: message.unwrap_or_else(|| format!("HTTP {}", response.status_code)),
        envelope: Value::Object(envelope),
    }
}

/// Flattens a task query response.
fn parse_query_response(response: &HttpResponseData) -> Value {
    let mut envelope = envelope(response);
    if let Some(Value::Object(body)) = &response.body_object {
        if let Some(Value::Object(data)) = body.get("data") {
            for key in ["taskId", "status", "data"] {
                envelope.insert(key.to_string(), data.get(key).cloned().unwrap_or(Value::Null));
            }
        }
        let message = body
            .get("message")
            .filter(|value| !value.is_null())
            .map_or_else(|| DEFAULT_QUERY_MESSAGE.to_string(), scalar_text);
        envelope.insert("message".to_string(), Value::String(message));
        if let Some(success) = body.get("success") {
            envelope.insert("success".to_string(), success.clone());
        }
    }
    Value::Object(envelope)
}

// ============================================================================
// SECTION: Workflow Requests
// ============================================================================

/// Validated workflow handler input.
#[derive(Debug, Clone, Copy)]
pub struct WorkflowRequest<'a> {
    /// Requesting user.
    pub user_id: &'a str,
    /// Application being executed.
    pub application_id: &'a str,
    /// Remote workflow identifier.
    pub workflow_id: &'a str,
    /// Remote API credential.
    pub api_key: &'a str,
    /// Workflow parameters.
    pub params: &'a Map<String, Value>,
}

impl<'a> WorkflowRequest<'a> {
    /// Extracts the workflow fields from handler input.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::InvalidInput`] when a field is missing or mistyped.
    pub fn from_params(input: &'a Map<String, Value>) -> Result<Self, HandlerError> {
        Ok(Self {
            user_id: required_str(input, "userId")?,
            application_id: required_str(input, "aiApplicationId")?,
            workflow_id: required_str(input, "workflowId")?,
            api_key: required_str(input, "apiKey")?,
            params: required_object(input, "params")?,
        })
    }
}

/// Submitted workflow with its execution record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Execution record in `Running` state.
    pub record_id: RecordId,
    /// Remote task identifier.
    pub task_id: String,
}

// ============================================================================
// SECTION: Shared Services
// ============================================================================

/// Collaborators shared by the workflow handlers.
#[derive(Clone)]
pub struct WorkflowServices {
    /// Remote workflow API client.
    pub client: Arc<WorkflowApiClient>,
    /// Execution record store.
    pub store: SharedExecutionRecordStore,
    /// Polling engine (owns the shutdown signal).
    pub engine: PollingCompletionEngine,
    /// Display snapshot redactor.
    pub redactor: Arc<dyn Redactor>,
    /// Audit sink.
    pub audit: Arc<dyn AuditSink>,
}

impl WorkflowServices {
    /// Runs the workflow and records the execution as `Running`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] when the run fails, no task id is returned,
    /// or the record cannot be created.
    pub fn submit(
        &self,
        handler: &str,
        input: &Map<String, Value>,
        request: &WorkflowRequest<'_>,
    ) -> Result<Submission, HandlerError> {
        let receipt = self.client.run_workflow(request.workflow_id, request.api_key, request.params)?;
        let Some(task_id) = receipt.task_id else {
            return Err(HandlerError::Rejected(format!(
                "工作流启动失败，未返回 taskId: {}",
                receipt.message
            )));
        };
        let snapshot = Value::Object(input.clone());
        let display = self.redactor.redact(&snapshot);
        let record_id = self.store.create_record(
            NewRecord::new(
                request.user_id,
                request.application_id,
                handler,
                snapshot,
                Some(task_id.clone()),
            )
            .with_display_input(display),
        )?;
        self.audit.record(
            &AuditEvent::new("record_created")
                .application(request.application_id)
                .handler(handler)
                .record(record_id.as_str())
                .task(task_id.as_str()),
        );
        Ok(Submission {
            record_id,
            task_id,
        })
    }

    /// Polls the submitted task until it settles.
    ///
    /// # Errors
    ///
    /// Returns [`PollError`] when shutdown interrupts polling or the final
    /// query fails.
    pub fn poll(&self, submission: &Submission, api_key: &str) -> Result<PollOutcome, PollError> {
        self.engine.poll(
            &submission.task_id,
            |task_id| self.client.query_task_result(task_id, api_key),
            is_terminal_status,
            is_success_status,
        )
    }

    /// Writes the terminal record state for a settled poll.
    ///
    /// Success stores the result's `data`; failure and timeout store the
    /// result's `message`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the record cannot be updated.
    pub fn settle(
        &self,
        record_id: &RecordId,
        outcome: &PollOutcome,
        elapsed_ms: u64,
    ) -> Result<(), StoreError> {
        if outcome.succeeded() {
            self.store.mark_succeeded(record_id, outcome.data(), elapsed_ms)?;
        } else {
            let message = outcome.message().unwrap_or(DEFAULT_FAILURE_MESSAGE);
            self.store.mark_failed(record_id, message, elapsed_ms)?;
        }
        self.audit.record(
            &AuditEvent::new("record_terminal")
                .record(record_id.as_str())
                .attempt(outcome.attempts)
                .outcome(if outcome.succeeded() { "succeeded" } else { "failed" })
                .elapsed(elapsed_ms),
        );
        Ok(())
    }

    /// Marks a record failed with `message`, logging the transition.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the record cannot be updated.
    pub fn fail(&self, record_id: &RecordId, message: &str, elapsed_ms: u64) -> Result<(), StoreError> {
        self.store.mark_failed(record_id, message, elapsed_ms)?;
        self.audit.record(
            &AuditEvent::new("record_terminal")
                .record(record_id.as_str())
                .outcome("failed")
                .elapsed(elapsed_ms)
                .message(message),
        );
        Ok(())
    }
}
