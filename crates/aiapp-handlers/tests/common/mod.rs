// crates/aiapp-handlers/tests/common/mod.rs
// ============================================================================
// Module: AI App Handlers Test Helpers
// Description: Local mock HTTP servers, audit sinks, and handler wiring.
// Purpose: Exercise handlers against scripted remote APIs without network access.
// Dependencies: aiapp-core, aiapp-handlers, tiny_http
// ============================================================================

//! ## Overview
//! [`MockServer`] serves scripted responses on a loopback port and records
//! every request it receives. [`workflow_server`] scripts the remote
//! workflow API: runs return a fixed task id and task queries walk through a
//! status sequence, repeating the last entry.

#![allow(dead_code, reason = "Helpers are shared across test crates that use subsets.")]
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only helpers use panic-based assertions."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use aiapp_core::AuditEvent;
use aiapp_core::AuditSink;
use aiapp_core::ExecutionRecord;
use aiapp_core::ExecutionRecordStore;
use aiapp_core::InMemoryExecutionRecordStore;
use aiapp_core::PollSettings;
use aiapp_core::RecordId;
use aiapp_core::SharedExecutionRecordStore;
use aiapp_handlers::BuiltinHandlerConfigs;
use aiapp_handlers::BuiltinHandlers;
use aiapp_handlers::WorkerPoolConfig;
use aiapp_handlers::WorkflowApiConfig;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink that keeps every event in memory.
#[derive(Default, Clone)]
pub struct MemoryAuditSink {
    /// Recorded events.
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl MemoryAuditSink {
    /// Returns the recorded event labels in order.
    pub fn labels(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|event| event.event).collect()
    }

    /// Returns the recorded events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &AuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// SECTION: Mock Server
// ============================================================================

/// Request captured by a [`MockServer`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: String,
    /// Request target including the query string.
    pub url: String,
    /// Headers keyed by lowercase name.
    pub headers: BTreeMap<String, String>,
    /// Request body.
    pub body: String,
}

impl RecordedRequest {
    /// Returns the path without the query string.
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or_default()
    }

    /// Returns a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Scripted response returned by a [`MockServer`].
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl MockResponse {
    /// JSON response with status 200.
    pub fn json(body: &Value) -> Self {
        Self::with_status(200, body)
    }

    /// JSON response with an explicit status.
    pub fn with_status(status: u16, body: &Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

/// Responder invoked for every request.
type Responder = Box<dyn Fn(&RecordedRequest) -> MockResponse + Send>;

/// Loopback HTTP server with scripted responses.
pub struct MockServer {
    /// Base URL (`http://127.0.0.1:port`).
    base_url: String,
    /// Every request received so far.
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    /// Underlying server, shared with the serving thread.
    server: Arc<Server>,
    /// Serving thread.
    handle: Option<thread::JoinHandle<()>>,
}

impl MockServer {
    /// Starts a server answering every request with `responder`.
    pub fn start(responder: impl Fn(&RecordedRequest) -> MockResponse + Send + 'static) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let addr = server.server_addr().to_ip().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let responder: Responder = Box::new(responder);
        let handle = {
            let server = Arc::clone(&server);
            let requests = Arc::clone(&requests);
            thread::spawn(move || serve(&server, &requests, &responder))
        };
        Self {
            base_url: format!("http://{addr}"),
            requests,
            server,
            handle: Some(handle),
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns a URL for `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Returns every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Counts requests whose path starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.requests.lock().unwrap().iter().filter(|request| request.path().starts_with(prefix)).count()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Serves requests until the server is unblocked.
fn serve(server: &Server, requests: &Mutex<Vec<RecordedRequest>>, responder: &Responder) {
    while let Ok(mut request) = server.recv() {
        let mut body = String::new();
        let _ = request.as_reader().read_to_string(&mut body);
        let recorded = RecordedRequest {
            method: request.method().to_string(),
            url: request.url().to_string(),
            headers: request
                .headers()
                .iter()
                .map(|header| (header.field.to_string().to_ascii_lowercase(), header.value.to_string()))
                .collect(),
            body,
        };
        requests.lock().unwrap().push(recorded.clone());
        let scripted = responder(&recorded);
        let response = Response::from_data(scripted.body.into_bytes())
            .with_status_code(scripted.status)
            .with_header(Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap());
        let _ = request.respond(response);
    }
}

// ============================================================================
// SECTION: Workflow API Script
// ============================================================================

/// Task id returned by scripted workflow runs.
pub const TASK_ID: &str = "task-42";
/// Run endpoint prefix.
pub const RUN_PREFIX: &str = "/workflow/run/";
/// Result endpoint prefix.
pub const RESULT_PREFIX: &str = "/task/result/";

/// Task status entry: `(status, data, message)`.
pub type TaskStep = (i64, Value, &'static str);

/// Query body for a task step.
pub fn task_body(step: &TaskStep) -> Value {
    json!({
        "code": 200,
        "data": {"taskId": TASK_ID, "status": step.0, "data": step.1},
        "message": step.2,
        "success": true,
    })
}

/// Starts a workflow API returning `run_body` for runs and walking `steps`
/// for task queries.
pub fn workflow_server_with_run(run_body: Value, steps: Vec<TaskStep>) -> MockServer {
    let queries = Mutex::new(0_usize);
    MockServer::start(move |request| {
        if request.path().starts_with(RUN_PREFIX) {
            return MockResponse::json(&run_body);
        }
        if request.path().starts_with(RESULT_PREFIX) {
            let mut index = queries.lock().unwrap();
            let step = &steps[(*index).min(steps.len() - 1)];
            *index += 1;
            return MockResponse::json(&task_body(step));
        }
        MockResponse::with_status(404, &json!({"message": "not found"}))
    })
}

/// Starts a workflow API that accepts every run with [`TASK_ID`].
pub fn workflow_server(steps: Vec<TaskStep>) -> MockServer {
    workflow_server_with_run(
        json!({"code": 200, "data": TASK_ID, "message": "任务提交成功", "success": true}),
        steps,
    )
}

/// Running task step.
pub fn running() -> TaskStep {
    (3, Value::Null, "运行中")
}

/// Succeeded task step carrying `data`.
pub fn succeeded(data: Value) -> TaskStep {
    (1, data, "执行成功")
}

/// Failed task step.
pub fn failed(message: &'static str) -> TaskStep {
    (2, Value::Null, message)
}

// ============================================================================
// SECTION: Handler Wiring
// ============================================================================

/// Built-in handlers wired against a mock workflow server.
pub struct Harness {
    /// Built handlers.
    pub handlers: BuiltinHandlers,
    /// Record store shared with the handlers.
    pub store: SharedExecutionRecordStore,
    /// Captured audit events.
    pub audit: MemoryAuditSink,
}

/// Handler configuration pointing at `server` with a fast poll interval.
pub fn configs(server: &MockServer, max_attempts: u32) -> BuiltinHandlerConfigs {
    BuiltinHandlerConfigs {
        workflow: WorkflowApiConfig {
            base_url: server.base_url().to_string(),
            client_type: Some("test-suite".to_string()),
            ..WorkflowApiConfig::default()
        },
        polling: PollSettings {
            max_attempts,
            interval: Duration::from_millis(10),
        },
        workers: WorkerPoolConfig {
            threads: 2,
            queue_capacity: 8,
        },
        ..BuiltinHandlerConfigs::default()
    }
}

/// Builds the handlers against `server`.
pub fn harness(server: &MockServer, max_attempts: u32) -> Harness {
    let store = SharedExecutionRecordStore::from_store(InMemoryExecutionRecordStore::new());
    let audit = MemoryAuditSink::default();
    let handlers =
        BuiltinHandlers::build(&configs(server, max_attempts), store.clone(), Arc::new(audit.clone()))
            .unwrap();
    Harness {
        handlers,
        store,
        audit,
    }
}

/// Workflow handler input.
pub fn workflow_input() -> Map<String, Value> {
    match json!({
        "userId": "u-1",
        "aiApplicationId": "summarize",
        "workflowId": "wf-7",
        "apiKey": "secret-key",
        "params": {"text": "hello"},
    }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// Waits until the record reaches a terminal status.
pub fn wait_for_terminal(store: &SharedExecutionRecordStore, id: &RecordId) -> ExecutionRecord {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        let record = store.get_record(id).unwrap().expect("record exists");
        if record.is_terminal() {
            return record;
        }
        assert!(Instant::now() < deadline, "record {id} never settled");
        thread::sleep(Duration::from_millis(5));
    }
}
