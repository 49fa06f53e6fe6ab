// crates/aiapp-core/src/runtime/polling.rs
// ============================================================================
// Module: Polling Completion Engine
// Description: Bounded fixed-interval polling of remote task status.
// Purpose: Drive a submitted remote task to a terminal status or a timeout.
// Dependencies: crate::audit, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A remote task moves `SUBMITTED -> (POLLING)* -> SUCCEEDED | FAILED | TIMED_OUT`.
//! The first query runs immediately; each later attempt first sleeps for the
//! interval. A failed query is logged and retried unless it was the final
//! attempt, in which case the error propagates. Exhausting the attempt budget
//! yields a synthetic failed result rather than an error.
//!
//! Sleeps wait on a [`ShutdownSignal`]; triggering it wakes every sleeper and
//! the loop aborts with [`PollError::Interrupted`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Display;
use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;
use std::time::Instant;

use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::audit::AuditEvent;
use crate::audit::AuditSink;
use crate::audit::NoopAuditSink;
use crate::core::RecordStatus;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default number of status queries before timing out.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;
/// Default sleep between status queries.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2000);
/// Result key carrying the number of queries performed.
pub const RETRY_COUNT_KEY: &str = "retryCount";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Attempt budget and interval for one polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Maximum number of status queries.
    pub max_attempts: u32,
    /// Sleep before every query after the first.
    pub interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_INTERVAL,
        }
    }
}

// ============================================================================
// SECTION: Shutdown Signal
// ============================================================================

/// Process-wide cooperative shutdown flag that wakes sleeping pollers.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    /// Triggered flag and its wake-up condition.
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl ShutdownSignal {
    /// Creates an untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Triggers shutdown and wakes every sleeper.
    pub fn trigger(&self) {
        let (flag, wake) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        wake.notify_all();
    }

    /// Returns true once shutdown was triggered.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        let (flag, _) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleeps for `duration` unless shutdown is triggered first.
    ///
    /// Returns true when the sleep was cut short by shutdown.
    #[must_use]
    pub fn sleep(&self, duration: Duration) -> bool {
        let (flag, wake) = &*self.inner;
        let guard = flag.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = wake
            .wait_timeout_while(guard, duration, |triggered| !*triggered)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Polling errors.
#[derive(Debug, Error)]
pub enum PollError {
    /// Shutdown interrupted the loop.
    #[error("轮询任务被中断")]
    Interrupted,
    /// The final status query failed.
    #[error("task status query failed: {0}")]
    Query(String),
}

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Terminal state reached by a polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Remote task reported success.
    Succeeded,
    /// Remote task reported failure.
    Failed,
    /// Attempt budget exhausted without a terminal status.
    TimedOut,
}

/// Final result of a polling loop.
///
/// # Invariants
/// - `result` is a JSON object carrying `retryCount` when the query result was an object.
/// - `attempts` never exceeds the configured `max_attempts`.
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome {
    /// Terminal state.
    pub state: PollState,
    /// Number of queries performed.
    pub attempts: u32,
    /// Final query result, or the synthetic timeout result.
    pub result: Value,
}

impl PollOutcome {
    /// Returns true when the remote task succeeded.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.state == PollState::Succeeded
    }

    /// Returns the result's `message` field.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.result.get("message").and_then(Value::as_str)
    }

    /// Returns the result's `data` payload (`null` when absent).
    #[must_use]
    pub fn data(&self) -> Value {
        self.result.get("data").cloned().unwrap_or(Value::Null)
    }
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Polls remote task status until a terminal status or the attempt budget.
#[derive(Clone)]
pub struct PollingCompletionEngine {
    /// Default settings for callers without explicit overrides.
    settings: PollSettings,
    /// Shutdown signal interrupting sleeps.
    shutdown: ShutdownSignal,
    /// Audit sink for retry and timeout events.
    audit: Arc<dyn AuditSink>,
}

impl PollingCompletionEngine {
    /// Creates an engine with the given defaults and shutdown signal.
    #[must_use]
    pub fn new(
        settings: PollSettings,
        shutdown: ShutdownSignal,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            settings,
            shutdown,
            audit,
        }
    }

    /// Creates an engine with default settings, a private signal, and no logging.
    #[must_use]
    pub fn with_settings(settings: PollSettings) -> Self {
        Self::new(settings, ShutdownSignal::new(), Arc::new(NoopAuditSink))
    }

    /// Returns the default settings.
    #[must_use]
    pub const fn settings(&self) -> PollSettings {
        self.settings
    }

    /// Returns the shutdown signal.
    #[must_use]
    pub const fn shutdown(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    /// Polls `task_id` with the engine's default settings.
    ///
    /// # Errors
    ///
    /// Same as [`PollingCompletionEngine::poll_until_terminal`].
    pub fn poll<Q, E, T, S>(
        &self,
        task_id: &str,
        query: Q,
        is_terminal: T,
        is_success: S,
    ) -> Result<PollOutcome, PollError>
    where
        Q: FnMut(&str) -> Result<Value, E>,
        E: Display,
        T: Fn(&Value) -> bool,
        S: Fn(&Value) -> bool,
    {
        self.poll_until_terminal(task_id, self.settings, query, is_terminal, is_success)
    }

    /// Polls `task_id` until `is_terminal` holds or the budget is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`PollError::Interrupted`] when shutdown interrupts the loop
    /// and [`PollError::Query`] when the final attempt's query fails.
    pub fn poll_until_terminal<Q, E, T, S>(
        &self,
        task_id: &str,
        settings: PollSettings,
        mut query: Q,
        is_terminal: T,
        is_success: S,
    ) -> Result<PollOutcome, PollError>
    where
        Q: FnMut(&str) -> Result<Value, E>,
        E: Display,
        T: Fn(&Value) -> bool,
        S: Fn(&Value) -> bool,
    {
        let started = Instant::now();
        for attempt in 1..=settings.max_attempts {
            let interrupted = self.shutdown.is_triggered()
                || (attempt > 1 && self.shutdown.sleep(settings.interval));
            if interrupted {
                return Err(PollError::Interrupted);
            }
            match query(task_id) {
                Ok(mut result) => {
                    if let Value::Object(map) = &mut result {
                        map.insert(RETRY_COUNT_KEY.to_string(), json!(attempt));
                    }
                    if is_terminal(&result) {
                        let state = if is_success(&result) {
                            PollState::Succeeded
                        } else {
                            PollState::Failed
                        };
                        return Ok(PollOutcome {
                            state,
                            attempts: attempt,
                            result,
                        });
                    }
                }
                Err(err) if attempt == settings.max_attempts => {
                    return Err(PollError::Query(err.to_string()));
                }
                Err(err) => {
                    self.audit.record(
                        &AuditEvent::new("poll_attempt_failed")
                            .task(task_id)
                            .attempt(attempt)
                            .message(err.to_string()),
                    );
                }
            }
        }
        self.audit.record(
            &AuditEvent::new("poll_timed_out")
                .task(task_id)
                .attempt(settings.max_attempts)
                .elapsed(elapsed_millis(started)),
        );
        Ok(PollOutcome {
            state: PollState::TimedOut,
            attempts: settings.max_attempts,
            result: timeout_result(task_id, settings.max_attempts),
        })
    }
}

// ============================================================================
// SECTION: Status Conventions
// ============================================================================

/// Reads the numeric `status` field of a task query result.
#[must_use]
pub fn status_code(result: &Value) -> Option<i64> {
    result.get("status").and_then(Value::as_i64)
}

/// Returns true when the result reports success (`1`) or failure (`2`).
#[must_use]
pub fn is_terminal_status(result: &Value) -> bool {
    status_code(result).and_then(RecordStatus::from_code).is_some_and(RecordStatus::is_terminal)
}

/// Returns true when the result reports success (`1`).
#[must_use]
pub fn is_success_status(result: &Value) -> bool {
    status_code(result) == Some(RecordStatus::Succeeded.code())
}

/// Builds the synthetic result recorded when the attempt budget runs out.
#[must_use]
pub fn timeout_result(task_id: &str, max_attempts: u32) -> Value {
    json!({
        "taskId": task_id,
        "status": RecordStatus::Failed.code(),
        "message": format!("任务执行超时，已达最大轮询次数: {max_attempts}"),
        RETRY_COUNT_KEY: max_attempts,
    })
}

/// Returns whole milliseconds elapsed since `started`.
#[must_use]
pub fn elapsed_millis(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
