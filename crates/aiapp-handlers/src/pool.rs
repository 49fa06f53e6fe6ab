// crates/aiapp-handlers/src/pool.rs
// ============================================================================
// Module: Background Worker Pool
// Description: Fixed thread pool with a bounded job queue.
// Purpose: Run asynchronous workflow completions off the request thread.
// Dependencies: aiapp-core
// ============================================================================

//! ## Overview
//! Jobs are queued on a bounded channel drained by a fixed set of named
//! threads. When the queue is full the submitting thread runs the job itself,
//! which throttles producers instead of dropping work. A panicking job is
//! contained at the worker boundary and logged. [`WorkerPool::shutdown`]
//! triggers the shared [`ShutdownSignal`] so sleeping pollers wake, closes
//! the queue, and joins every worker.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::panic::AssertUnwindSafe;
use std::panic::catch_unwind;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::mpsc;
use std::sync::mpsc::Receiver;
use std::sync::mpsc::SyncSender;
use std::sync::mpsc::TrySendError;
use std::thread;
use std::thread::JoinHandle;

use aiapp_core::AuditEvent;
use aiapp_core::AuditSink;
use aiapp_core::ShutdownSignal;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Worker pool sizing.
///
/// # Invariants
/// - `threads` and `queue_capacity` are both non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorkerPoolConfig {
    /// Number of worker threads.
    pub threads: usize,
    /// Maximum queued jobs before callers run jobs inline.
    pub queue_capacity: usize,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            threads: 10,
            queue_capacity: 200,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Worker pool errors.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Configuration is unusable.
    #[error("worker pool invalid config: {0}")]
    Invalid(String),
    /// A worker thread could not be spawned.
    #[error("worker pool spawn failed: {0}")]
    Spawn(String),
    /// The pool no longer accepts jobs.
    #[error("worker pool shut down")]
    ShutDown,
}

// ============================================================================
// SECTION: Pool
// ============================================================================

/// Unit of background work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Where a submitted job ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Queued for a worker thread.
    Queued,
    /// Queue was full; ran on the submitting thread.
    RanInline,
}

/// Fixed-size background worker pool.
pub struct WorkerPool {
    /// Queue sender; `None` once shut down.
    sender: Mutex<Option<SyncSender<Job>>>,
    /// Worker thread handles.
    workers: Mutex<Vec<JoinHandle<()>>>,
    /// Shutdown signal shared with pollers.
    shutdown: ShutdownSignal,
    /// Audit sink for contained job failures.
    audit: Arc<dyn AuditSink>,
}

impl WorkerPool {
    /// Starts the worker threads.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError`] for zero sizing or when a thread cannot spawn.
    pub fn new(
        config: WorkerPoolConfig,
        shutdown: ShutdownSignal,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self, PoolError> {
        if config.threads == 0 || config.queue_capacity == 0 {
            return Err(PoolError::Invalid("threads and queue_capacity must be non-zero".to_string()));
        }
        let (sender, receiver) = mpsc::sync_channel::<Job>(config.queue_capacity);
        let receiver = Arc::new(Mutex::new(receiver));
        let mut workers = Vec::with_capacity(config.threads);
        for index in 0 .. config.threads {
            let receiver = Arc::clone(&receiver);
            let audit = Arc::clone(&audit);
            let handle = thread::Builder::new()
                .name(format!("aiapp-worker-{index}"))
                .spawn(move || worker_loop(&receiver, audit.as_ref()))
                .map_err(|err| PoolError::Spawn(err.to_string()))?;
            workers.push(handle);
        }
        Ok(Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
            shutdown,
            audit,
        })
    }

    /// Returns the shutdown signal shared with pollers.
    #[must_use]
    pub const fn shutdown_signal(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    /// Submits a job, running it inline when the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ShutDown`] once shutdown has begun.
    pub fn submit(&self, job: impl FnOnce() + Send + 'static) -> Result<Dispatch, PoolError> {
        if self.shutdown.is_triggered() {
            return Err(PoolError::ShutDown);
        }
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner).clone();
        let Some(sender) = sender else {
            return Err(PoolError::ShutDown);
        };
        match sender.try_send(Box::new(job)) {
            Ok(()) => Ok(Dispatch::Queued),
            Err(TrySendError::Full(job)) => {
                run_contained(job, self.audit.as_ref());
                Ok(Dispatch::RanInline)
            }
            Err(TrySendError::Disconnected(_job)) => Err(PoolError::ShutDown),
        }
    }

    /// Triggers shutdown, closes the queue, and joins every worker.
    ///
    /// Queued jobs still run; pollers observe the signal and stop early.
    pub fn shutdown(&self) {
        self.shutdown.trigger();
        self.sender.lock().unwrap_or_else(PoisonError::into_inner).take();
        let workers: Vec<JoinHandle<()>> =
            self.workers.lock().unwrap_or_else(PoisonError::into_inner).drain(..).collect();
        for worker in workers {
            if worker.join().is_err() {
                self.audit.record(
                    &AuditEvent::new("async_worker_failed").message("worker thread panicked"),
                );
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Drains the queue until every sender is dropped.
fn worker_loop(receiver: &Mutex<Receiver<Job>>, audit: &dyn AuditSink) {
    loop {
        let next = receiver.lock().unwrap_or_else(PoisonError::into_inner).recv();
        let Ok(job) = next else {
            return;
        };
        run_contained(job, audit);
    }
}

/// Runs a job, containing and logging any panic.
fn run_contained(job: Job, audit: &dyn AuditSink) {
    if catch_unwind(AssertUnwindSafe(job)).is_err() {
        audit.record(&AuditEvent::new("async_worker_failed").message("background job panicked"));
    }
}
