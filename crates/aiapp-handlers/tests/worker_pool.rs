// crates/aiapp-handlers/tests/worker_pool.rs
// ============================================================================
// Module: Worker Pool Tests
// Description: Bounded queue, caller-runs overflow, and shutdown behavior.
// Purpose: Ensure background work is never silently dropped.
// Dependencies: aiapp-core, aiapp-handlers
// ============================================================================

//! ## Overview
//! Drives the worker pool with blocking jobs to fill its queue and checks
//! overflow, panic containment, and shutdown semantics.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::sync::Arc;
use std::sync::Barrier;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use aiapp_core::ShutdownSignal;
use aiapp_handlers::Dispatch;
use aiapp_handlers::PoolError;
use aiapp_handlers::WorkerPool;
use aiapp_handlers::WorkerPoolConfig;

use crate::common::MemoryAuditSink;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

fn pool(threads: usize, queue_capacity: usize, audit: &MemoryAuditSink) -> WorkerPool {
    WorkerPool::new(
        WorkerPoolConfig {
            threads,
            queue_capacity,
        },
        ShutdownSignal::new(),
        Arc::new(audit.clone()),
    )
    .unwrap()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn zero_sizing_is_rejected() {
    let audit = MemoryAuditSink::default();
    for (threads, queue_capacity) in [(0, 4), (2, 0)] {
        let result = WorkerPool::new(
            WorkerPoolConfig {
                threads,
                queue_capacity,
            },
            ShutdownSignal::new(),
            Arc::new(audit.clone()),
        );
        assert!(matches!(result, Err(PoolError::Invalid(_))));
    }
}

#[test]
fn queued_jobs_run_on_worker_threads() {
    let audit = MemoryAuditSink::default();
    let pool = pool(2, 8, &audit);
    let (sender, receiver) = mpsc::channel();

    for _ in 0 .. 4 {
        let sender = sender.clone();
        let dispatch = pool
            .submit(move || {
                let name = thread::current().name().unwrap_or_default().to_string();
                sender.send(name).unwrap();
            })
            .unwrap();
        assert_eq!(dispatch, Dispatch::Queued);
    }

    for _ in 0 .. 4 {
        let name = receiver.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(name.starts_with("aiapp-worker-"), "ran on {name}");
    }
    pool.shutdown();
}

#[test]
fn full_queue_runs_job_on_caller() {
    let audit = MemoryAuditSink::default();
    let pool = pool(1, 1, &audit);
    let started = Arc::new(Barrier::new(2));
    let (release, gate) = mpsc::channel::<()>();

    let worker_started = Arc::clone(&started);
    pool.submit(move || {
        worker_started.wait();
        let _ = gate.recv();
    })
    .unwrap();
    started.wait();
    assert_eq!(pool.submit(|| {}).unwrap(), Dispatch::Queued);

    let caller = thread::current().id();
    let (sender, receiver) = mpsc::channel();
    let dispatch = pool.submit(move || sender.send(thread::current().id()).unwrap()).unwrap();

    assert_eq!(dispatch, Dispatch::RanInline);
    assert_eq!(receiver.try_recv().unwrap(), caller);
    release.send(()).unwrap();
    pool.shutdown();
}

#[test]
fn shutdown_drains_queue_then_rejects() {
    let audit = MemoryAuditSink::default();
    let pool = pool(1, 16, &audit);
    let ran = Arc::new(AtomicUsize::new(0));

    for _ in 0 .. 5 {
        let ran = Arc::clone(&ran);
        pool.submit(move || {
            ran.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }
    pool.shutdown();

    assert_eq!(ran.load(Ordering::SeqCst), 5);
    assert!(pool.shutdown_signal().is_triggered());
    assert!(matches!(pool.submit(|| {}), Err(PoolError::ShutDown)));
}

#[test]
fn panicking_job_is_contained_and_logged() {
    let audit = MemoryAuditSink::default();
    let pool = pool(1, 4, &audit);
    let (sender, receiver) = mpsc::channel();

    pool.submit(|| panic!("boom")).unwrap();
    pool.submit(move || sender.send(()).unwrap()).unwrap();

    receiver.recv_timeout(Duration::from_secs(5)).unwrap();
    pool.shutdown();
    assert_eq!(audit.labels(), vec!["async_worker_failed"]);
}
