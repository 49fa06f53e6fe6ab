// crates/aiapp-core/src/runtime/store.rs
// ============================================================================
// Module: AI App In-Memory Record Store
// Description: In-memory execution record store and shared store wrapper.
// Purpose: Provide a dependency-free store for tests and single-process use.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryExecutionRecordStore`] keeps records in a mutex-guarded map and
//! enforces the single terminal transition rule. [`SharedExecutionRecordStore`]
//! wraps any store behind an `Arc` so handlers and workers can share it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use serde_json::Value;

use crate::core::ExecutionRecord;
use crate::core::NewRecord;
use crate::core::RecordId;
use crate::core::RecordQuery;
use crate::core::RecordStatus;
use crate::core::unix_millis;
use crate::interfaces::ExecutionRecordStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Record map plus insertion sequence.
#[derive(Debug, Default)]
struct RecordTable {
    /// Records keyed by identifier with their insertion sequence.
    records: BTreeMap<RecordId, (u64, ExecutionRecord)>,
    /// Next insertion sequence number.
    next_seq: u64,
}

/// In-memory execution record store.
#[derive(Debug, Default, Clone)]
pub struct InMemoryExecutionRecordStore {
    /// Record table protected by a mutex.
    table: Arc<Mutex<RecordTable>>,
}

impl InMemoryExecutionRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the record table.
    fn lock(&self) -> Result<MutexGuard<'_, RecordTable>, StoreError> {
        self.table
            .lock()
            .map_err(|_| StoreError::Store("execution record store mutex poisoned".to_string()))
    }

    /// Applies a terminal transition to a running record.
    fn finish(
        &self,
        id: &RecordId,
        status: RecordStatus,
        output: Option<Value>,
        message: Option<String>,
        elapsed_ms: u64,
    ) -> Result<(), StoreError> {
        let mut table = self.lock()?;
        let Some((_, record)) = table.records.get_mut(id) else {
            return Err(StoreError::NotFound(id.to_string()));
        };
        if record.is_terminal() {
            return Err(StoreError::Terminal(id.to_string()));
        }
        record.status = status;
        record.output = output;
        record.error_message = message;
        record.execution_time_ms = Some(elapsed_ms);
        record.updated_at_ms = unix_millis();
        drop(table);
        Ok(())
    }
}

impl ExecutionRecordStore for InMemoryExecutionRecordStore {
    fn create_record(&self, record: NewRecord) -> Result<RecordId, StoreError> {
        let id = RecordId::generate();
        let record = ExecutionRecord::running(id.clone(), record, unix_millis());
        let mut table = self.lock()?;
        let seq = table.next_seq;
        table.next_seq += 1;
        table.records.insert(id.clone(), (seq, record));
        drop(table);
        Ok(id)
    }

    fn mark_succeeded(
        &self,
        id: &RecordId,
        output: Value,
        elapsed_ms: u64,
    ) -> Result<(), StoreError> {
        self.finish(id, RecordStatus::Succeeded, Some(output), None, elapsed_ms)
    }

    fn mark_failed(&self, id: &RecordId, message: &str, elapsed_ms: u64) -> Result<(), StoreError> {
        self.finish(id, RecordStatus::Failed, None, Some(message.to_string()), elapsed_ms)
    }

    fn get_record(&self, id: &RecordId) -> Result<Option<ExecutionRecord>, StoreError> {
        Ok(self.lock()?.records.get(id).map(|(_, record)| record.clone()))
    }

    fn find_by_remote_task(&self, task_id: &str) -> Result<Option<ExecutionRecord>, StoreError> {
        let table = self.lock()?;
        Ok(table
            .records
            .values()
            .filter(|(_, record)| record.remote_task_id.as_deref() == Some(task_id))
            .max_by_key(|(seq, _)| *seq)
            .map(|(_, record)| record.clone()))
    }

    fn list_records(&self, query: &RecordQuery) -> Result<Vec<ExecutionRecord>, StoreError> {
        let table = self.lock()?;
        let mut matches: Vec<&(u64, ExecutionRecord)> =
            table.records.values().filter(|(_, record)| query.matches(record)).collect();
        matches.sort_by(|a, b| b.0.cmp(&a.0));
        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(matches.into_iter().take(limit).map(|(_, record)| record.clone()).collect())
    }
}

// ============================================================================
// SECTION: Shared Store
// ============================================================================

/// Shared execution record store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedExecutionRecordStore {
    /// Inner store implementation.
    inner: Arc<dyn ExecutionRecordStore>,
}

impl SharedExecutionRecordStore {
    /// Wraps a store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl ExecutionRecordStore + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn ExecutionRecordStore>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl ExecutionRecordStore for SharedExecutionRecordStore {
    fn create_record(&self, record: NewRecord) -> Result<RecordId, StoreError> {
        self.inner.create_record(record)
    }

    fn mark_succeeded(
        &self,
        id: &RecordId,
        output: Value,
        elapsed_ms: u64,
    ) -> Result<(), StoreError> {
        self.inner.mark_succeeded(id, output, elapsed_ms)
    }

    fn mark_failed(&self, id: &RecordId, message: &str, elapsed_ms: u64) -> Result<(), StoreError> {
        self.inner.mark_failed(id, message, elapsed_ms)
    }

    fn get_record(&self, id: &RecordId) -> Result<Option<ExecutionRecord>, StoreError> {
        self.inner.get_record(id)
    }

    fn find_by_remote_task(&self, task_id: &str) -> Result<Option<ExecutionRecord>, StoreError> {
        self.inner.find_by_remote_task(task_id)
    }

    fn list_records(&self, query: &RecordQuery) -> Result<Vec<ExecutionRecord>, StoreError> {
        self.inner.list_records(query)
    }
}
