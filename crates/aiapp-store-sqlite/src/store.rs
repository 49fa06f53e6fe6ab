// crates/aiapp-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Execution Record Store
// Description: Durable ExecutionRecordStore backed by SQLite WAL.
// Purpose: Persist execution records with exactly-once terminal transitions.
// Dependencies: aiapp-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`ExecutionRecordStore`] using `SQLite`.
//! Every record is one row in `execution_records`; JSON payloads are stored
//! as text and decoded on load, failing closed when a stored payload is not
//! valid JSON or a status code is unknown. Writes go through a single
//! mutex-guarded connection while reads rotate over a small pool of
//! connections so WAL readers never queue behind writers.
//! Security posture: database contents are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use aiapp_core::ApplicationId;
use aiapp_core::ExecutionRecord;
use aiapp_core::ExecutionRecordStore;
use aiapp_core::NewRecord;
use aiapp_core::RecordId;
use aiapp_core::RecordQuery;
use aiapp_core::RecordStatus;
use aiapp_core::StoreError;
use aiapp_core::UserId;
use aiapp_core::unix_millis;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::params;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum encoded size of a single JSON payload (input, display, or output).
pub const MAX_PAYLOAD_BYTES: usize = 4 * 1024 * 1024;
/// Column list shared by every record query, in [`RawRecord::from_row`] order.
const RECORD_COLUMNS: &str = "record_id, user_id, application_id, handler, status, input_json, \
                              display_input_json, output_json, error_message, remote_task_id, \
                              credit_cost, execution_time_ms, created_at_ms, updated_at_ms";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` execution record store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
/// - `read_pool_size` is greater than zero.
/// - `max_payload_bytes`, when set, is greater than zero and no more than
///   [`MAX_PAYLOAD_BYTES`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Number of read-only connections used for read path isolation.
    #[serde(default = "default_read_pool_size")]
    pub read_pool_size: usize,
    /// Optional per-payload size limit in bytes.
    #[serde(default)]
    pub max_payload_bytes: Option<usize>,
}

impl SqliteStoreConfig {
    /// Creates a configuration with defaults for everything but the path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            read_pool_size: default_read_pool_size(),
            max_payload_bytes: None,
        }
    }

    /// Returns the effective payload size limit.
    #[must_use]
    pub const fn payload_limit(&self) -> usize {
        match self.max_payload_bytes {
            Some(limit) => limit,
            None => MAX_PAYLOAD_BYTES,
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default read connection pool size.
const fn default_read_pool_size() -> usize {
    2
}

/// Validates runtime limits in the store configuration.
fn validate_limits(config: &SqliteStoreConfig) -> Result<(), SqliteStoreError> {
    if config.read_pool_size == 0 {
        return Err(SqliteStoreError::Invalid(
            "read_pool_size must be greater than zero".to_string(),
        ));
    }
    if let Some(max_bytes) = config.max_payload_bytes
        && (max_bytes == 0 || max_bytes > MAX_PAYLOAD_BYTES)
    {
        return Err(SqliteStoreError::Invalid(format!(
            "max_payload_bytes out of range: {max_bytes} (max {MAX_PAYLOAD_BYTES})"
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding raw record payloads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored data failed to decode.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data or configuration.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Payload exceeded the configured size limit.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
    /// Record does not exist.
    #[error("sqlite store record not found: {0}")]
    NotFound(String),
    /// Record already reached a terminal status.
    #[error("sqlite store record already terminal: {0}")]
    Terminal(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) | SqliteStoreError::VersionMismatch(message) => {
                Self::Store(message)
            }
            SqliteStoreError::Corrupt(message) => Self::Invalid(format!("corrupt record: {message}")),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::Invalid(format!(
                "payload exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
            )),
            SqliteStoreError::NotFound(id) => Self::NotFound(id),
            SqliteStoreError::Terminal(id) => Self::Terminal(id),
        }
    }
}

/// Maps a `rusqlite` error into a store error.
fn db_error(err: &rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed execution record store.
///
/// # Invariants
/// - All writes are serialized through `write_connection`.
/// - A record leaves `Running` at most once (conditional update).
#[derive(Clone)]
pub struct SqliteExecutionRecordStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared writer connection guarded by a mutex.
    write_connection: Arc<Mutex<Connection>>,
    /// Read connection pool used for read path isolation under WAL.
    read_connections: Arc<Vec<Mutex<Connection>>>,
    /// Round-robin cursor for read connection selection.
    read_cursor: Arc<AtomicUsize>,
}

impl SqliteExecutionRecordStore {
    /// Opens an `SQLite`-backed execution record store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        validate_limits(&config)?;
        let mut write_connection = open_connection(&config)?;
        initialize_schema(&mut write_connection)?;
        let mut read_connections = Vec::with_capacity(config.read_pool_size);
        for _ in 0 .. config.read_pool_size {
            read_connections.push(Mutex::new(open_connection(&config)?));
        }
        Ok(Self {
            config,
            write_connection: Arc::new(Mutex::new(write_connection)),
            read_connections: Arc::new(read_connections),
            read_cursor: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }

    /// Verifies both the read and write paths can execute SQL.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if a mutex is poisoned or a query fails.
    pub fn readiness(&self) -> Result<(), SqliteStoreError> {
        let ping = |connection: &Connection| {
            connection
                .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map(|_| ())
                .map_err(|err| db_error(&err))
        };
        ping(&*self.read_guard()?)?;
        ping(&*self.write_guard()?)
    }

    /// Counts stored records.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the query fails.
    pub fn count_records(&self) -> Result<u64, SqliteStoreError> {
        let count: i64 = self
            .read_guard()?
            .query_row("SELECT COUNT(1) FROM execution_records", [], |row| row.get(0))
            .map_err(|err| db_error(&err))?;
        u64::try_from(count).map_err(|_| SqliteStoreError::Corrupt("negative record count".to_string()))
    }

    /// Locks the writer connection.
    fn write_guard(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.write_connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite write mutex poisoned".to_string()))
    }

    /// Locks the next read connection in round-robin order.
    fn read_guard(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        let index = self.read_cursor.fetch_add(1, Ordering::Relaxed) % self.read_connections.len();
        self.read_connections[index]
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite read mutex poisoned".to_string()))
    }

    /// Serializes a payload, enforcing the size limit.
    fn encode_payload(&self, value: &Value) -> Result<String, SqliteStoreError> {
        let text =
            serde_json::to_string(value).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        let max_bytes = self.config.payload_limit();
        if text.len() > max_bytes {
            return Err(SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes: text.len(),
            });
        }
        Ok(text)
    }

    /// Inserts a running record.
    fn insert_record(&self, request: NewRecord) -> Result<RecordId, SqliteStoreError> {
        let input_json = self.encode_payload(&request.input)?;
        let display_json = self.encode_payload(&request.display_input)?;
        let credit_cost = i64::try_from(request.credit_cost)
            .map_err(|_| SqliteStoreError::Invalid("credit_cost too large".to_string()))?;
        let id = RecordId::generate();
        let now = unix_millis();
        self.write_guard()?
            .execute(
                "INSERT INTO execution_records (record_id, user_id, application_id, handler, \
                 status, input_json, display_input_json, remote_task_id, credit_cost, \
                 created_at_ms, updated_at_ms) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, \
                 ?10)",
                params![
                    id.as_str(),
                    request.user_id.as_str(),
                    request.application_id.as_str(),
                    request.handler,
                    RecordStatus::Running.code(),
                    input_json,
                    display_json,
                    request.remote_task_id,
                    credit_cost,
                    now,
                ],
            )
            .map_err(|err| db_error(&err))?;
        Ok(id)
    }

    /// Moves a running record to a terminal status.
    fn finish(
        &self,
        id: &RecordId,
        status: RecordStatus,
        output: Option<&Value>,
        message: Option<&str>,
        elapsed_ms: u64,
    ) -> Result<(), SqliteStoreError> {
        let output_json = output.map(|value| self.encode_payload(value)).transpose()?;
        let elapsed_ms = i64::try_from(elapsed_ms).unwrap_or(i64::MAX);
        let mut connection = self.write_guard()?;
        let tx = connection.transaction().map_err(|err| db_error(&err))?;
        let changed = tx
            .execute(
                "UPDATE execution_records SET status = ?1, output_json = ?2, error_message = ?3, \
                 execution_time_ms = ?4, updated_at_ms = ?5 WHERE record_id = ?6 AND status = ?7",
                params![
                    status.code(),
                    output_json,
                    message,
                    elapsed_ms,
                    unix_millis(),
                    id.as_str(),
                    RecordStatus::Running.code(),
                ],
            )
            .map_err(|err| db_error(&err))?;
        if changed == 0 {
            let exists: Option<i64> = tx
                .query_row(
                    "SELECT status FROM execution_records WHERE record_id = ?1",
                    params![id.as_str()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|err| db_error(&err))?;
            return Err(match exists {
                Some(_) => SqliteStoreError::Terminal(id.to_string()),
                None => SqliteStoreError::NotFound(id.to_string()),
            });
        }
        tx.commit().map_err(|err| db_error(&err))
    }

    /// Loads at most one record matching `clause` with a single text parameter.
    fn load_one(&self, clause: &str, value: &str) -> Result<Option<ExecutionRecord>, SqliteStoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM execution_records WHERE {clause} ORDER BY created_at_ms \
             DESC, rowid DESC LIMIT 1"
        );
        let raw = self
            .read_guard()?
            .query_row(&sql, params![value], RawRecord::from_row)
            .optional()
            .map_err(|err| db_error(&err))?;
        raw.map(RawRecord::decode).transpose()
    }

    /// Lists records matching `query`, newest first.
    fn load_many(&self, query: &RecordQuery) -> Result<Vec<ExecutionRecord>, SqliteStoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM execution_records WHERE (?1 IS NULL OR user_id = ?1) \
             AND (?2 IS NULL OR application_id = ?2) AND (?3 IS NULL OR status = ?3) ORDER BY \
             created_at_ms DESC, rowid DESC LIMIT ?4"
        );
        let limit = query.limit.map_or(-1, |limit| i64::try_from(limit).unwrap_or(i64::MAX));
        let connection = self.read_guard()?;
        let mut statement = connection.prepare(&sql).map_err(|err| db_error(&err))?;
        let rows = statement
            .query_map(
                params![
                    query.user_id.as_ref().map(UserId::as_str),
                    query.application_id.as_ref().map(ApplicationId::as_str),
                    query.status.map(RecordStatus::code),
                    limit,
                ],
                RawRecord::from_row,
            )
            .map_err(|err| db_error(&err))?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|err| db_error(&err))?.decode()?);
        }
        Ok(records)
    }
}

impl ExecutionRecordStore for SqliteExecutionRecordStore {
    fn create_record(&self, record: NewRecord) -> Result<RecordId, StoreError> {
        self.insert_record(record).map_err(StoreError::from)
    }

    fn mark_succeeded(
        &self,
        id: &RecordId,
        output: Value,
        elapsed_ms: u64,
    ) -> Result<(), StoreError> {
        self.finish(id, RecordStatus::Succeeded, Some(&output), None, elapsed_ms)
            .map_err(StoreError::from)
    }

    fn mark_failed(&self, id: &RecordId, message: &str, elapsed_ms: u64) -> Result<(), StoreError> {
        self.finish(id, RecordStatus::Failed, None, Some(message), elapsed_ms)
            .map_err(StoreError::from)
    }

    fn get_record(&self, id: &RecordId) -> Result<Option<ExecutionRecord>, StoreError> {
        self.load_one("record_id = ?1", id.as_str()).map_err(StoreError::from)
    }

    fn find_by_remote_task(&self, task_id: &str) -> Result<Option<ExecutionRecord>, StoreError> {
        self.load_one("remote_task_id = ?1", task_id).map_err(StoreError::from)
    }

    fn list_records(&self, query: &RecordQuery) -> Result<Vec<ExecutionRecord>, StoreError> {
        self.load_many(query).map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Row Decoding
// ============================================================================

/// Undecoded `execution_records` row.
struct RawRecord {
    /// Record identifier.
    id: String,
    /// Invoking user.
    user_id: String,
    /// Executed application.
    application_id: String,
    /// Handler name.
    handler: String,
    /// Numeric status code.
    status: i64,
    /// Input JSON text.
    input_json: String,
    /// Display input JSON text.
    display_input_json: String,
    /// Output JSON text.
    output_json: Option<String>,
    /// Failure message.
    error_message: Option<String>,
    /// Remote task identifier.
    remote_task_id: Option<String>,
    /// Credit cost.
    credit_cost: i64,
    /// Elapsed time.
    execution_time_ms: Option<i64>,
    /// Creation time.
    created_at_ms: i64,
    /// Last update time.
    updated_at_ms: i64,
}

impl RawRecord {
    /// Reads a row selected with [`RECORD_COLUMNS`].
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            application_id: row.get(2)?,
            handler: row.get(3)?,
            status: row.get(4)?,
            input_json: row.get(5)?,
            display_input_json: row.get(6)?,
            output_json: row.get(7)?,
            error_message: row.get(8)?,
            remote_task_id: row.get(9)?,
            credit_cost: row.get(10)?,
            execution_time_ms: row.get(11)?,
            created_at_ms: row.get(12)?,
            updated_at_ms: row.get(13)?,
        })
    }

    /// Decodes JSON payloads and the status code.
    fn decode(self) -> Result<ExecutionRecord, SqliteStoreError> {
        let status = RecordStatus::from_code(self.status).ok_or_else(|| {
            SqliteStoreError::Corrupt(format!("record {} has unknown status {}", self.id, self.status))
        })?;
        let output = self.output_json.as_deref().map(|text| parse_payload(&self.id, text)).transpose()?;
        let credit_cost = u64::try_from(self.credit_cost)
            .map_err(|_| SqliteStoreError::Corrupt(format!("record {} has negative cost", self.id)))?;
        let execution_time_ms =
            self.execution_time_ms.map(|elapsed| u64::try_from(elapsed).unwrap_or_default());
        Ok(ExecutionRecord {
            input: parse_payload(&self.id, &self.input_json)?,
            display_input: parse_payload(&self.id, &self.display_input_json)?,
            id: RecordId::new(self.id),
            user_id: UserId::new(self.user_id),
            application_id: ApplicationId::new(self.application_id),
            handler: self.handler,
            status,
            output,
            error_message: self.error_message,
            remote_task_id: self.remote_task_id,
            credit_cost,
            execution_time_ms,
            created_at_ms: self.created_at_ms,
            updated_at_ms: self.updated_at_ms,
        })
    }
}

/// Parses a stored JSON payload.
fn parse_payload(id: &str, text: &str) -> Result<Value, SqliteStoreError> {
    serde_json::from_str(text)
        .map_err(|err| SqliteStoreError::Corrupt(format!("record {id} payload: {err}")))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection =
        Connection::open_with_flags(&config.path, flags).map_err(|err| db_error(&err))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| db_error(&err))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| db_error(&err))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| db_error(&err))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| db_error(&err))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| db_error(&err))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| db_error(&err))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| db_error(&err))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS execution_records (
                    record_id TEXT PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    application_id TEXT NOT NULL,
                    handler TEXT NOT NULL,
                    status INTEGER NOT NULL,
                    input_json TEXT NOT NULL,
                    display_input_json TEXT NOT NULL,
                    output_json TEXT,
                    error_message TEXT,
                    remote_task_id TEXT,
                    credit_cost INTEGER NOT NULL,
                    execution_time_ms INTEGER,
                    created_at_ms INTEGER NOT NULL,
                    updated_at_ms INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_execution_records_user
                    ON execution_records (user_id, created_at_ms);
                CREATE INDEX IF NOT EXISTS idx_execution_records_task
                    ON execution_records (remote_task_id);
                CREATE INDEX IF NOT EXISTS idx_execution_records_status
                    ON execution_records (status);",
            )
            .map_err(|err| db_error(&err))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| db_error(&err))?;
    Ok(())
}
