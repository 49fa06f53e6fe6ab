// crates/aiapp-config/src/config.rs
// ============================================================================
// Module: AI App Configuration
// Description: Configuration loading and validation for the AI App runtime.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: aiapp-core, aiapp-handlers, aiapp-store-sqlite, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed. Every section defaults, so
//! an empty file yields a runnable in-memory setup with stderr audit logs.
//! Conversions at the bottom of each section turn validated values into the
//! runtime types consumed by the core and handler crates.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use std::time::SystemTime;

use aiapp_core::AiApplication;
use aiapp_core::AuditSink;
use aiapp_core::FileAuditSink;
use aiapp_core::InMemoryApplicationCatalog;
use aiapp_core::InMemoryExecutionRecordStore;
use aiapp_core::NoopAuditSink;
use aiapp_core::PollSettings;
use aiapp_core::SchemaCacheConfig;
use aiapp_core::SharedExecutionRecordStore;
use aiapp_core::StderrAuditSink;
use aiapp_handlers::BuiltinHandlerConfigs;
use aiapp_handlers::HttpClientConfig;
use aiapp_handlers::ResponseCacheConfig;
use aiapp_handlers::WorkerPoolConfig;
use aiapp_handlers::WorkflowApiConfig;
use aiapp_handlers::workflow::ID_PLACEHOLDER;
use aiapp_store_sqlite::SqliteExecutionRecordStore;
use aiapp_store_sqlite::SqliteStoreConfig;
use aiapp_store_sqlite::SqliteStoreMode;
use aiapp_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "aiapp.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "AIAPP_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of inline applications.
pub(crate) const MAX_APPLICATIONS: usize = 1024;
/// Maximum polling attempts per task.
pub(crate) const MAX_POLL_ATTEMPTS: u32 = 10_000;
/// Maximum worker threads.
pub(crate) const MAX_WORKER_THREADS: usize = 256;
/// Maximum outbound response size in bytes.
pub(crate) const MAX_RESPONSE_BYTES: usize = 64 * 1024 * 1024;
/// Default busy timeout for the sqlite store (ms).
const DEFAULT_STORE_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default workflow API request timeout (ms).
const DEFAULT_WORKFLOW_TIMEOUT_MS: u64 = 10_000;

// ============================================================================
// SECTION: Root
// ============================================================================

/// AI App runtime configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AiAppConfig {
    /// Compiled schema cache bounds.
    #[serde(default)]
    pub schema_cache: SchemaCacheSection,
    /// Task polling budget.
    #[serde(default)]
    pub polling: PollingConfig,
    /// Remote workflow API settings.
    #[serde(default)]
    pub workflow: WorkflowConfig,
    /// Outbound HTTP handler policy.
    #[serde(default)]
    pub http: HttpConfig,
    /// Cached HTTP handler bounds.
    #[serde(default)]
    pub http_cache: HttpCacheConfig,
    /// Background worker sizing.
    #[serde(default)]
    pub workers: WorkersConfig,
    /// Execution record store backend.
    #[serde(default)]
    pub store: StoreConfig,
    /// Audit sink selection.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Inline application catalog.
    #[serde(default)]
    pub applications: Vec<AiApplication>,
    /// Optional config source metadata (not serialized).
    #[serde(skip)]
    pub source_modified_at: Option<SystemTime>,
}

impl AiAppConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        config.source_modified_at = fs::metadata(&resolved).and_then(|meta| meta.modified()).ok();
        Ok(config)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.schema_cache.validate()?;
        self.polling.validate()?;
        self.workflow.validate()?;
        self.http.validate()?;
        self.http_cache.validate()?;
        self.workers.validate()?;
        self.store.validate()?;
        self.audit.validate()?;
        validate_applications(&self.applications)
    }

    /// Returns the settings for every built-in handler.
    #[must_use]
    pub fn handler_configs(&self) -> BuiltinHandlerConfigs {
        BuiltinHandlerConfigs {
            http: self.http.client_config(),
            http_cache: self.http_cache.cache_config(),
            workflow: self.workflow.api_config(),
            workflow_http: self.workflow.client_config(),
            polling: self.polling.settings(),
            workers: self.workers.pool_config(),
        }
    }

    /// Builds an in-memory catalog from the inline applications.
    #[must_use]
    pub fn catalog(&self) -> InMemoryApplicationCatalog {
        InMemoryApplicationCatalog::from_applications(self.applications.iter().cloned())
    }
}

// ============================================================================
// SECTION: Schema Cache
// ============================================================================

/// Compiled schema cache bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaCacheSection {
    /// Maximum compiled schemas retained.
    pub max_entries: usize,
    /// Idle time before an entry expires (ms).
    pub idle_ttl_ms: u64,
}

impl Default for SchemaCacheSection {
    fn default() -> Self {
        let defaults = SchemaCacheConfig::default();
        Self {
            max_entries: defaults.max_entries,
            idle_ttl_ms: u64::try_from(defaults.idle_ttl.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl SchemaCacheSection {
    /// Validates cache bounds.
    fn validate(self) -> Result<(), ConfigError> {
        require_nonzero("schema_cache.max_entries", self.max_entries)?;
        require_nonzero_u64("schema_cache.idle_ttl_ms", self.idle_ttl_ms)
    }

    /// Returns the runtime cache configuration.
    #[must_use]
    pub const fn cache_config(self) -> SchemaCacheConfig {
        SchemaCacheConfig {
            max_entries: self.max_entries,
            idle_ttl: Duration::from_millis(self.idle_ttl_ms),
        }
    }
}

// ============================================================================
// SECTION: Polling
// ============================================================================

/// Task polling budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollingConfig {
    /// Maximum status queries per task.
    pub max_attempts: u32,
    /// Sleep between queries (ms).
    pub interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        let defaults = PollSettings::default();
        Self {
            max_attempts: defaults.max_attempts,
            interval_ms: u64::try_from(defaults.interval.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl PollingConfig {
    /// Validates the polling budget.
    fn validate(self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 || self.max_attempts > MAX_POLL_ATTEMPTS {
            return Err(ConfigError::Invalid(format!(
                "polling.max_attempts must be between 1 and {MAX_POLL_ATTEMPTS}"
            )));
        }
        Ok(())
    }

    /// Returns the runtime poll settings.
    #[must_use]
    pub const fn settings(self) -> PollSettings {
        PollSettings {
            max_attempts: self.max_attempts,
            interval: Duration::from_millis(self.interval_ms),
        }
    }
}

// ============================================================================
// SECTION: Workflow API
// ============================================================================

/// Remote workflow API settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkflowConfig {
    /// Base URL of the workflow API.
    pub base_url: String,
    /// Run endpoint path template containing `{id}`.
    pub run_path: String,
    /// Task result endpoint path template containing `{id}`.
    pub result_path: String,
    /// Optional `X-Client-Type` header value.
    pub client_type: Option<String>,
    /// Request timeout (ms).
    pub timeout_ms: u64,
    /// Maximum response size in bytes.
    pub max_response_bytes: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        let api = WorkflowApiConfig::default();
        Self {
            base_url: api.base_url,
            run_path: api.run_path,
            result_path: api.result_path,
            client_type: api.client_type,
            timeout_ms: DEFAULT_WORKFLOW_TIMEOUT_MS,
            max_response_bytes: HttpClientConfig::default().max_response_bytes,
        }
    }
}

impl WorkflowConfig {
    /// Validates endpoints and limits.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_base_url("workflow.base_url", &self.base_url)?;
        let templates =
            [("workflow.run_path", &self.run_path), ("workflow.result_path", &self.result_path)];
        for (field, path) in templates {
            if !path.starts_with('/') || !path.contains(ID_PLACEHOLDER) {
                return Err(ConfigError::Invalid(format!(
                    "{field} must start with '/' and contain {ID_PLACEHOLDER}"
                )));
            }
        }
        if let Some(client_type) = &self.client_type
            && client_type.trim().is_empty()
        {
            return Err(ConfigError::Invalid("workflow.client_type must be non-empty".to_string()));
        }
        require_nonzero_u64("workflow.timeout_ms", self.timeout_ms)?;
        validate_response_limit("workflow.max_response_bytes", self.max_response_bytes)
    }

    /// Returns the endpoint configuration.
    #[must_use]
    pub fn api_config(&self) -> WorkflowApiConfig {
        WorkflowApiConfig {
            base_url: self.base_url.clone(),
            run_path: self.run_path.clone(),
            result_path: self.result_path.clone(),
            client_type: self.client_type.clone(),
        }
    }

    /// Returns the client configuration for workflow calls.
    #[must_use]
    pub fn client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout_ms: self.timeout_ms,
            max_response_bytes: self.max_response_bytes,
            ..HttpClientConfig::default()
        }
    }
}

// ============================================================================
// SECTION: Outbound HTTP
// ============================================================================

/// Outbound HTTP handler policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    /// Request timeout (ms).
    pub timeout_ms: u64,
    /// Maximum response size in bytes.
    pub max_response_bytes: usize,
    /// User agent for outbound requests.
    pub user_agent: String,
    /// Allow cleartext `http://` URLs.
    pub allow_http: bool,
    /// Optional host allowlist.
    pub allowed_hosts: Option<BTreeSet<String>>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        let client = HttpClientConfig::default();
        Self {
            timeout_ms: client.timeout_ms,
            max_response_bytes: client.max_response_bytes,
            user_agent: client.user_agent,
            allow_http: client.allow_http,
            allowed_hosts: client.allowed_hosts,
        }
    }
}

impl HttpConfig {
    /// Validates outbound limits.
    fn validate(&self) -> Result<(), ConfigError> {
        require_nonzero_u64("http.timeout_ms", self.timeout_ms)?;
        validate_response_limit("http.max_response_bytes", self.max_response_bytes)?;
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid("http.user_agent must be non-empty".to_string()));
        }
        if let Some(hosts) = &self.allowed_hosts
            && hosts.iter().any(|host| host.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "http.allowed_hosts entries must be non-empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            allow_http: self.allow_http,
            timeout_ms: self.timeout_ms,
            max_response_bytes: self.max_response_bytes,
            allowed_hosts: self.allowed_hosts.clone(),
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Cached HTTP handler bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpCacheConfig {
    /// Entry lifetime (ms).
    pub ttl_ms: u64,
    /// Maximum cached responses.
    pub max_entries: usize,
}

impl Default for HttpCacheConfig {
    fn default() -> Self {
        let defaults = ResponseCacheConfig::default();
        Self {
            ttl_ms: defaults.ttl_ms,
            max_entries: defaults.max_entries,
        }
    }
}

impl HttpCacheConfig {
    /// Validates cache bounds.
    fn validate(self) -> Result<(), ConfigError> {
        require_nonzero_u64("http_cache.ttl_ms", self.ttl_ms)?;
        require_nonzero("http_cache.max_entries", self.max_entries)
    }

    /// Returns the runtime cache configuration.
    #[must_use]
    pub const fn cache_config(self) -> ResponseCacheConfig {
        ResponseCacheConfig {
            ttl_ms: self.ttl_ms,
            max_entries: self.max_entries,
        }
    }
}

// ============================================================================
// SECTION: Workers
// ============================================================================

/// Background worker sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkersConfig {
    /// Worker thread count.
    pub threads: usize,
    /// Bounded queue capacity.
    pub queue_capacity: usize,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        let defaults = WorkerPoolConfig::default();
        Self {
            threads: defaults.threads,
            queue_capacity: defaults.queue_capacity,
        }
    }
}

impl WorkersConfig {
    /// Validates worker sizing.
    fn validate(self) -> Result<(), ConfigError> {
        if self.threads == 0 || self.threads > MAX_WORKER_THREADS {
            return Err(ConfigError::Invalid(format!(
                "workers.threads must be between 1 and {MAX_WORKER_THREADS}"
            )));
        }
        require_nonzero("workers.queue_capacity", self.queue_capacity)
    }

    /// Returns the runtime pool configuration.
    #[must_use]
    pub const fn pool_config(self) -> WorkerPoolConfig {
        WorkerPoolConfig {
            threads: self.threads,
            queue_capacity: self.queue_capacity,
        }
    }
}

// ============================================================================
// SECTION: Record Store
// ============================================================================

/// Record store backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Use the in-memory store.
    #[default]
    Memory,
    /// Use the sqlite store.
    Sqlite,
}

/// Execution record store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// `SQLite` database path when using the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::default(),
            path: None,
            busy_timeout_ms: default_store_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default sqlite busy timeout.
const fn default_store_busy_timeout_ms() -> u64 {
    DEFAULT_STORE_BUSY_TIMEOUT_MS
}

impl StoreConfig {
    /// Validates record store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.store_type {
            StoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid("memory store must not set path".to_string()));
                }
                Ok(())
            }
            StoreType::Sqlite => {
                let path = self
                    .path
                    .as_ref()
                    .ok_or_else(|| ConfigError::Invalid("sqlite store requires path".to_string()))?;
                validate_path_string("store.path", &path.to_string_lossy())
            }
        }
    }

    /// Returns the sqlite configuration when the sqlite backend is selected.
    #[must_use]
    pub fn sqlite_config(&self) -> Option<SqliteStoreConfig> {
        match (self.store_type, &self.path) {
            (StoreType::Sqlite, Some(path)) => Some(SqliteStoreConfig {
                busy_timeout_ms: self.busy_timeout_ms,
                journal_mode: self.journal_mode,
                sync_mode: self.sync_mode,
                ..SqliteStoreConfig::new(path.clone())
            }),
            _ => None,
        }
    }

    /// Opens the configured store.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the sqlite store cannot be opened.
    pub fn open(&self) -> Result<SharedExecutionRecordStore, ConfigError> {
        match self.sqlite_config() {
            Some(config) => SqliteExecutionRecordStore::new(config)
                .map(SharedExecutionRecordStore::from_store)
                .map_err(|err| ConfigError::Io(err.to_string())),
            None => Ok(SharedExecutionRecordStore::from_store(InMemoryExecutionRecordStore::new())),
        }
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkType {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Discard events.
    None,
}

/// Audit sink configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink type.
    pub sink: AuditSinkType,
    /// Log path for the file sink.
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates the audit sink.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkType::File, None) => {
                Err(ConfigError::Invalid("file audit sink requires path".to_string()))
            }
            (AuditSinkType::File, Some(path)) => {
                validate_path_string("audit.path", &path.to_string_lossy())
            }
            (_, Some(_)) => {
                Err(ConfigError::Invalid("audit.path is only valid for the file sink".to_string()))
            }
            (_, None) => Ok(()),
        }
    }

    /// Opens the configured sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit file cannot be opened.
    pub fn open_sink(&self) -> Result<Arc<dyn AuditSink>, ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkType::File, Some(path)) => FileAuditSink::new(path)
                .map(|sink| Arc::new(sink) as Arc<dyn AuditSink>)
                .map_err(|err| ConfigError::Io(err.to_string())),
            (AuditSinkType::File, None) => {
                Err(ConfigError::Invalid("file audit sink requires path".to_string()))
            }
            (AuditSinkType::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
            (AuditSinkType::None, _) => Ok(Arc::new(NoopAuditSink)),
        }
    }
}

// ============================================================================
// SECTION: Applications
// ============================================================================

/// Validates inline application entries.
fn validate_applications(applications: &[AiApplication]) -> Result<(), ConfigError> {
    if applications.len() > MAX_APPLICATIONS {
        return Err(ConfigError::Invalid(format!(
            "too many applications (max {MAX_APPLICATIONS})"
        )));
    }
    let mut seen = BTreeSet::new();
    for application in applications {
        let id = application.id.as_str();
        if id.trim().is_empty() {
            return Err(ConfigError::Invalid("application id must be non-empty".to_string()));
        }
        if !seen.insert(id) {
            return Err(ConfigError::Invalid(format!("duplicate application id: {id}")));
        }
        if application.handler.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("application {id} handler must be non-empty")));
        }
        validate_schema_text(&format!("application {id} param_schema"), &application.param_schema)?;
        if let Some(result_schema) = &application.result_schema {
            validate_schema_text(&format!("application {id} result_schema"), result_schema)?;
        }
    }
    Ok(())
}

/// Ensures schema text is a JSON object.
fn validate_schema_text(field: &str, text: &str) -> Result<(), ConfigError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(_)) => Ok(()),
        Ok(_) => Err(ConfigError::Invalid(format!("{field} must be a JSON object"))),
        Err(err) => Err(ConfigError::Invalid(format!("{field} is not valid JSON: {err}"))),
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration or opening resources.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates an absolute http(s) base URL.
fn validate_base_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|err| ConfigError::Invalid(format!("{field} is not a valid url: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid(format!("{field} must use http or https")));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::Invalid(format!("{field} must include a host")));
    }
    Ok(())
}

/// Validates a response size limit.
fn validate_response_limit(field: &str, value: usize) -> Result<(), ConfigError> {
    if value == 0 || value > MAX_RESPONSE_BYTES {
        return Err(ConfigError::Invalid(format!(
            "{field} must be between 1 and {MAX_RESPONSE_BYTES}"
        )));
    }
    Ok(())
}

/// Rejects zero-valued bounds.
fn require_nonzero(field: &str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid(format!("{field} must be greater than zero")));
    }
    Ok(())
}

/// Rejects zero-valued durations.
fn require_nonzero_u64(field: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid(format!("{field} must be greater than zero")));
    }
    Ok(())
}
