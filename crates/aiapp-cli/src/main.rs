// crates/aiapp-cli/src/main.rs
// ============================================================================
// Module: AI App CLI Entry Point
// Description: Command dispatcher for schema tooling, config checks, and runs.
// Purpose: Provide a safe, localized CLI over the AI App execution core.
// Dependencies: clap, aiapp-config, aiapp-core, aiapp-handlers, serde_jcs, thiserror.
// ============================================================================

//! ## Overview
//! The AI App CLI exposes the execution core offline: validating parameters
//! against a schema, converting between schemas and field metadata, checking
//! configuration, running configured applications, and inspecting execution
//! records. All user-facing strings are routed through the i18n catalog.
//! Inputs are untrusted; every file read is size-bounded.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use aiapp_cli::i18n::Locale;
use aiapp_cli::i18n::set_locale;
use aiapp_cli::t;
use aiapp_config::AiAppConfig;
use aiapp_config::AuditSinkType;
use aiapp_config::StoreType;
use aiapp_core::ApplicationId;
use aiapp_core::ExecutionOrchestrator;
use aiapp_core::ExecutionRecord;
use aiapp_core::ExecutionRecordStore;
use aiapp_core::FieldMetadata;
use aiapp_core::RecordId;
use aiapp_core::RecordQuery;
use aiapp_core::RecordStatus;
use aiapp_core::SchemaCacheConfig;
use aiapp_core::SchemaMetadataConverter;
use aiapp_core::SchemaValidator;
use aiapp_core::UserId;
use aiapp_handlers::BuiltinHandlers;
use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a schema JSON input.
const MAX_SCHEMA_BYTES: usize = 1024 * 1024;
/// Maximum size of a parameters JSON input.
const MAX_PARAMS_BYTES: usize = 4 * 1024 * 1024;
/// Maximum size of a field metadata JSON input.
const MAX_METADATA_BYTES: usize = 1024 * 1024;
/// Interval between record checks while waiting on background work.
const WAIT_CHECK_INTERVAL: Duration = Duration::from_millis(50);
/// Response field carrying the record id of asynchronous submissions.
const RECORD_ID_FIELD: &str = "aiAppRecordId";
/// Environment variable for CLI locale selection.
const LANG_ENV: &str = "AIAPP_LANG";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "aiapp", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Preferred output language (overrides `AIAPP_LANG`).
    #[arg(long, value_enum, value_name = "LANG", global = true)]
    lang: Option<LangArg>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate parameters against a schema and print them with defaults filled.
    Validate(ValidateCommand),
    /// Schema and field metadata conversion utilities.
    Schema {
        /// Selected schema subcommand.
        #[command(subcommand)]
        command: SchemaCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Configured application utilities.
    App {
        /// Selected app subcommand.
        #[command(subcommand)]
        command: AppCommand,
    },
    /// Execute a configured application.
    Run(RunCommand),
    /// Execution record inspection.
    Records {
        /// Selected records subcommand.
        #[command(subcommand)]
        command: RecordsCommand,
    },
}

/// Schema subcommands.
#[derive(Subcommand, Debug)]
enum SchemaCommand {
    /// Project a schema into field metadata JSON.
    ToMetadata(SchemaToMetadataCommand),
    /// Build a Draft-07 schema from field metadata JSON.
    FromMetadata(SchemaFromMetadataCommand),
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate the configuration file.
    Validate(ConfigArgs),
}

/// App subcommands.
#[derive(Subcommand, Debug)]
enum AppCommand {
    /// List configured applications.
    List(ConfigArgs),
}

/// Records subcommands.
#[derive(Subcommand, Debug)]
enum RecordsCommand {
    /// List execution records, newest first.
    List(RecordsListCommand),
    /// Show one execution record.
    Get(RecordsGetCommand),
}

/// Shared config location argument.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Optional config file path (defaults to aiapp.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for parameter validation.
#[derive(Args, Debug)]
struct ValidateCommand {
    /// Path to the JSON Schema file.
    #[arg(long, value_name = "PATH")]
    schema: PathBuf,
    /// Path to the parameters JSON file.
    #[arg(long, value_name = "PATH")]
    params: PathBuf,
}

/// Arguments for schema to metadata conversion.
#[derive(Args, Debug)]
struct SchemaToMetadataCommand {
    /// Path to the JSON Schema file.
    #[arg(long, value_name = "PATH")]
    schema: PathBuf,
}

/// Arguments for metadata to schema conversion.
#[derive(Args, Debug)]
struct SchemaFromMetadataCommand {
    /// Path to the field metadata JSON array.
    #[arg(long, value_name = "PATH")]
    metadata: PathBuf,
}

/// Arguments for application execution.
#[derive(Args, Debug)]
struct RunCommand {
    /// Config location.
    #[command(flatten)]
    config: ConfigArgs,
    /// Application identifier.
    #[arg(long, value_name = "ID")]
    app: String,
    /// Calling user identifier.
    #[arg(long, value_name = "ID")]
    user: String,
    /// Path to the parameters JSON file.
    #[arg(long, value_name = "PATH")]
    params: PathBuf,
    /// Wait for background submissions to reach a terminal status.
    #[arg(long, action = ArgAction::SetTrue)]
    wait: bool,
}

/// Arguments for record listing.
#[derive(Args, Debug)]
struct RecordsListCommand {
    /// Config location.
    #[command(flatten)]
    config: ConfigArgs,
    /// Restrict to one user.
    #[arg(long, value_name = "ID")]
    user: Option<String>,
    /// Restrict to one application.
    #[arg(long, value_name = "ID")]
    app: Option<String>,
    /// Restrict to one status.
    #[arg(long, value_enum)]
    status: Option<StatusArg>,
    /// Maximum number of records.
    #[arg(long)]
    limit: Option<usize>,
}

/// Arguments for record lookup.
#[derive(Args, Debug)]
struct RecordsGetCommand {
    /// Config location.
    #[command(flatten)]
    config: ConfigArgs,
    /// Record identifier.
    #[arg(long, value_name = "ID")]
    id: String,
}

/// Record status filter.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum StatusArg {
    /// Submitted and not yet settled.
    Running,
    /// Completed successfully.
    Succeeded,
    /// Completed with failure.
    Failed,
}

impl From<StatusArg> for RecordStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Running => Self::Running,
            StatusArg::Succeeded => Self::Succeeded,
            StatusArg::Failed => Self::Failed,
        }
    }
}

/// Supported CLI language selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LangArg {
    /// English.
    En,
    /// Simplified Chinese.
    Zh,
}

impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Zh => Self::Zh,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Validate(command) => command_validate(&command),
        Commands::Schema {
            command,
        } => command_schema(&command),
        Commands::Config {
            command,
        } => command_config(&command),
        Commands::App {
            command,
        } => command_app(&command),
        Commands::Run(command) => command_run(&command),
        Commands::Records {
            command,
        } => command_records(&command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Validate Command
// ============================================================================

/// Executes the `validate` command.
fn command_validate(command: &ValidateCommand) -> CliResult<ExitCode> {
    let schema = read_text_input(&command.schema, &t!("input.kind.schema"), MAX_SCHEMA_BYTES)?;
    let params = read_json_input(&command.params, &t!("input.kind.params"), MAX_PARAMS_BYTES)?;
    let validator = SchemaValidator::new(SchemaCacheConfig::default());
    let filled = validator
        .validate_with_schema_text(&params, &schema)
        .map_err(|err| CliError::new(t!("validate.failed", error = err)))?;
    write_json_value(&Value::Object(filled))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Schema Commands
// ============================================================================

/// Dispatches schema subcommands.
fn command_schema(command: &SchemaCommand) -> CliResult<ExitCode> {
    match command {
        SchemaCommand::ToMetadata(command) => command_schema_to_metadata(command),
        SchemaCommand::FromMetadata(command) => command_schema_from_metadata(command),
    }
}

/// Executes `schema to-metadata`.
fn command_schema_to_metadata(command: &SchemaToMetadataCommand) -> CliResult<ExitCode> {
    let schema = read_text_input(&command.schema, &t!("input.kind.schema"), MAX_SCHEMA_BYTES)?;
    let fields = SchemaMetadataConverter::new()
        .schema_to_metadata(&schema)
        .map_err(|err| CliError::new(t!("schema.to_metadata.failed", error = err)))?;
    let value = serde_json::to_value(&fields)
        .map_err(|err| CliError::new(t!("output.json_failed", error = err)))?;
    write_json_value(&value)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `schema from-metadata`.
fn command_schema_from_metadata(command: &SchemaFromMetadataCommand) -> CliResult<ExitCode> {
    let kind = t!("input.kind.metadata");
    let value = read_json_input(&command.metadata, &kind, MAX_METADATA_BYTES)?;
    let fields: Vec<FieldMetadata> = serde_json::from_value(value).map_err(|err| {
        CliError::new(t!(
            "input.parse_failed",
            kind = kind,
            path = command.metadata.display(),
            error = err
        ))
    })?;
    let schema = SchemaMetadataConverter::new()
        .metadata_to_schema(&fields)
        .map_err(|err| CliError::new(t!("schema.from_metadata.failed", error = err)))?;
    write_stdout_line(&schema).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(args) => command_config_validate(args),
    }
}

/// Executes the config validation command.
fn command_config_validate(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args)?;
    write_stdout_line(&t!("config.validate.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line(&t!(
        "config.validate.summary",
        applications = config.applications.len(),
        store = store_label(config.store.store_type),
        audit = audit_label(config.audit.sink)
    ))
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Loads configuration with a localized error.
fn load_config(args: &ConfigArgs) -> CliResult<AiAppConfig> {
    AiAppConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Returns the display label for a store type.
const fn store_label(store_type: StoreType) -> &'static str {
    match store_type {
        StoreType::Memory => "memory",
        StoreType::Sqlite => "sqlite",
    }
}

/// Returns the display label for an audit sink.
const fn audit_label(sink: AuditSinkType) -> &'static str {
    match sink {
        AuditSinkType::Stderr => "stderr",
        AuditSinkType::File => "file",
        AuditSinkType::None => "none",
    }
}

// ============================================================================
// SECTION: App Commands
// ============================================================================

/// Dispatches app subcommands.
fn command_app(command: &AppCommand) -> CliResult<ExitCode> {
    match command {
        AppCommand::List(args) => command_app_list(args),
    }
}

/// Executes `app list`.
fn command_app_list(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args)?;
    let mut output = String::new();
    if config.applications.is_empty() {
        output.push_str(&t!("app.list.none"));
        output.push('\n');
    } else {
        output.push_str(&t!("app.list.header"));
        output.push('\n');
        for application in &config.applications {
            output.push_str(&t!(
                "app.list.entry",
                id = application.id,
                handler = application.handler,
                enabled = application.enabled,
                price = application.price
            ));
            output.push('\n');
        }
    }
    write_stdout_bytes(output.as_bytes())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes the `run` command.
fn command_run(command: &RunCommand) -> CliResult<ExitCode> {
    let config = load_config(&command.config)?;
    let params = read_json_input(&command.params, &t!("input.kind.params"), MAX_PARAMS_BYTES)?;
    let store =
        config.store.open().map_err(|err| CliError::new(t!("run.store_failed", error = err)))?;
    let audit =
        config.audit.open_sink().map_err(|err| CliError::new(t!("run.audit_failed", error = err)))?;
    let handlers =
        BuiltinHandlers::build(&config.handler_configs(), store.clone(), Arc::clone(&audit))
            .map_err(|err| CliError::new(t!("run.setup_failed", error = err)))?;
    let BuiltinHandlers {
        registry,
        pool,
        ..
    } = handlers;
    let orchestrator = ExecutionOrchestrator::new(
        Arc::new(config.catalog()),
        Arc::new(SchemaValidator::new(config.schema_cache.cache_config())),
        Arc::new(registry),
        audit,
    );

    let user_id = UserId::new(command.user.as_str());
    let app_id = ApplicationId::new(command.app.as_str());
    let outcome = orchestrator
        .execute(&user_id, &app_id, &params)
        .map_err(|err| CliError::new(t!("run.failed", error = err)));
    let waited = match (&outcome, command.wait) {
        (Ok(result), true) => submitted_record_id(result)
            .map(|record_id| wait_for_terminal(&store, &record_id, wait_budget(&config)))
            .transpose(),
        _ => Ok(None),
    };
    pool.shutdown();

    let result = outcome?;
    match waited? {
        Some(record) => write_json_value(&record_value(&record)?)?,
        None => write_json_value(&result)?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Extracts the record id of an asynchronous submission response.
fn submitted_record_id(result: &Value) -> Option<RecordId> {
    result.get(RECORD_ID_FIELD).and_then(Value::as_str).map(RecordId::new)
}

/// Upper bound on how long a background submission may take.
fn wait_budget(config: &AiAppConfig) -> Duration {
    let attempts = u64::from(config.polling.max_attempts);
    let per_attempt = config.polling.interval_ms.saturating_add(config.workflow.timeout_ms);
    let total = attempts.saturating_mul(per_attempt).saturating_add(config.workflow.timeout_ms);
    Duration::from_millis(total)
}

/// Blocks until the record settles or the budget runs out.
fn wait_for_terminal(
    store: &dyn ExecutionRecordStore,
    record_id: &RecordId,
    budget: Duration,
) -> CliResult<ExecutionRecord> {
    let started = Instant::now();
    loop {
        let record = store
            .get_record(record_id)
            .map_err(|err| {
                CliError::new(t!("run.wait.read_failed", record_id = record_id, error = err))
            })?
            .ok_or_else(|| CliError::new(t!("run.wait.missing", record_id = record_id)))?;
        if record.status.is_terminal() {
            return Ok(record);
        }
        if started.elapsed() >= budget {
            return Err(CliError::new(t!(
                "run.wait.pending",
                record_id = record_id,
                elapsed_ms = started.elapsed().as_millis()
            )));
        }
        thread::sleep(WAIT_CHECK_INTERVAL);
    }
}

// ============================================================================
// SECTION: Records Commands
// ============================================================================

/// Dispatches records subcommands.
fn command_records(command: &RecordsCommand) -> CliResult<ExitCode> {
    match command {
        RecordsCommand::List(command) => command_records_list(command),
        RecordsCommand::Get(command) => command_records_get(command),
    }
}

/// Executes `records list`.
fn command_records_list(command: &RecordsListCommand) -> CliResult<ExitCode> {
    if command.limit == Some(0) {
        return Err(CliError::new(t!("records.limit_invalid")));
    }
    let config = load_config(&command.config)?;
    let store =
        config.store.open().map_err(|err| CliError::new(t!("run.store_failed", error = err)))?;
    let query = RecordQuery {
        user_id: command.user.as_deref().map(UserId::new),
        application_id: command.app.as_deref().map(ApplicationId::new),
        status: command.status.map(RecordStatus::from),
        limit: command.limit,
    };
    let records = store
        .list_records(&query)
        .map_err(|err| CliError::new(t!("records.query_failed", error = err)))?;
    let values = records.iter().map(record_value).collect::<CliResult<Vec<Value>>>()?;
    write_json_value(&Value::Array(values))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `records get`.
fn command_records_get(command: &RecordsGetCommand) -> CliResult<ExitCode> {
    let config = load_config(&command.config)?;
    let store =
        config.store.open().map_err(|err| CliError::new(t!("run.store_failed", error = err)))?;
    let record_id = RecordId::new(command.id.as_str());
    let record = store
        .get_record(&record_id)
        .map_err(|err| CliError::new(t!("records.query_failed", error = err)))?
        .ok_or_else(|| CliError::new(t!("records.not_found", record_id = record_id)))?;
    write_json_value(&record_value(&record)?)?;
    Ok(ExitCode::SUCCESS)
}

/// Renders a record for output, exposing only the redacted input.
fn record_value(record: &ExecutionRecord) -> CliResult<Value> {
    let mut value = serde_json::to_value(record)
        .map_err(|err| CliError::new(t!("output.json_failed", error = err)))?;
    if let Value::Object(map) = &mut value {
        map.remove("input");
    }
    Ok(value)
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Reads a bounded UTF-8 text input.
fn read_text_input(path: &Path, kind: &str, max_bytes: usize) -> CliResult<String> {
    let bytes = read_bytes_with_limit(path, max_bytes).map_err(|err| match err {
        ReadLimitError::Io(err) => {
            CliError::new(t!("input.read_failed", kind = kind, path = path.display(), error = err))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!(
            "input.read_too_large",
            kind = kind,
            path = path.display(),
            size = size,
            limit = limit
        )),
    })?;
    String::from_utf8(bytes)
        .map_err(|_| CliError::new(t!("input.utf8_failed", kind = kind, path = path.display())))
}

/// Reads and parses a bounded JSON input.
fn read_json_input(path: &Path, kind: &str, max_bytes: usize) -> CliResult<Value> {
    let text = read_text_input(path, kind, max_bytes)?;
    serde_json::from_str(&text).map_err(|err| {
        CliError::new(t!("input.parse_failed", kind = kind, path = path.display(), error = err))
    })
}

/// Resolves the output locale from the flag or environment.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        });
    }
    Ok(Locale::En)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a canonical JSON value to stdout.
fn write_json_value(value: &Value) -> CliResult<()> {
    let mut bytes = serde_jcs::to_vec(value)
        .map_err(|err| CliError::new(t!("output.json_failed", error = err)))?;
    bytes.push(b'\n');
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
