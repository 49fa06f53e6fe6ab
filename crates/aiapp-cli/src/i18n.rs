// crates/aiapp-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Provides message catalog and translation utilities for the CLI.
// Purpose: Centralize user-facing strings in English and Chinese.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! The AI App CLI stores user-facing strings in a small translation catalog so
//! that English and Chinese output stay consistent. All runtime output should
//! be routed through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to English and then to the key itself.
//! - Placeholder substitutions preserve deterministic order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Supported CLI locales.
///
/// # Invariants
/// - [`Locale::En`] is the default fallback locale.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Locale {
    /// English (default).
    En,
    /// Simplified Chinese.
    Zh,
}

impl Locale {
    /// Returns the canonical locale label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Zh => "zh",
        }
    }

    /// Attempts to parse a locale value (case-insensitive, tolerant of region tags).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let normalized = value.to_ascii_lowercase();
        let lang = normalized.split(['-', '_', '.']).next().unwrap_or("");
        match lang {
            "en" => Some(Self::En),
            "zh" => Some(Self::Zh),
            _ => None,
        }
    }
}

/// Ordered list of supported CLI locales.
pub const SUPPORTED_LOCALES: &[Locale] = &[Locale::En, Locale::Zh];

/// A formatted message argument captured by the [`macro@crate::t`] macro.
///
/// # Invariants
/// - `key` matches a placeholder name without braces (for example, `path`).
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates.
    pub key: &'static str,
    /// The formatted value substituted for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Locale Selection
// ============================================================================

/// Global locale selection for CLI output.
static CURRENT_LOCALE: OnceLock<Locale> = OnceLock::new();

/// Sets the CLI locale. Only the first call wins.
pub fn set_locale(locale: Locale) {
    let _ = CURRENT_LOCALE.set(locale);
}

/// Returns the current CLI locale (defaults to English).
#[must_use]
pub fn current_locale() -> Locale {
    CURRENT_LOCALE.get().copied().unwrap_or(Locale::En)
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// English catalog entries.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "aiapp {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("output.json_failed", "Failed to serialize output: {error}"),
    ("input.kind.schema", "schema"),
    ("input.kind.params", "parameters"),
    ("input.kind.metadata", "field metadata"),
    ("input.read_failed", "Failed to read {kind} at {path}: {error}"),
    (
        "input.read_too_large",
        "Refusing to read {kind} at {path} because it is {size} bytes (limit {limit}).",
    ),
    ("input.parse_failed", "Failed to parse {kind} JSON at {path}: {error}"),
    ("input.utf8_failed", "{kind} at {path} is not valid UTF-8."),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config is valid."),
    (
        "config.validate.summary",
        "Applications: {applications}, store: {store}, audit: {audit}",
    ),
    ("validate.failed", "Validation failed: {error}"),
    ("schema.to_metadata.failed", "Failed to convert schema to metadata: {error}"),
    ("schema.from_metadata.failed", "Failed to convert metadata to schema: {error}"),
    ("app.list.header", "Configured applications:"),
    ("app.list.none", "No applications configured."),
    ("app.list.entry", "- {id} handler={handler} enabled={enabled} price={price}"),
    ("run.store_failed", "Failed to open record store: {error}"),
    ("run.audit_failed", "Failed to open audit sink: {error}"),
    ("run.setup_failed", "Failed to start handlers: {error}"),
    ("run.failed", "Execution failed: {error}"),
    ("run.wait.read_failed", "Failed to read record {record_id}: {error}"),
    ("run.wait.missing", "Record {record_id} disappeared while waiting."),
    ("run.wait.pending", "Record {record_id} still running after {elapsed_ms} ms."),
    ("records.query_failed", "Failed to query records: {error}"),
    ("records.not_found", "Record not found: {record_id}"),
    ("records.limit_invalid", "limit must be >= 1."),
    ("i18n.lang.invalid_env", "Invalid value for {env}: {value}. Expected 'en' or 'zh'."),
];

/// Chinese catalog entries.
const CATALOG_ZH: &[(&str, &str)] = &[
    ("main.version", "aiapp {version}"),
    ("output.stream.stdout", "标准输出"),
    ("output.stream.stderr", "标准错误"),
    ("output.stream.unknown", "输出"),
    ("output.write_failed", "写入{stream}失败: {error}"),
    ("output.json_failed", "序列化输出失败: {error}"),
    ("input.kind.schema", "Schema"),
    ("input.kind.params", "参数"),
    ("input.kind.metadata", "字段元数据"),
    ("input.read_failed", "读取{kind}文件 {path} 失败: {error}"),
    ("input.read_too_large", "拒绝读取{kind}文件 {path}: 大小 {size} 字节超过限制 {limit}。"),
    ("input.parse_failed", "解析{kind} JSON 文件 {path} 失败: {error}"),
    ("input.utf8_failed", "{kind}文件 {path} 不是有效的 UTF-8。"),
    ("config.load_failed", "加载配置失败: {error}"),
    ("config.validate.ok", "配置有效。"),
    ("config.validate.summary", "应用数: {applications}, 存储: {store}, 审计: {audit}"),
    ("validate.failed", "校验失败: {error}"),
    ("schema.to_metadata.failed", "Schema 转换为元数据失败: {error}"),
    ("schema.from_metadata.failed", "元数据转换为 Schema 失败: {error}"),
    ("app.list.header", "已配置的应用:"),
    ("app.list.none", "未配置任何应用。"),
    ("app.list.entry", "- {id} 处理器={handler} 启用={enabled} 价格={price}"),
    ("run.store_failed", "打开执行记录存储失败: {error}"),
    ("run.audit_failed", "打开审计输出失败: {error}"),
    ("run.setup_failed", "启动处理器失败: {error}"),
    ("run.failed", "执行失败: {error}"),
    ("run.wait.read_failed", "读取记录 {record_id} 失败: {error}"),
    ("run.wait.missing", "等待期间记录 {record_id} 消失。"),
    ("run.wait.pending", "记录 {record_id} 在 {elapsed_ms} 毫秒后仍在运行。"),
    ("records.query_failed", "查询执行记录失败: {error}"),
    ("records.not_found", "未找到记录: {record_id}"),
    ("records.limit_invalid", "limit 必须 >= 1。"),
    ("i18n.lang.invalid_env", "{env} 的值无效: {value}。应为 'en' 或 'zh'。"),
];

/// Returns the message catalog for the requested locale.
pub(crate) fn catalog_for(locale: Locale) -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_EN_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    static CATALOG_ZH_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    match locale {
        Locale::En => CATALOG_EN_MAP.get_or_init(|| CATALOG_EN.iter().copied().collect()),
        Locale::Zh => CATALOG_ZH_MAP.get_or_init(|| CATALOG_ZH.iter().copied().collect()),
    }
}

/// Returns the keys present in the English catalog but missing from `locale`.
#[must_use]
pub fn missing_keys(locale: Locale) -> Vec<&'static str> {
    let target = catalog_for(locale);
    let mut missing: Vec<&'static str> =
        CATALOG_EN.iter().map(|(key, _)| *key).filter(|key| !target.contains_key(key)).collect();
    missing.sort_unstable();
    missing
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the selected locale while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    translate_in(current_locale(), key, args)
}

/// Translates `key` in an explicit locale.
#[must_use]
pub fn translate_in(locale: Locale, key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog_for(locale)
        .get(key)
        .copied()
        .or_else(|| catalog_for(Locale::En).get(key).copied())
        .unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a key and named arguments.
///
/// Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
