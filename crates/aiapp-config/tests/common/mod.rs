// crates/aiapp-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for aiapp-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use aiapp_config::AiAppConfig;
use aiapp_config::ConfigError;

/// Result type used by config tests.
pub type TestResult = Result<(), String>;

/// Parses a TOML string into an `AiAppConfig` without validation.
pub fn config_from_toml(toml_str: &str) -> Result<AiAppConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a minimal config with all defaults applied.
pub fn minimal_config() -> Result<AiAppConfig, String> {
    config_from_toml("").map_err(|err| err.to_string())
}

/// Asserts that validation failed with a message containing `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

/// Minimal application table with the given id and schema text.
pub fn application_toml(id: &str, handler: &str, schema: &str) -> String {
    format!("[[applications]]\nid = \"{id}\"\nhandler = \"{handler}\"\nparam_schema = '{schema}'\n")
}
