// crates/aiapp-core/src/runtime/redaction.rs
// ============================================================================
// Module: Input Redaction
// Description: Display-safe copies of execution inputs.
// Purpose: Keep credentials out of record snapshots shown to operators.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Records keep both the raw validated input and a display copy. The display
//! copy is produced by a [`Redactor`]; [`KeyRedactor`] masks values under
//! sensitive key names at any depth.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Key names masked by [`KeyRedactor::default`] (compared case-insensitively).
pub const DEFAULT_SENSITIVE_KEYS: &[&str] =
    &["apikey", "api_key", "authorization", "password", "token", "secret"];
/// Replacement written over masked values.
pub const REDACTED: &str = "******";

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Produces the display snapshot for an input document.
pub trait Redactor: Send + Sync {
    /// Returns a display-safe copy of `input`.
    fn redact(&self, input: &Value) -> Value;
}

// ============================================================================
// SECTION: Key Redactor
// ============================================================================

/// Masks values stored under sensitive keys.
#[derive(Debug, Clone)]
pub struct KeyRedactor {
    /// Lowercased sensitive key names.
    keys: Vec<String>,
}

impl Default for KeyRedactor {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVE_KEYS.iter().copied())
    }
}

impl KeyRedactor {
    /// Creates a redactor for the given key names.
    #[must_use]
    pub fn new<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            keys: keys.into_iter().map(str::to_ascii_lowercase).collect(),
        }
    }

    /// Returns true when `key` is sensitive.
    fn is_sensitive(&self, key: &str) -> bool {
        let key = key.to_ascii_lowercase();
        self.keys.iter().any(|sensitive| *sensitive == key)
    }

    /// Masks sensitive values in place.
    fn mask(&self, value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, child) in map.iter_mut() {
                    if self.is_sensitive(key) {
                        *child = Value::String(REDACTED.to_string());
                    } else {
                        self.mask(child);
                    }
                }
            }
            Value::Array(items) => items.iter_mut().for_each(|item| self.mask(item)),
            _ => {}
        }
    }
}

impl Redactor for KeyRedactor {
    fn redact(&self, input: &Value) -> Value {
        let mut copy = input.clone();
        self.mask(&mut copy);
        copy
    }
}
