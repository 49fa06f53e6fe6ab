// crates/aiapp-core/src/runtime/registry.rs
// ============================================================================
// Module: Handler Registry
// Description: Name-to-handler lookup for execution strategies.
// Purpose: Add execution strategies without touching the orchestrator.
// Dependencies: crate::interfaces, thiserror
// ============================================================================

//! ## Overview
//! The registry is populated at startup and read-only afterwards. Lookups are
//! exact-match hash lookups; there is no fallback or fuzzy matching, and an
//! empty name is always an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::interfaces::AppHandler;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Handler registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Handler name was empty or whitespace.
    #[error("handler name must not be empty")]
    EmptyName,
    /// No handler is registered under the name.
    #[error("handler not registered: {name}")]
    NotFound {
        /// Requested handler name.
        name: String,
    },
    /// A handler is already registered under the name.
    #[error("handler already registered: {name}")]
    Duplicate {
        /// Conflicting handler name.
        name: String,
    },
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Registry of execution handlers keyed by name.
#[derive(Default)]
pub struct HandlerRegistry {
    /// Handlers keyed by registered name.
    handlers: HashMap<String, Arc<dyn AppHandler>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyName`] or [`RegistryError::Duplicate`].
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: impl AppHandler + 'static,
    ) -> Result<(), RegistryError> {
        self.register_shared(name, Arc::new(handler))
    }

    /// Registers an already shared handler under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyName`] or [`RegistryError::Duplicate`].
    pub fn register_shared(
        &mut self,
        name: impl Into<String>,
        handler: Arc<dyn AppHandler>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.handlers.contains_key(&name) {
            return Err(RegistryError::Duplicate {
                name,
            });
        }
        self.handlers.insert(name, handler);
        Ok(())
    }

    /// Looks up the handler registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::EmptyName`] or [`RegistryError::NotFound`].
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn AppHandler>, RegistryError> {
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        self.handlers.get(name).map(Arc::clone).ok_or_else(|| RegistryError::NotFound {
            name: name.to_string(),
        })
    }

    /// Returns true when a handler is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Returns registered handler names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }
}
