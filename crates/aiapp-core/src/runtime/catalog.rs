// crates/aiapp-core/src/runtime/catalog.rs
// ============================================================================
// Module: In-Memory Application Catalog
// Description: Application definitions held in process memory.
// Purpose: Serve configuration-defined applications to the orchestrator.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Applications are loaded once (typically from configuration) and may be
//! replaced at runtime. Reads clone the definition so callers never hold the
//! catalog lock while executing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::RwLock;

use crate::core::AiApplication;
use crate::core::ApplicationId;
use crate::interfaces::ApplicationCatalog;
use crate::interfaces::CatalogError;

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// In-memory application catalog.
#[derive(Debug, Default, Clone)]
pub struct InMemoryApplicationCatalog {
    /// Applications keyed by identifier.
    applications: Arc<RwLock<BTreeMap<ApplicationId, AiApplication>>>,
}

impl InMemoryApplicationCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding the given applications.
    #[must_use]
    pub fn from_applications(applications: impl IntoIterator<Item = AiApplication>) -> Self {
        let map = applications.into_iter().map(|app| (app.id.clone(), app)).collect();
        Self {
            applications: Arc::new(RwLock::new(map)),
        }
    }

    /// Inserts or replaces an application.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Backend`] when the catalog lock is poisoned.
    pub fn upsert(&self, application: AiApplication) -> Result<(), CatalogError> {
        self.applications
            .write()
            .map_err(|_| CatalogError::Backend("application catalog lock poisoned".to_string()))?
            .insert(application.id.clone(), application);
        Ok(())
    }
}

impl ApplicationCatalog for InMemoryApplicationCatalog {
    fn get_application(&self, id: &ApplicationId) -> Result<Option<AiApplication>, CatalogError> {
        let applications = self
            .applications
            .read()
            .map_err(|_| CatalogError::Backend("application catalog lock poisoned".to_string()))?;
        Ok(applications.get(id).cloned())
    }
}
