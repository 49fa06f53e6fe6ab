// crates/aiapp-handlers/src/cached.rs
// ============================================================================
// Module: Cached HTTP Handler
// Description: HTTP passthrough handler with a TTL response cache.
// Purpose: Avoid repeating identical upstream calls within the TTL.
// Dependencies: aiapp-core, crate::{client, http}
// ============================================================================

//! ## Overview
//! Requests are keyed by `"http-cache:" + sha256(JCS(params))`, where the
//! caller context keys (`userId`, `aiApplicationId`) are excluded so that
//! identical requests share one entry across users. Only 2xx responses are
//! stored. Entries expire `ttl` after insertion; when the cache is full the
//! entry closest to expiry is dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::time::Duration;
use std::time::Instant;

use aiapp_core::AppHandler;
use aiapp_core::AuditEvent;
use aiapp_core::AuditSink;
use aiapp_core::HandlerError;
use aiapp_core::core::hashing::fingerprint_json;
use aiapp_core::runtime::orchestrator::APPLICATION_ID_PARAM;
use aiapp_core::runtime::orchestrator::USER_ID_PARAM;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use crate::client::HttpClient;
use crate::http::send_request;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Prefix applied to every cache key.
pub const CACHE_KEY_PREFIX: &str = "http-cache:";

/// Response cache bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResponseCacheConfig {
    /// Entry lifetime in milliseconds.
    pub ttl_ms: u64,
    /// Maximum number of cached responses.
    pub max_entries: usize,
}

impl Default for ResponseCacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: 12 * 60 * 60 * 1000,
            max_entries: 1000,
        }
    }
}

// ============================================================================
// SECTION: Cache
// ============================================================================

/// Cached handler output with its expiry.
#[derive(Debug, Clone)]
struct CachedResponse {
    /// Handler output document.
    output: Value,
    /// Instant after which the entry is stale.
    expires_at: Instant,
}

/// Bounded TTL map of handler outputs.
#[derive(Debug)]
struct ResponseCache {
    /// Entry lifetime.
    ttl: Duration,
    /// Maximum entry count.
    max_entries: usize,
    /// Entries keyed by request fingerprint.
    entries: Mutex<HashMap<String, CachedResponse>>,
}

impl ResponseCache {
    /// Returns the live entry for `key`, dropping it when stale.
    fn get(&self, key: &str, now: Instant) -> Option<Value> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.output.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores `output` under `key`, evicting to stay within bounds.
    fn insert(&self, key: String, output: Value, now: Instant) {
        if self.max_entries == 0 {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            entries.retain(|_, entry| entry.expires_at > now);
            if entries.len() >= self.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.expires_at)
                    .map(|(key, _)| key.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }
        entries.insert(key, CachedResponse {
            output,
            expires_at: now + self.ttl,
        });
    }

    /// Returns the number of stored entries, stale ones included.
    fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

// ============================================================================
// SECTION: Handler
// ============================================================================

/// HTTP passthrough handler backed by a response cache.
pub struct CachedHttpHandler {
    /// Shared outbound client.
    client: HttpClient,
    /// Response cache.
    cache: ResponseCache,
    /// Audit sink for cache hits.
    audit: Arc<dyn AuditSink>,
}

impl CachedHttpHandler {
    /// Creates a cached handler.
    #[must_use]
    pub fn new(client: HttpClient, config: ResponseCacheConfig, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            client,
            cache: ResponseCache {
                ttl: Duration::from_millis(config.ttl_ms),
                max_entries: config.max_entries,
                entries: Mutex::new(HashMap::new()),
            },
            audit,
        }
    }

    /// Returns the number of cached responses.
    #[must_use]
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

impl AppHandler for CachedHttpHandler {
    fn execute(&self, params: &Map<String, Value>) -> Result<Value, HandlerError> {
        let key = cache_key(params)?;
        if let Some(output) = self.cache.get(&key, Instant::now()) {
            self.audit.record(&AuditEvent::new("handler_cache_hit").message(key));
            return Ok(output);
        }
        let response = send_request(&self.client, params)?;
        let output = response.to_output();
        if response.is_success() {
            self.cache.insert(key, output.clone(), Instant::now());
        }
        Ok(output)
    }
}

/// Computes the cache key for a request.
///
/// # Errors
///
/// Returns [`HandlerError::Internal`] when canonicalization fails.
pub fn cache_key(params: &Map<String, Value>) -> Result<String, HandlerError> {
    let request: Map<String, Value> = params
        .iter()
        .filter(|(key, _)| key.as_str() != USER_ID_PARAM && key.as_str() != APPLICATION_ID_PARAM)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    let digest = fingerprint_json(&request)
        .map_err(|err| HandlerError::Internal(format!("cache key: {err}")))?;
    Ok(format!("{CACHE_KEY_PREFIX}{}", digest.value))
}
