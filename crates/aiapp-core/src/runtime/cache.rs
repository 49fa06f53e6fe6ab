// crates/aiapp-core/src/runtime/cache.rs
// ============================================================================
// Module: Schema Cache
// Description: Bounded idle-TTL cache with single-flight compute on miss.
// Purpose: Compile each schema once per key and share it across threads.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`SchemaCache`] maps caller-supplied keys to shared values. A miss claims a
//! slot under the map lock and computes outside it; concurrent callers for the
//! same key block on the slot's gate and receive the first caller's value.
//! Entries expire after sitting idle longer than the TTL and the
//! least-recently-used ready entries are evicted once the cache exceeds its
//! entry budget. Failed computations are not cached.
//!
//! Cached values are derived data, so a poisoned lock is recovered rather
//! than surfaced: the map is never left half-updated by a panic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::OnceLock;
use std::sync::PoisonError;
use std::time::Duration;
use std::time::Instant;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum number of cached entries.
pub const DEFAULT_MAX_ENTRIES: usize = 100;
/// Default idle time after which an entry expires.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(60 * 60);

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Schema cache bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaCacheConfig {
    /// Maximum number of entries retained.
    pub max_entries: usize,
    /// Idle time after which an entry expires.
    pub idle_ttl: Duration,
}

impl Default for SchemaCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            idle_ttl: DEFAULT_IDLE_TTL,
        }
    }
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Single-flight slot holding one computed value.
struct Slot<V> {
    /// Computed value once ready.
    value: OnceLock<Arc<V>>,
    /// Gate serializing the computation for this key.
    gate: Mutex<()>,
}

impl<V> Slot<V> {
    /// Creates an empty slot.
    const fn new() -> Self {
        Self {
            value: OnceLock::new(),
            gate: Mutex::new(()),
        }
    }

    /// Returns the value when it is ready.
    fn ready(&self) -> Option<Arc<V>> {
        self.value.get().map(Arc::clone)
    }
}

/// Map entry tracking idle time.
struct Entry<V> {
    /// Shared slot.
    slot: Arc<Slot<V>>,
    /// Last time the entry was requested.
    last_access: Instant,
}

/// Bounded idle-TTL cache with single-flight computation.
///
/// # Invariants
/// - At most one computation runs per key at a time.
/// - Entries still being computed are never expired or evicted.
pub struct SchemaCache<V> {
    /// Cache bounds.
    config: SchemaCacheConfig,
    /// Entries keyed by caller-supplied key.
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V> SchemaCache<V> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(config: SchemaCacheConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the configured bounds.
    #[must_use]
    pub const fn config(&self) -> SchemaCacheConfig {
        self.config
    }

    /// Returns the cached value for `key`, computing it on a miss.
    ///
    /// # Errors
    ///
    /// Returns the compute function's error; the failed key is not cached.
    pub fn get<E, F>(&self, key: &str, compute: F) -> Result<Arc<V>, E>
    where
        F: FnOnce(&str) -> Result<V, E>,
    {
        let slot = self.claim_slot(key);
        if let Some(value) = slot.ready() {
            return Ok(value);
        }
        let _gate = slot.gate.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = slot.ready() {
            return Ok(value);
        }
        match compute(key) {
            Ok(value) => {
                let value = Arc::new(value);
                let _ = slot.value.set(Arc::clone(&value));
                Ok(value)
            }
            Err(err) => {
                self.discard(key, &slot);
                Err(err)
            }
        }
    }

    /// Removes one entry. Returns true when an entry was present.
    pub fn invalidate(&self, key: &str) -> bool {
        self.lock_entries().remove(key).is_some()
    }

    /// Removes every entry.
    pub fn invalidate_all(&self) {
        self.lock_entries().clear();
    }

    /// Expires idle entries now. Returns the number removed.
    pub fn sweep(&self) -> usize {
        let mut entries = self.lock_entries();
        sweep_expired(&mut entries, Instant::now(), self.config.idle_ttl)
    }

    /// Returns the number of entries, including in-flight ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    /// Returns true when the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Finds or inserts the slot for `key`, refreshing its idle timer.
    fn claim_slot(&self, key: &str) -> Arc<Slot<V>> {
        let now = Instant::now();
        let mut entries = self.lock_entries();
        sweep_expired(&mut entries, now, self.config.idle_ttl);
        if let Some(entry) = entries.get_mut(key) {
            entry.last_access = now;
            return Arc::clone(&entry.slot);
        }
        let slot = Arc::new(Slot::new());
        entries.insert(
            key.to_string(),
            Entry {
                slot: Arc::clone(&slot),
                last_access: now,
            },
        );
        evict_overflow(&mut entries, key, self.config.max_entries);
        slot
    }

    /// Drops a slot whose computation failed, unless it was replaced.
    fn discard(&self, key: &str, slot: &Arc<Slot<V>>) {
        let mut entries = self.lock_entries();
        if entries.get(key).is_some_and(|entry| Arc::ptr_eq(&entry.slot, slot)) {
            entries.remove(key);
        }
    }

    /// Locks the entry map, recovering from poisoning.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Removes ready entries idle for longer than `ttl`.
fn sweep_expired<V>(entries: &mut HashMap<String, Entry<V>>, now: Instant, ttl: Duration) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| {
        entry.slot.value.get().is_none() || now.duration_since(entry.last_access) <= ttl
    });
    before - entries.len()
}

/// Evicts the longest-idle ready entries until the map fits `max_entries`.
fn evict_overflow<V>(entries: &mut HashMap<String, Entry<V>>, keep: &str, max_entries: usize) {
    while entries.len() > max_entries {
        let victim = entries
            .iter()
            .filter(|(key, entry)| key.as_str() != keep && entry.slot.value.get().is_some())
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(key, _)| key.clone());
        let Some(victim) = victim else {
            break;
        };
        entries.remove(&victim);
    }
}
