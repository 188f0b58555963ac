// ABOUTME: Time-bounded LRU cache for meal analysis results with lazy expiry on read
// ABOUTME: Time source is injectable so expiry boundaries can be tested without sleeping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Analysis result cache
//!
//! Entries are checked for expiry when read. There is no background sweep;
//! [`ResultCache::purge_expired`] exists for callers that want to reclaim
//! memory on their own schedule.

/// Injectable time sources
pub mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use fha_core::constants::cache::{DEFAULT_CACHE_MAX_ENTRIES, TTL_ANALYSIS_SECS};
use fha_core::models::MealType;
use lru::LruCache;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// Cache key for one meal: SHA-256 hex of `"meal_type:lowercase(trim(description))"`
#[must_use]
pub fn analysis_cache_key(meal_type: &MealType, description: &str) -> String {
    let normalized = description.trim().to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(meal_type.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: DateTime<Utc>,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    /// Expired once `now - inserted_at >= ttl`; a clock that moved backwards counts as fresh
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.inserted_at)
            .to_std()
            .is_ok_and(|age| age >= self.ttl)
    }
}

/// Counters exposed for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Entries physically present, expired or not
    pub entries: usize,
    /// Capacity before LRU eviction
    pub capacity: usize,
    /// Reads that returned a value
    pub hits: u64,
    /// Reads that found nothing or an expired entry
    pub misses: u64,
}

/// Bounded key/value store whose entries expire after a TTL
pub struct ResultCache<V> {
    store: Mutex<LruCache<String, CacheEntry<V>>>,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> fmt::Debug for ResultCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultCache")
            .field("default_ttl", &self.default_ttl)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl<V: Clone> Default for ResultCache<V> {
    fn default() -> Self {
        Self::new(
            DEFAULT_CACHE_MAX_ENTRIES,
            Duration::from_secs(TTL_ANALYSIS_SECS),
        )
    }
}

impl<V: Clone> ResultCache<V> {
    /// Fallback capacity when zero is requested
    const MIN_CAPACITY: NonZeroUsize = NonZeroUsize::MIN;

    /// Cache backed by the system clock
    #[must_use]
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self::with_clock(max_entries, default_ttl, Arc::new(SystemClock))
    }

    /// Cache backed by the given clock
    #[must_use]
    pub fn with_clock(max_entries: usize, default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or_else(|| {
            warn!("Cache capacity of zero requested, using 1");
            Self::MIN_CAPACITY
        });
        Self {
            store: Mutex::new(LruCache::new(capacity)),
            default_ttl,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// TTL applied by [`Self::put`]
    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Value for `key` if present and not expired; expired entries are evicted
    #[must_use]
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut store = self.lock();
        let value = match store.get(key) {
            Some(entry) if entry.is_expired(now) => {
                store.pop(key);
                debug!(key, "Cache entry expired");
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        };
        drop(store);

        let counter = if value.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        value
    }

    /// Store with the default TTL, replacing any previous entry
    pub fn put(&self, key: impl Into<String>, value: V) {
        self.put_with_ttl(key, value, self.default_ttl);
    }

    /// Store with an explicit TTL, replacing any previous entry
    pub fn put_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            inserted_at: self.clock.now(),
            ttl,
        };
        self.lock().put(key.into(), entry);
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut store = self.lock();
        let expired: Vec<String> = store
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            store.pop(key);
        }
        drop(store);
        if !expired.is_empty() {
            debug!(removed = expired.len(), "Purged expired cache entries");
        }
        expired.len()
    }

    /// Remove everything
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Entries physically present, including expired ones not yet read
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when no entries are stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl<V> ResultCache<V> {
    /// Hit/miss counters and occupancy
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let (entries, capacity) = {
            let store = self.lock();
            (store.len(), store.cap().get())
        };
        CacheStats {
            entries,
            capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, CacheEntry<V>>> {
        self.store.lock().unwrap_or_else(|poisoned| {
            warn!("Result cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}
