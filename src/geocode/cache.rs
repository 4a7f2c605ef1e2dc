//! Session cache for geocoding results.
//!
//! Entries never expire within a session: identical repeated queries
//! short-circuit here instead of reaching the external service. Only
//! successful outcomes are stored, so a transient failure never poisons
//! later lookups.

use super::types::{CacheKey, GeocodeOutcome};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// A cached geocoding result.
#[derive(Debug, Clone)]
struct CacheEntry {
    outcome: GeocodeOutcome,
    /// When the result was fetched; kept for diagnostics, never used
    /// for expiry.
    fetched_at: Instant,
}

/// Cache statistics snapshot.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Lock-free session cache keyed by normalized request identity.
#[derive(Debug, Default)]
pub struct GeocodeCache {
    entries: DashMap<CacheKey, CacheEntry>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl GeocodeCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached outcome for a key, if present.
    pub fn get(&self, key: &CacheKey) -> Option<GeocodeOutcome> {
        match self.entries.get(key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.outcome.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Stores an outcome for a key, replacing any previous entry.
    pub fn insert(&self, key: CacheKey, outcome: GeocodeOutcome) {
        self.entries.insert(
            key,
            CacheEntry {
                outcome,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Age of the entry for a key, if present.
    pub fn entry_age(&self, key: &CacheKey) -> Option<std::time::Duration> {
        self.entries.get(key).map(|e| e.fetched_at.elapsed())
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a snapshot of the current statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}
