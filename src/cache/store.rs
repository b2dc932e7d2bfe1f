//! Expiring Map Module
//!
//! Key-value storage where each entry may carry its own TTL. Expired entries
//! are evicted lazily: on the read that observes them, and in a passive purge
//! on every write.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tracing::trace;

use crate::cache::{CacheEntry, CacheStats};

// == Expiring Map ==
/// Mapping from key to value with optional per-entry time-to-live.
///
/// Not synchronized; wrap it in a lock when shared between threads.
#[derive(Debug)]
pub struct ExpiringMap<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// Lookup statistics
    stats: CacheStats,
}

impl<K, V> Default for ExpiringMap<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
        }
    }
}

impl<K, V> ExpiringMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Set ==
    /// Stores a value, replacing any existing entry for `key` and restarting
    /// its clock. `None` keeps the entry until it is deleted.
    pub fn set(&mut self, key: K, value: V, ttl: Option<Duration>) {
        self.entries.insert(key, CacheEntry::new(value, ttl));
        self.purge_expired();
    }

    // == Get ==
    /// Returns a clone of the live value for `key`.
    ///
    /// An expired entry is removed on the spot and reported as absent.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.stats.record_hit();
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(key);
            self.stats.record_expirations(1);
            self.stats.set_total_entries(self.entries.len());
            trace!("evicted expired entry on read");
        }
        self.stats.record_miss();
        None
    }

    // == Has ==
    /// Checks for a live entry without cloning its value.
    pub fn has(&self, key: &K) -> bool {
        self.entries
            .get(key)
            .map(|entry| !entry.is_expired())
            .unwrap_or(false)
    }

    // == Delete ==
    /// Removes the entry for `key`; returns whether one was present.
    pub fn delete(&mut self, key: &K) -> bool {
        let removed = self.entries.remove(key).is_some();
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.set_total_entries(0);
    }

    // == Keys ==
    /// Returns the keys of all live entries, dropping any expired ones found.
    pub fn keys(&mut self) -> Vec<K> {
        self.purge_expired();
        self.entries.keys().cloned().collect()
    }

    // == Purge Expired ==
    /// Removes all expired entries and returns how many were dropped.
    pub fn purge_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let removed = before - self.entries.len();

        self.stats.record_expirations(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
