//! Cache Store Module
//!
//! Entry store combining HashMap storage with LRU tracking and TTL expiration.
//! The store itself is not synchronized; `MemLru` wraps it in a lock.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::cache::entry::expiry_from_ttl;
use crate::cache::{CacheEntry, CacheStats, LruTracker};

// == Cache Store ==
/// Bounded key-value storage with LRU eviction and TTL support.
///
/// Every entry owns exactly one node in the recency index and every node
/// belongs to exactly one entry.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
    /// TTL applied by `set` when none is given
    default_ttl: Option<Duration>,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore with specified capacity and default TTL.
    ///
    /// A capacity of zero is treated as one; validation of user input
    /// happens in `CacheConfig`.
    pub fn new(capacity: usize, default_ttl: Option<Duration>) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity),
            lru: LruTracker::with_capacity(capacity),
            stats: CacheStats::new(),
            capacity,
            default_ttl: default_ttl.filter(|d| !d.is_zero()),
        }
    }

    // == Set ==
    /// Stores a value under the cache's default TTL.
    pub fn set(&mut self, key: &str, value: V) {
        self.put(key, value, expiry_from_ttl(self.default_ttl));
    }

    /// Stores a value with an explicit TTL. A zero TTL never expires.
    pub fn set_ex(&mut self, key: &str, value: V, ttl: Duration) {
        self.put(key, value, expiry_from_ttl(Some(ttl)));
    }

    // == Put ==
    /// Stores a value with an absolute expiry instant.
    ///
    /// An existing key is updated in place and promoted. A new key evicts the
    /// least recently used entry first when the store is full.
    pub fn put(&mut self, key: &str, value: V, expires_at: Option<Instant>) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.value = value;
            entry.expires_at = expires_at;
            self.lru.touch(entry.node);
            return;
        }

        if self.entries.len() >= self.capacity {
            self.evict_oldest();
        }

        let node = self.lru.push_front(key.to_string());
        self.entries
            .insert(key.to_string(), CacheEntry::new(value, expires_at, node));
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Retrieves a value by key and promotes it.
    ///
    /// Expired entries are removed and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<V> {
        if !self.contains(key) {
            self.stats.record_miss();
            return None;
        }

        let entry = self.entries.get(key)?;
        self.lru.touch(entry.node);
        self.stats.record_hit();
        Some(entry.value.clone())
    }

    // == Contains ==
    /// Checks for a live entry without promoting it. Lazily removes the
    /// entry if it has expired.
    pub fn contains(&mut self, key: &str) -> bool {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => return false,
        };
        if expired {
            self.remove(key);
            self.stats.record_expirations(1);
            return false;
        }
        true
    }

    // == Touch ==
    /// Promotes a live entry to most recently used without changing it.
    pub fn touch(&mut self, key: &str) -> bool {
        if !self.contains(key) {
            return false;
        }
        if let Some(entry) = self.entries.get(key) {
            self.lru.touch(entry.node);
        }
        true
    }

    // == Remove ==
    /// Removes an entry by key, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let entry = self.entries.remove(key)?;
        self.lru.remove(entry.node);
        self.stats.set_total_entries(self.entries.len());
        Some(entry.value)
    }

    // == Remove Matching Prefix ==
    /// Removes every key that starts with `prefix`. Linear in the number of
    /// entries.
    ///
    /// Returns the number of entries removed.
    pub fn remove_prefix(&mut self, prefix: &str) -> usize {
        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();

        for key in &matching {
            self.remove(key);
        }
        matching.len()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove(key);
        }
        self.stats.record_expirations(expired.len());
        expired.len()
    }

    /// Drops every entry. Statistics counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.stats.set_total_entries(0);
    }

    fn evict_oldest(&mut self) {
        if let Some(evicted) = self.lru.evict_oldest() {
            let ttl_remaining_ms = self
                .entries
                .remove(&evicted)
                .and_then(|entry| entry.ttl_remaining())
                .map(|ttl| ttl.as_millis() as u64);
            self.stats.record_eviction();
            debug!(key = %evicted, ttl_remaining_ms, "Evicted least recently used entry");
        }
    }

    /// Returns the entry for `key` without expiry checks or promotion.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry<V>> {
        self.entries.get(key)
    }

    /// Keys from most to least recently used, including expired entries
    /// that have not been swept yet.
    pub fn keys_by_recency(&self) -> Vec<String> {
        self.lru.iter().map(str::to_string).collect()
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }

    /// Returns the number of stored entries, including expired entries that
    /// have not been swept yet.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn recency_len(&self) -> usize {
        self.lru.len()
    }
}
