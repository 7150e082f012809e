//! Cache Store Module
//!
//! Fingerprint-keyed storage with TTL expiration and least-recently-used
//! eviction once `max_entries` is reached.

use std::collections::HashMap;

use crate::cache::{CacheEntry, CacheStats, StoredValue, MAX_VALUE_SIZE};
use crate::error::CacheError;
use crate::fingerprint::Fingerprint;

// == Cache Store ==
#[derive(Debug)]
pub struct CacheStore {
    entries: HashMap<Fingerprint, CacheEntry>,
    stats: CacheStats,
    max_entries: usize,
    /// Monotonic access clock driving LRU order
    tick: u64,
}

impl CacheStore {
    /// Creates an empty store holding at most `max_entries` values.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            max_entries,
            tick: 0,
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Drops `key` if its TTL elapsed. Returns true when it did.
    fn purge_if_expired(&mut self, key: &Fingerprint) -> bool {
        let expired = self.entries.get(key).is_some_and(CacheEntry::is_expired);
        if expired {
            self.entries.remove(key);
            self.stats.record_expirations(1);
        }
        expired
    }

    // == Contains ==
    /// Whether a live entry exists. Expired entries are dropped on the way.
    pub fn contains(&mut self, key: &Fingerprint) -> bool {
        self.purge_if_expired(key);
        self.entries.contains_key(key)
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl` seconds.
    ///
    /// Overwriting resets the TTL. A new key at capacity evicts the least
    /// recently used entry first.
    pub fn set(&mut self, key: Fingerprint, value: StoredValue, ttl: u64) -> Result<(), CacheError> {
        if value.size() > MAX_VALUE_SIZE {
            return Err(CacheError::InvalidRequest(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(k, _)| k.clone());

            match oldest {
                Some(evicted) => {
                    self.entries.remove(&evicted);
                    self.stats.record_eviction();
                }
                None => {
                    return Err(CacheError::CacheFull(
                        "Cache has no capacity for new entries".to_string(),
                    ));
                }
            }
        }

        let tick = self.next_tick();
        self.entries.insert(key, CacheEntry::new(value, ttl, tick));
        self.stats.record_write();
        Ok(())
    }

    // == Get ==
    /// Reads a live entry and marks it recently used.
    pub fn get(&mut self, key: &Fingerprint) -> Result<StoredValue, CacheError> {
        if self.purge_if_expired(key) {
            self.stats.record_miss();
            return Err(CacheError::Expired(key.to_string()));
        }

        let tick = self.next_tick();
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.last_access = tick;
                self.stats.record_hit();
                Ok(entry.value.clone())
            }
            None => {
                self.stats.record_miss();
                Err(CacheError::NotFound(key.to_string()))
            }
        }
    }

    // == Delete ==
    pub fn delete(&mut self, key: &Fingerprint) -> Result<(), CacheError> {
        self.entries
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.entries.len();
        stats
    }

    // == Cleanup Expired ==
    /// Removes every expired entry. Returns how many were removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let removed = before - self.entries.len();
        self.stats.record_expirations(removed);
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
