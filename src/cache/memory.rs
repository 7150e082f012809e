//! In-memory cache port backed by a shared [`CacheStore`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::{CachePort, CacheStats, CacheStore, StoredValue};
use crate::error::CacheError;
use crate::fingerprint::Fingerprint;

/// Cloneable handle to a process-local cache.
///
/// Every clone shares the same store.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    /// Thread-safe cache store
    pub store: Arc<RwLock<CacheStore>>,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self::from_store(CacheStore::new(max_entries))
    }

    pub fn from_store(store: CacheStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Creates a MemoryCache sized from configuration.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(config.max_entries)
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    /// Drops one entry, e.g. to force a refetch.
    pub async fn forget(&self, key: &Fingerprint) -> Result<(), CacheError> {
        self.store.write().await.delete(key)
    }
}

#[async_trait]
impl CachePort for MemoryCache {
    async fn has(&self, key: &Fingerprint) -> Result<bool, CacheError> {
        // Write lock: an expired entry is purged here
        Ok(self.store.write().await.contains(key))
    }

    async fn get(&self, key: &Fingerprint) -> Result<StoredValue, CacheError> {
        self.store.write().await.get(key)
    }

    async fn set(
        &self,
        value: StoredValue,
        key: &Fingerprint,
        ttl: u64,
    ) -> Result<bool, CacheError> {
        self.store.write().await.set(key.clone(), value, ttl)?;
        Ok(true)
    }
}
