//! Request Coordinator Module
//!
//! Decides per fetch whether to answer from the cache, call the transport,
//! and store what came back.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::cache::{CachePort, StoredValue};
use crate::config::Config;
use crate::error::{FetchError, Result};
use crate::fingerprint::{Fingerprint, RequestDescriptor};
use crate::policy::Policy;
use crate::transport::{join_url, Transport};

/// The cache a coordinator remembers into, with the TTL given at bind time.
#[derive(Clone)]
struct CacheBinding {
    cache: Arc<dyn CachePort>,
    ttl: Option<u64>,
}

// == Request Coordinator ==
/// Memoizes transport calls behind a cache port.
///
/// A fetch calls the transport only on a cache miss with cache-only mode
/// off. Every such call bumps the counter of the descriptor's endpoint
/// group; hits never do. Setters take `&self` and apply from the next
/// fetch on, so one coordinator can be shared across tasks.
pub struct RequestCoordinator {
    transport: Arc<dyn Transport>,
    binding: RwLock<Option<CacheBinding>>,
    policy: RwLock<Policy>,
    counters: RwLock<HashMap<String, AtomicU64>>,
}

impl RequestCoordinator {
    // == Constructors ==
    /// Creates a coordinator with the default policy and no cache.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_policy(transport, Policy::default())
    }

    pub fn with_policy(transport: Arc<dyn Transport>, policy: Policy) -> Self {
        Self {
            transport,
            binding: RwLock::new(None),
            policy: RwLock::new(policy),
            counters: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a coordinator whose policy comes from configuration.
    pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> Self {
        Self::with_policy(transport, Policy::from_config(config))
    }

    // == Configuration Surface ==
    /// Binds `cache` and the TTL used for writes. A `None` TTL falls back to
    /// the policy's default TTL; with neither, lookups happen but nothing is
    /// stored.
    pub fn remember(&self, ttl: Option<u64>, cache: Arc<dyn CachePort>) -> &Self {
        *write(&self.binding) = Some(CacheBinding { cache, ttl });
        self
    }

    /// Unbinds the cache. Fetches go straight to the transport again.
    pub fn forget(&self) -> &Self {
        *write(&self.binding) = None;
        self
    }

    pub fn is_remembering(&self) -> bool {
        read(&self.binding).is_some()
    }

    pub fn set_cache_only(&self, cache_only: bool) -> &Self {
        write(&self.policy).cache_only = cache_only;
        self
    }

    pub fn set_client_error_caching(&self, enabled: bool) -> &Self {
        write(&self.policy).cache_client_errors = enabled;
        self
    }

    pub fn set_server_error_caching(&self, enabled: bool) -> &Self {
        write(&self.policy).cache_server_errors = enabled;
        self
    }

    pub fn set_default_ttl(&self, ttl: Option<u64>) -> &Self {
        write(&self.policy).default_ttl = ttl;
        self
    }

    /// Snapshot of the current policy.
    pub fn policy(&self) -> Policy {
        *read(&self.policy)
    }

    // == Request Counters ==
    /// Transport calls made for `group` since this coordinator was created.
    pub fn request_count(&self, group: &str) -> u64 {
        read(&self.counters)
            .get(group)
            .map_or(0, |count| count.load(Ordering::Relaxed))
    }

    /// Transport calls made across all groups.
    pub fn total_request_count(&self) -> u64 {
        read(&self.counters)
            .values()
            .map(|count| count.load(Ordering::Relaxed))
            .sum()
    }

    fn record_request(&self, group: &str) -> u64 {
        if let Some(count) = read(&self.counters).get(group) {
            return count.fetch_add(1, Ordering::Relaxed) + 1;
        }
        write(&self.counters)
            .entry(group.to_string())
            .or_default()
            .fetch_add(1, Ordering::Relaxed)
            + 1
    }

    // == Fetch ==
    /// Fetches `descriptor` using the TTL given to [`remember`](Self::remember).
    pub async fn fetch(&self, descriptor: &RequestDescriptor) -> Result<Bytes> {
        self.fetch_with_ttl(descriptor, None).await
    }

    /// Fetches `descriptor`, storing the outcome for `ttl` seconds if given.
    ///
    /// A stored error marker is returned as the same error kind the
    /// transport raised. Errors are returned whether or not they were stored.
    pub async fn fetch_with_ttl(
        &self,
        descriptor: &RequestDescriptor,
        ttl: Option<u64>,
    ) -> Result<Bytes> {
        let policy = self.policy();
        let binding = read(&self.binding).clone();
        let key = descriptor.fingerprint();
        let url = join_url(&self.transport.base_url(), descriptor.path());

        if let Some(binding) = &binding {
            if let Some(value) = lookup(binding.cache.as_ref(), &key).await? {
                debug!(%url, %key, error = value.is_error(), "Cache hit");
                return value.into_result();
            }
        }

        if policy.cache_only {
            debug!(%url, %key, "Cache miss in cache-only mode");
            return Err(FetchError::CacheNotFound(key));
        }

        let count = self.record_request(descriptor.group());
        info!(%url, %key, group = descriptor.group(), count, "Requesting");
        let outcome = self
            .transport
            .request(descriptor.path(), descriptor.params())
            .await;

        let Some(binding) = binding else {
            return outcome;
        };
        let Some(ttl) = ttl.or(binding.ttl).or(policy.default_ttl) else {
            return outcome;
        };

        let value = match &outcome {
            Ok(body) => Some(StoredValue::from(body.clone())),
            Err(err) => StoredValue::from_error(err)
                .filter(|_| err.status().is_some_and(|s| policy.caches_status(s))),
        };
        if let Some(value) = value {
            store(binding.cache.as_ref(), value, &key, ttl).await;
        }

        outcome
    }
}

/// Reads `key` when `has` says it is there. An entry that expires between
/// the two calls counts as a miss.
async fn lookup(cache: &dyn CachePort, key: &Fingerprint) -> Result<Option<StoredValue>> {
    if !cache.has(key).await? {
        return Ok(None);
    }
    match cache.get(key).await {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_miss() => {
            debug!(%key, "Entry vanished between has and get");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// Writes are best effort; the fetch outcome does not depend on them.
async fn store(cache: &dyn CachePort, value: StoredValue, key: &Fingerprint, ttl: u64) {
    let is_error = value.is_error();
    match cache.set(value, key, ttl).await {
        Ok(true) => debug!(%key, ttl, error = is_error, "Stored"),
        Ok(false) => warn!(%key, "Cache declined the write"),
        Err(err) => warn!(%key, %err, "Cache write failed"),
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    use crate::cache::MemoryCache;
    use crate::error::HttpFailure;

    /// Answers every request with a fixed status.
    struct FixedTransport {
        status: u16,
        calls: AtomicUsize,
    }

    impl FixedTransport {
        fn new(status: u16) -> Arc<Self> {
            Arc::new(Self {
                status,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Transport for FixedTransport {
        fn base_url(&self) -> String {
            "https://api.example.com/".to_string()
        }

        async fn request(&self, _path: &str, _params: &[(String, String)]) -> Result<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.status {
                200 => Ok(Bytes::from_static(b"{\"ok\":true}")),
                status => Err(FetchError::from_failure(HttpFailure::new(status, ""))),
            }
        }
    }

    fn summoner() -> RequestDescriptor {
        RequestDescriptor::new("summoner", "na/v1.4/summoner/by-name/bakasan")
            .param("api_key", "key")
    }

    #[tokio::test]
    async fn test_no_cache_always_requests() {
        let transport = FixedTransport::new(200);
        let coordinator = RequestCoordinator::new(transport.clone());

        coordinator.fetch(&summoner()).await.unwrap();
        coordinator.fetch(&summoner()).await.unwrap();

        assert_eq!(coordinator.request_count("summoner"), 2);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_counters_are_per_group() {
        let coordinator = RequestCoordinator::new(FixedTransport::new(200));
        let champion = RequestDescriptor::new("champion", "na/v1.2/champion");

        coordinator.fetch(&summoner()).await.unwrap();
        coordinator.fetch(&champion).await.unwrap();
        coordinator.fetch(&champion).await.unwrap();

        assert_eq!(coordinator.request_count("summoner"), 1);
        assert_eq!(coordinator.request_count("champion"), 2);
        assert_eq!(coordinator.request_count("league"), 0);
        assert_eq!(coordinator.total_request_count(), 3);
    }

    #[tokio::test]
    async fn test_without_ttl_nothing_is_stored() {
        let cache = MemoryCache::new(10);
        let coordinator = RequestCoordinator::new(FixedTransport::new(200));
        coordinator.remember(None, Arc::new(cache.clone()));

        coordinator.fetch(&summoner()).await.unwrap();
        coordinator.fetch(&summoner()).await.unwrap();

        assert!(cache.is_empty().await);
        assert_eq!(coordinator.request_count("summoner"), 2);
    }

    #[tokio::test]
    async fn test_default_ttl_applies() {
        let cache = MemoryCache::new(10);
        let coordinator = RequestCoordinator::new(FixedTransport::new(200));
        coordinator
            .remember(None, Arc::new(cache.clone()))
            .set_default_ttl(Some(30));

        coordinator.fetch(&summoner()).await.unwrap();
        coordinator.fetch(&summoner()).await.unwrap();

        assert_eq!(cache.len().await, 1);
        assert_eq!(coordinator.request_count("summoner"), 1);
    }

    #[tokio::test]
    async fn test_per_call_ttl_overrides() {
        let cache = MemoryCache::new(10);
        let coordinator = RequestCoordinator::new(FixedTransport::new(200));
        coordinator.remember(Some(60), Arc::new(cache.clone()));

        // Zero TTL: stored but never served
        coordinator.fetch_with_ttl(&summoner(), Some(0)).await.unwrap();
        coordinator.fetch(&summoner()).await.unwrap();

        assert_eq!(coordinator.request_count("summoner"), 2);
    }

    #[tokio::test]
    async fn test_forget_unbinds_cache() {
        let coordinator = RequestCoordinator::new(FixedTransport::new(200));
        coordinator.remember(Some(60), Arc::new(MemoryCache::new(10)));
        assert!(coordinator.is_remembering());

        coordinator.fetch(&summoner()).await.unwrap();
        coordinator.forget();
        coordinator.fetch(&summoner()).await.unwrap();

        assert!(!coordinator.is_remembering());
        assert_eq!(coordinator.request_count("summoner"), 2);
    }

    #[tokio::test]
    async fn test_unexpected_status_is_not_cached() {
        let cache = MemoryCache::new(10);
        let coordinator = RequestCoordinator::new(FixedTransport::new(304));
        coordinator.remember(Some(60), Arc::new(cache.clone()));

        let err = coordinator.fetch(&summoner()).await.unwrap_err();

        assert!(matches!(err, FetchError::UnexpectedStatus(304)));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_cache_only_without_cache_fails() {
        let transport = FixedTransport::new(200);
        let coordinator = RequestCoordinator::new(transport.clone());
        coordinator.set_cache_only(true);

        let err = coordinator.fetch(&summoner()).await.unwrap_err();

        assert!(matches!(err, FetchError::CacheNotFound(_)));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_setters_chain() {
        let coordinator = RequestCoordinator::new(FixedTransport::new(200));
        coordinator
            .set_cache_only(true)
            .set_client_error_caching(false)
            .set_server_error_caching(true)
            .set_default_ttl(Some(5));

        assert_eq!(
            coordinator.policy(),
            Policy {
                cache_only: true,
                cache_client_errors: false,
                cache_server_errors: true,
                default_ttl: Some(5),
            }
        );
    }
}
