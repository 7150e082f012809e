//! Cache Module
//!
//! The cache port the coordinator talks to, the values it stores, and an
//! in-memory implementation with TTL expiration and LRU eviction.

mod entry;
mod memory;
mod stats;
mod store;


use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{CacheError, FetchError, HttpFailure};
use crate::fingerprint::Fingerprint;

// Re-export public types
pub use entry::CacheEntry;
pub use memory::MemoryCache;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Maximum allowed payload or error body size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB

// == Stored Value ==
/// What a fetch left behind: the payload, or the failure to re-raise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoredValue {
    /// Successful response body
    Payload { body: Bytes },
    /// Cached 4xx response
    ClientError(HttpFailure),
    /// Cached 5xx response
    ServerError(HttpFailure),
}

impl StoredValue {
    /// Error marker for a fetch failure, if the failure kind is cacheable.
    pub fn from_error(err: &FetchError) -> Option<Self> {
        match err {
            FetchError::Client(f) => Some(StoredValue::ClientError(f.clone())),
            FetchError::Server(f) => Some(StoredValue::ServerError(f.clone())),
            _ => None,
        }
    }

    /// Turns the stored value back into the outcome it recorded.
    pub fn into_result(self) -> crate::error::Result<Bytes> {
        match self {
            StoredValue::Payload { body } => Ok(body),
            StoredValue::ClientError(f) => Err(FetchError::Client(f)),
            StoredValue::ServerError(f) => Err(FetchError::Server(f)),
        }
    }

    /// Size of the stored body in bytes.
    pub fn size(&self) -> usize {
        match self {
            StoredValue::Payload { body } => body.len(),
            StoredValue::ClientError(f) | StoredValue::ServerError(f) => f.body.len(),
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, StoredValue::Payload { .. })
    }
}

impl From<Bytes> for StoredValue {
    fn from(body: Bytes) -> Self {
        StoredValue::Payload { body }
    }
}

// == Cache Port ==
/// Storage capability used by the coordinator.
///
/// `get` is only called after `has` returned true for the same key within
/// one fetch. Implementations enforce TTLs themselves.
#[async_trait]
pub trait CachePort: Send + Sync {
    /// Whether a live entry exists under `key`.
    async fn has(&self, key: &Fingerprint) -> Result<bool, CacheError>;

    /// Reads the entry under `key`.
    async fn get(&self, key: &Fingerprint) -> Result<StoredValue, CacheError>;

    /// Stores `value` under `key` for `ttl` seconds. Returns whether the
    /// value was written.
    async fn set(&self, value: StoredValue, key: &Fingerprint, ttl: u64)
        -> Result<bool, CacheError>;
}
