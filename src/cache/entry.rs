//! Cache Entry Module
//!
//! A stored value together with its write time, expiry and last access.

use chrono::{DateTime, Duration, Utc};

use crate::cache::StoredValue;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: StoredValue,
    /// When the entry was written
    pub created_at: DateTime<Utc>,
    /// When the entry stops being served
    pub expires_at: DateTime<Utc>,
    /// Store-local access tick, higher = more recently used
    pub last_access: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry that lives for `ttl_seconds` from now.
    pub fn new(value: StoredValue, ttl_seconds: u64, tick: u64) -> Self {
        let now = Utc::now();
        let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        let expires_at = Duration::try_seconds(ttl)
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            value,
            created_at: now,
            expires_at,
            last_access: tick,
        }
    }

    // == Is Expired ==
    /// An entry is expired once the current time reaches `expires_at`, so a
    /// zero TTL is never served.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    // == Time To Live ==
    /// Remaining lifetime in whole seconds, 0 once expired.
    pub fn ttl_remaining(&self) -> u64 {
        let left = self.expires_at - Utc::now();
        u64::try_from(left.num_seconds()).unwrap_or(0)
    }
}
