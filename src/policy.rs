//! Caching policy toggles read at the start of every fetch.

use crate::config::Config;

/// Which outcomes a coordinator may serve from or write to its cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// Fail on a miss instead of calling the transport
    pub cache_only: bool,
    /// Store 4xx responses
    pub cache_client_errors: bool,
    /// Store 5xx responses
    pub cache_server_errors: bool,
    /// TTL used when neither the call nor `remember` supplies one
    pub default_ttl: Option<u64>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            cache_only: false,
            cache_client_errors: true,
            cache_server_errors: false,
            default_ttl: None,
        }
    }
}

impl Policy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            cache_only: config.cache_only,
            cache_client_errors: config.cache_client_errors,
            cache_server_errors: config.cache_server_errors,
            default_ttl: config.default_ttl,
        }
    }

    /// Whether a failed fetch with this status may be stored.
    pub fn caches_status(&self, status: u16) -> bool {
        match status {
            400..=499 => self.cache_client_errors,
            500..=599 => self.cache_server_errors,
            _ => false,
        }
    }
}
