//! Configuration Module
//!
//! Loads coordinator, cache and transport settings from environment variables.

use std::env;

/// Runtime configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL request paths are resolved against
    pub base_url: String,
    /// Key appended as `api_key` to every request, if set
    pub api_key: Option<String>,
    /// TTL in seconds used when neither the call nor `remember` gives one
    pub default_ttl: Option<u64>,
    /// Serve only from cache, never hit the network
    pub cache_only: bool,
    /// Store 4xx responses
    pub cache_client_errors: bool,
    /// Store 5xx responses
    pub cache_server_errors: bool,
    /// Maximum number of entries the memory cache can hold
    pub max_entries: usize,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Per-request timeout in seconds
    pub request_timeout: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `BASE_URL` - API base URL (default: http://localhost:8080)
    /// - `API_KEY` - value for the `api_key` parameter (default: unset)
    /// - `DEFAULT_TTL` - default TTL in seconds (default: unset, nothing stored)
    /// - `CACHE_ONLY` - serve from cache only (default: false)
    /// - `CACHE_CLIENT_ERRORS` - cache 4xx responses (default: true)
    /// - `CACHE_SERVER_ERRORS` - cache 5xx responses (default: false)
    /// - `MAX_ENTRIES` - maximum memory cache entries (default: 1000)
    /// - `CLEANUP_INTERVAL` - cleanup frequency in seconds (default: 1)
    /// - `REQUEST_TIMEOUT` - HTTP timeout in seconds (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var("BASE_URL").unwrap_or(defaults.base_url),
            api_key: env::var("API_KEY").ok().filter(|v| !v.is_empty()),
            default_ttl: parse_var("DEFAULT_TTL"),
            cache_only: parse_flag("CACHE_ONLY").unwrap_or(defaults.cache_only),
            cache_client_errors: parse_flag("CACHE_CLIENT_ERRORS")
                .unwrap_or(defaults.cache_client_errors),
            cache_server_errors: parse_flag("CACHE_SERVER_ERRORS")
                .unwrap_or(defaults.cache_server_errors),
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            request_timeout: parse_var("REQUEST_TIMEOUT").unwrap_or(defaults.request_timeout),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_key: None,
            default_ttl: None,
            cache_only: false,
            cache_client_errors: true,
            cache_server_errors: false,
            max_entries: 1000,
            cleanup_interval: 1,
            request_timeout: 10,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Accepts 1/0, true/false, yes/no, on/off.
fn parse_flag(name: &str) -> Option<bool> {
    let value = env::var(name).ok()?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.default_ttl, None);
        assert!(!config.cache_only);
        assert!(config.cache_client_errors);
        assert!(!config.cache_server_errors);
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.request_timeout, 10);
    }

    // One test touches the environment so parallel tests cannot race on it
    #[test]
    fn test_config_from_env() {
        let vars = [
            "BASE_URL",
            "API_KEY",
            "DEFAULT_TTL",
            "CACHE_ONLY",
            "CACHE_CLIENT_ERRORS",
            "CACHE_SERVER_ERRORS",
            "MAX_ENTRIES",
            "CLEANUP_INTERVAL",
            "REQUEST_TIMEOUT",
        ];
        for var in vars {
            env::remove_var(var);
        }
        assert_eq!(Config::from_env(), Config::default());

        env::set_var("DEFAULT_TTL", "60");
        env::set_var("CACHE_ONLY", "yes");
        env::set_var("CACHE_CLIENT_ERRORS", "0");
        env::set_var("CACHE_SERVER_ERRORS", "garbage");
        env::set_var("API_KEY", "key");

        let config = Config::from_env();
        assert_eq!(config.default_ttl, Some(60));
        assert!(config.cache_only);
        assert!(!config.cache_client_errors);
        assert!(!config.cache_server_errors);
        assert_eq!(config.api_key.as_deref(), Some("key"));

        for var in vars {
            env::remove_var(var);
        }
    }
}
