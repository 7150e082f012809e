//! Transport Module
//!
//! The network side of a fetch: the [`Transport`] port and its reqwest
//! implementation.

mod http;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

pub use http::HttpTransport;

// == Transport Port ==
/// Performs the actual request for a cache miss.
///
/// Implementations return the raw body for 2xx, `FetchError::Client` for
/// 4xx and `FetchError::Server` for 5xx. Both carry the status and body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Base URL request paths are resolved against.
    fn base_url(&self) -> String;

    /// Sends `path` with `params` as the query string.
    async fn request(&self, path: &str, params: &[(String, String)]) -> Result<Bytes>;
}

/// Joins a base URL and a relative path with exactly one `/`.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://prod.api.example.com/api/lol/", "/na/v1.2/champion"),
            "https://prod.api.example.com/api/lol/na/v1.2/champion"
        );
        assert_eq!(join_url("http://host", "a/b"), "http://host/a/b");
    }
}
