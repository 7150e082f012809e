//! HTTP transport over reqwest.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::debug;

use crate::config::Config;
use crate::error::{FetchError, HttpFailure, Result};
use crate::transport::{join_url, Transport};

/// Sends GET requests relative to a fixed base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// HTTP client for making requests
    client: Client,
    /// Base URL every path is joined to
    base_url: String,
}

impl HttpTransport {
    /// Creates a transport with the given per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Wraps an existing client, e.g. one shared with other code.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Creates a transport from `BASE_URL` and `REQUEST_TIMEOUT`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout),
        )
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn base_url(&self) -> String {
        self.base_url.clone()
    }

    async fn request(&self, path: &str, params: &[(String, String)]) -> Result<Bytes> {
        let url = join_url(&self.base_url, path);
        let response = self.client.get(&url).query(params).send().await?;

        let status = response.status();
        let body = response.bytes().await?;
        debug!(%url, status = status.as_u16(), bytes = body.len(), "HTTP response");

        if status.is_success() {
            Ok(body)
        } else {
            Err(FetchError::from_failure(HttpFailure::new(
                status.as_u16(),
                body,
            )))
        }
    }
}
