//! Error types for the request coordinator
//!
//! Provides unified error handling using thiserror.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fingerprint::Fingerprint;

// == HTTP Failure ==
/// A non-2xx response: status code and the raw body, kept verbatim so a
/// cached failure re-raises exactly what the server sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpFailure {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: Bytes,
}

impl HttpFailure {
    /// Creates a new HttpFailure
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for statuses in 400..=499.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Returns true for statuses in 500..=599.
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Human-readable reason for the status code.
    pub fn reason(&self) -> &'static str {
        match self.status {
            400 => "Bad request.",
            401 => "Unauthorized.",
            403 => "Forbidden.",
            404 => "Resource not found.",
            429 => "Rate limit exceeded.",
            500 => "Internal server error.",
            502 => "Bad gateway.",
            503 => "Service unavailable.",
            504 => "Gateway timeout.",
            s if (400..500).contains(&s) => "Client error.",
            _ => "Server error.",
        }
    }
}

impl std::fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.reason())
    }
}

// == Cache Error Enum ==
/// Errors raised by a cache port.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key has expired
    #[error("Key expired: {0}")]
    Expired(String),

    /// Value rejected by the store
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Cache is full and eviction failed
    #[error("Cache full: {0}")]
    CacheFull(String),

    /// Backend failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// True when the error only means the entry is gone.
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::NotFound(_) | CacheError::Expired(_))
    }
}

// == Fetch Error Enum ==
/// Everything a fetch through the coordinator can fail with.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The server answered with a 4xx status
    #[error("Client error: {0}")]
    Client(HttpFailure),

    /// The server answered with a 5xx status
    #[error("Server error: {0}")]
    Server(HttpFailure),

    /// Cache-only mode and nothing stored under the fingerprint
    #[error("Not found in cache: {0}")]
    CacheNotFound(Fingerprint),

    /// The server answered with a status outside 2xx/4xx/5xx
    #[error("Unexpected HTTP status {0}")]
    UnexpectedStatus(u16),

    /// Connection, timeout or protocol failure
    #[error("Transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The cache port failed
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl FetchError {
    /// Maps an HTTP failure to its Client/Server kind.
    ///
    /// Statuses outside 4xx/5xx become `UnexpectedStatus`.
    pub fn from_failure(failure: HttpFailure) -> Self {
        if failure.is_client_error() {
            FetchError::Client(failure)
        } else if failure.is_server_error() {
            FetchError::Server(failure)
        } else {
            FetchError::UnexpectedStatus(failure.status)
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Client(f) | FetchError::Server(f) => Some(f.status),
            FetchError::UnexpectedStatus(s) => Some(*s),
            _ => None,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for fetches.
pub type Result<T> = std::result::Result<T, FetchError>;
