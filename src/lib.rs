//! fetch_memo - A memoizing request coordinator
//!
//! Answers repeated API requests from a cache keyed by request fingerprint,
//! with policy over which outcomes (successes, 4xx, 5xx) may be stored.

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod fingerprint;
pub mod policy;
pub mod tasks;
pub mod transport;

pub use cache::{CachePort, MemoryCache, StoredValue};
pub use config::Config;
pub use coordinator::RequestCoordinator;
pub use error::{CacheError, FetchError, HttpFailure};
pub use fingerprint::{Fingerprint, RequestDescriptor};
pub use policy::Policy;
pub use tasks::spawn_cleanup_task;
pub use transport::{HttpTransport, Transport};
