//! # Caching Module
//!
//! The cached external-API fetch layer. Upstream responses are memoized in a
//! shared key-value store under a canonical request fingerprint, and
//! concurrent identical requests collapse into a single upstream call.
//!
//! ## Architecture
//! 1. **Fingerprint**: canonical parameter bags hashed into cache keys
//! 2. **Stores**: Redis and in-memory backends behind [`CacheStore`]
//! 3. **Value Store**: fail-open byte store over a backend
//! 4. **Single-Flight**: at most one loader per key per process
//! 5. **Cached Fetch**: hit/miss orchestration over protobuf payloads
//!
//! ## Usage Example
//! ```rust,ignore
//! let store = ValueStore::new(Arc::new(InMemoryStore::new()));
//! let fetcher = CachedFetcher::new(store, Some(Duration::from_secs(3600)));
//!
//! let key = KeyBuilder::default().key_for_request("get", &params);
//! let place: Place = fetcher
//!     .fetch(&ctx, &key, |ctx| async move { upstream.get_place(&ctx, &req).await })
//!     .await?;
//! ```

pub mod cached_fetch;
pub mod fingerprint;
pub mod singleflight;
pub mod stores;
pub mod value_store;

pub use cached_fetch::{CachedFetcher, CachedPayload};
pub use fingerprint::{hash_key, KeyBuilder, ParamValue, RequestParams, DEFAULT_KEY_PREFIX};
pub use singleflight::SingleFlight;
pub use stores::{CacheStore, InMemoryStore, RedisStore, RedisStoreConfig};
pub use value_store::ValueStore;

/// Cache operation result
pub type CacheResult<T> = Result<T, CacheError>;

/// Backend errors. These never leave the value store.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache store error: {message}")]
    Store { message: String },

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache configuration error: {message}")]
    Configuration { message: String },

    #[error("Cache operation timeout")]
    Timeout,
}
