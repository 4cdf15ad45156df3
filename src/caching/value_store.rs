//! # Value Store
//!
//! Fail-open byte store over a [`CacheStore`] backend. The cache is an
//! optimization: a broken or slow backend degrades every lookup to a miss and
//! every write to a no-op, and never fails the request.

use super::stores::CacheStore;
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Shared handle to a cache backend that never surfaces backend errors.
#[derive(Clone)]
pub struct ValueStore {
    backend: Arc<dyn CacheStore>,
}

impl ValueStore {
    pub fn new(backend: Arc<dyn CacheStore>) -> Self {
        Self { backend }
    }

    /// Stored bytes for `key`. Absent keys, empty values and backend errors
    /// are all reported as a miss.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        match self.backend.get(key).await {
            Ok(Some(value)) if !value.is_empty() => Some(value),
            Ok(_) => None,
            Err(e) => {
                counter!("places_cache_store_errors_total", "op" => "get").increment(1);
                debug!(key, error = %e, "Cache get failed, treating as miss");
                None
            }
        }
    }

    /// Store `value` under `key`. A zero TTL means no expiry. Failures are
    /// logged and dropped.
    pub async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) {
        let ttl = ttl.filter(|ttl| !ttl.is_zero());
        if let Err(e) = self.backend.set(key, value, ttl).await {
            counter!("places_cache_store_errors_total", "op" => "set").increment(1);
            debug!(key, error = %e, "Cache set failed, dropping write");
        }
    }

    /// Backend liveness; errors count as unhealthy.
    pub async fn is_healthy(&self) -> bool {
        self.backend.health_check().await.unwrap_or(false)
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caching::stores::InMemoryStore;
    use crate::caching::{CacheError, CacheResult};
    use async_trait::async_trait;

    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
            Err(CacheError::Timeout)
        }

        async fn set(&self, _key: &str, _value: &[u8], _ttl: Option<Duration>) -> CacheResult<()> {
            Err(CacheError::Store {
                message: "connection refused".to_string(),
            })
        }

        async fn delete(&self, _key: &str) -> CacheResult<bool> {
            Err(CacheError::Timeout)
        }

        async fn health_check(&self) -> CacheResult<bool> {
            Err(CacheError::Timeout)
        }

        fn backend_name(&self) -> &'static str {
            "broken"
        }
    }

    #[tokio::test]
    async fn test_backend_errors_fail_open() {
        let store = ValueStore::new(Arc::new(BrokenStore));

        assert_eq!(store.get("key").await, None);
        store.set("key", b"value", None).await;
        assert!(!store.is_healthy().await);
    }

    #[tokio::test]
    async fn test_empty_value_is_a_miss() {
        let backend = Arc::new(InMemoryStore::new());
        let store = ValueStore::new(backend.clone());

        store.set("key", b"", None).await;
        assert_eq!(store.get("key").await, None);

        store.set("key", b"value", None).await;
        assert_eq!(store.get("key").await, Some(b"value".to_vec()));
        assert!(store.is_healthy().await);
        assert_eq!(store.backend_name(), "memory");
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_means_no_expiry() {
        let store = ValueStore::new(Arc::new(InMemoryStore::new()));
        store.set("key", b"value", Some(Duration::ZERO)).await;

        tokio::time::advance(Duration::from_secs(3600)).await;
        assert_eq!(store.get("key").await, Some(b"value".to_vec()));
    }
}
