//! # Cached Fetch
//!
//! Read-through caching for protobuf payloads. A lookup first tries the value
//! store; a miss enters the single-flight group, where one loader re-checks
//! the store, calls the upstream, and writes the encoded payload back.

use metrics::counter;
use prost::Message;
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::singleflight::SingleFlight;
use super::value_store::ValueStore;
use crate::core::context::CallContext;
use crate::core::error::{ProxyError, ProxyResult};

type AnyPayload = Arc<dyn Any + Send + Sync>;

/// Protobuf payloads the fetcher can cache.
pub trait CachedPayload: Message + Default + Clone + Send + Sync + 'static {
    /// True when a loader returned nothing at all. Such results are an
    /// invariant violation and are never cached.
    fn is_empty_payload(&self) -> bool {
        self.encoded_len() == 0
    }
}

/// Fetch-with-cache orchestrator shared by every cached operation.
#[derive(Clone)]
pub struct CachedFetcher {
    store: ValueStore,
    flights: SingleFlight<AnyPayload>,
    ttl: Option<Duration>,
}

impl CachedFetcher {
    /// `ttl` of `None` stores entries without expiry.
    pub fn new(store: ValueStore, ttl: Option<Duration>) -> Self {
        Self {
            store,
            flights: SingleFlight::new(),
            ttl,
        }
    }

    pub fn store(&self) -> &ValueStore {
        &self.store
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Keys with an upstream load currently running.
    pub fn in_flight(&self) -> usize {
        self.flights.in_flight()
    }

    /// Return the cached payload for `key`, or load it with `fetch_fn`.
    ///
    /// `fetch_fn` runs at most once per key across concurrent callers and
    /// receives a fresh context: a caller that gives up does not cancel the
    /// load the others are waiting on. Upstream errors are returned unchanged
    /// and nothing is cached for them.
    pub async fn fetch<M, F, Fut>(&self, ctx: &CallContext, key: &str, fetch_fn: F) -> ProxyResult<M>
    where
        M: CachedPayload,
        F: FnOnce(CallContext) -> Fut + Send + 'static,
        Fut: Future<Output = ProxyResult<M>> + Send + 'static,
    {
        ctx.check()?;

        if let Some(payload) = lookup::<M>(&self.store, key).await {
            counter!("places_cache_hits_total").increment(1);
            debug!(key, "Cache hit");
            return Ok(payload);
        }
        counter!("places_cache_misses_total").increment(1);
        debug!(key, "Cache miss");

        let store = self.store.clone();
        let ttl = self.ttl;
        let owned_key = key.to_string();
        let loader = async move {
            // Another local caller may have filled the entry since our lookup.
            if let Some(payload) = lookup::<M>(&store, &owned_key).await {
                return Ok(Arc::new(payload) as AnyPayload);
            }

            let payload = fetch_fn(CallContext::new()).await?;
            if payload.is_empty_payload() {
                return Err(ProxyError::EmptyPayload { key: owned_key });
            }

            let bytes = payload.encode_length_delimited_to_vec();
            store.set(&owned_key, &bytes, ttl).await;
            Ok(Arc::new(payload) as AnyPayload)
        };

        let shared = self.flights.run(ctx, key, loader).await?;
        match shared.downcast::<M>() {
            Ok(payload) => Ok(M::clone(&payload)),
            Err(_) => Err(ProxyError::internal("single-flight returned unexpected type")),
        }
    }
}

async fn lookup<M: Message + Default>(store: &ValueStore, key: &str) -> Option<M> {
    let bytes = store.get(key).await?;
    match M::decode_length_delimited(bytes.as_slice()) {
        Ok(payload) => Some(payload),
        Err(e) => {
            debug!(key, error = %e, "Discarding undecodable cache entry");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caching::stores::InMemoryStore;
    use crate::places::types::LocalizedText;
    use std::sync::atomic::{AtomicUsize, Ordering};

    impl CachedPayload for LocalizedText {}

    fn fetcher() -> CachedFetcher {
        CachedFetcher::new(ValueStore::new(Arc::new(InMemoryStore::new())), None)
    }

    fn text(value: &str) -> LocalizedText {
        LocalizedText {
            text: value.to_string(),
            language_code: "en".to_string(),
        }
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let fetcher = fetcher();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let calls = calls.clone();
            let result = fetcher
                .fetch(&CallContext::new(), "k", move |_ctx| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(text("hello"))
                })
                .await;
            assert_eq!(result, Ok(text("hello")));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let fetcher = fetcher();
        fetcher.store().set("k", &[0xff, 0xff, 0xff], None).await;

        let result = fetcher
            .fetch(&CallContext::new(), "k", |_ctx| async { Ok(text("fresh")) })
            .await;
        assert_eq!(result, Ok(text("fresh")));
    }

    #[tokio::test]
    async fn test_empty_payload_is_rejected() {
        let fetcher = fetcher();
        let result = fetcher
            .fetch(&CallContext::new(), "k", |_ctx| async {
                Ok(LocalizedText::default())
            })
            .await;

        assert_eq!(result, Err(ProxyError::EmptyPayload { key: "k".to_string() }));
        assert_eq!(fetcher.store().get("k").await, None);
    }
}
