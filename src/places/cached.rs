//! Read-through caching decorator for any [`PlacesClient`].

use async_trait::async_trait;
use std::sync::Arc;

use super::types::{
    GetPlaceRequest, GetRestaurantDetailsRequest, Place, SearchRestaurantsRequest,
    SearchTextRequest, SearchTextResponse,
};
use super::PlacesClient;
use crate::caching::{CachedFetcher, KeyBuilder, RequestParams};
use crate::core::context::CallContext;
use crate::core::error::ProxyResult;

/// Caches every operation of the wrapped client under a request fingerprint.
/// Session tokens never take part in a key.
pub struct CachedPlacesClient<C> {
    inner: Arc<C>,
    fetcher: CachedFetcher,
    keys: KeyBuilder,
}

impl<C> CachedPlacesClient<C>
where
    C: PlacesClient + 'static,
{
    pub fn new(inner: C, fetcher: CachedFetcher) -> Self {
        Self {
            inner: Arc::new(inner),
            fetcher,
            keys: KeyBuilder::default(),
        }
    }

    pub fn with_key_builder(mut self, keys: KeyBuilder) -> Self {
        self.keys = keys;
        self
    }

    pub fn fetcher(&self) -> &CachedFetcher {
        &self.fetcher
    }

    pub fn key_get_place(&self, req: &GetPlaceRequest) -> String {
        let params = RequestParams::new()
            .with("name", &req.name)
            .with("lang", &req.language_code)
            .with("region", &req.region_code)
            .with("fields", &req.requested_fields);
        self.keys.key_for_request("get", &params)
    }

    pub fn key_get_restaurant_details(&self, req: &GetRestaurantDetailsRequest) -> String {
        let params = RequestParams::new()
            .with("name", &req.name)
            .with("lang", &req.language_code)
            .with("region", &req.region_code);
        self.keys.key_for_request("get_restaurant", &params)
    }

    pub fn key_search_text(&self, req: &SearchTextRequest) -> String {
        let prices: Vec<String> = req
            .price_levels
            .iter()
            .map(|level| (*level as i32).to_string())
            .collect();

        let params = RequestParams::new()
            .with("q", &req.text_query)
            .with("lang", &req.language_code)
            .with("region", &req.region_code)
            .with("rank", req.rank_preference.as_str_name())
            .with("type", &req.included_type)
            .with("open", req.open_now)
            .with("min", req.min_rating)
            .with("max", req.max_result_count)
            .with("prices", prices)
            .with("strict", req.strict_type_filtering)
            .with("pure", req.include_pure_service_area_businesses)
            .with("fields", &req.requested_fields);
        self.keys.key_for_request("search_text", &params)
    }

    pub fn key_search_restaurants(&self, req: &SearchRestaurantsRequest) -> String {
        let params = RequestParams::new()
            .with("q", &req.text_query)
            .with("lang", &req.language_code)
            .with("region", &req.region_code);
        self.keys.key_for_request("search_restaurants", &params)
    }
}

#[async_trait]
impl<C> PlacesClient for CachedPlacesClient<C>
where
    C: PlacesClient + 'static,
{
    async fn search_text(
        &self,
        ctx: &CallContext,
        req: &SearchTextRequest,
    ) -> ProxyResult<SearchTextResponse> {
        let key = self.key_search_text(req);
        let inner = Arc::clone(&self.inner);
        let req = req.clone();
        self.fetcher
            .fetch(ctx, &key, move |ctx| async move { inner.search_text(&ctx, &req).await })
            .await
    }

    async fn search_restaurants(
        &self,
        ctx: &CallContext,
        req: &SearchRestaurantsRequest,
    ) -> ProxyResult<SearchTextResponse> {
        let key = self.key_search_restaurants(req);
        let inner = Arc::clone(&self.inner);
        let req = req.clone();
        self.fetcher
            .fetch(ctx, &key, move |ctx| async move {
                inner.search_restaurants(&ctx, &req).await
            })
            .await
    }

    async fn get_place(&self, ctx: &CallContext, req: &GetPlaceRequest) -> ProxyResult<Place> {
        let key = self.key_get_place(req);
        let inner = Arc::clone(&self.inner);
        let req = req.clone();
        self.fetcher
            .fetch(ctx, &key, move |ctx| async move { inner.get_place(&ctx, &req).await })
            .await
    }

    async fn get_restaurant_details(
        &self,
        ctx: &CallContext,
        req: &GetRestaurantDetailsRequest,
    ) -> ProxyResult<Place> {
        let key = self.key_get_restaurant_details(req);
        let inner = Arc::clone(&self.inner);
        let req = req.clone();
        self.fetcher
            .fetch(ctx, &key, move |ctx| async move {
                inner.get_restaurant_details(&ctx, &req).await
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caching::{InMemoryStore, ValueStore};
    use crate::core::error::ProxyError;
    use crate::places::types::{PriceLevel, RankPreference};

    struct Unreachable;

    #[async_trait]
    impl PlacesClient for Unreachable {
        async fn search_text(
            &self,
            _ctx: &CallContext,
            _req: &SearchTextRequest,
        ) -> ProxyResult<SearchTextResponse> {
            Err(ProxyError::upstream("search text", "unreachable"))
        }

        async fn search_restaurants(
            &self,
            _ctx: &CallContext,
            _req: &SearchRestaurantsRequest,
        ) -> ProxyResult<SearchTextResponse> {
            Err(ProxyError::upstream("search restaurants", "unreachable"))
        }

        async fn get_place(&self, _ctx: &CallContext, _req: &GetPlaceRequest) -> ProxyResult<Place> {
            Err(ProxyError::upstream("get place", "unreachable"))
        }

        async fn get_restaurant_details(
            &self,
            _ctx: &CallContext,
            _req: &GetRestaurantDetailsRequest,
        ) -> ProxyResult<Place> {
            Err(ProxyError::upstream("get place", "unreachable"))
        }
    }

    fn client() -> CachedPlacesClient<Unreachable> {
        let store = ValueStore::new(Arc::new(InMemoryStore::new()));
        CachedPlacesClient::new(Unreachable, CachedFetcher::new(store, None))
    }

    #[test]
    fn test_session_token_is_not_part_of_key() {
        let client = client();
        let a = GetPlaceRequest {
            name: "places/abc".into(),
            session_token: "one".into(),
            ..Default::default()
        };
        let b = GetPlaceRequest {
            session_token: "two".into(),
            ..a.clone()
        };
        assert_eq!(client.key_get_place(&a), client.key_get_place(&b));

        let details = GetRestaurantDetailsRequest {
            name: "places/abc".into(),
            session_token: "three".into(),
            ..Default::default()
        };
        assert_eq!(
            client.key_get_restaurant_details(&details),
            client.key_get_restaurant_details(&GetRestaurantDetailsRequest {
                session_token: String::new(),
                ..details.clone()
            })
        );
    }

    #[test]
    fn test_field_and_price_order_do_not_matter() {
        let client = client();
        let a = SearchTextRequest {
            text_query: "pizza".into(),
            price_levels: vec![PriceLevel::Expensive, PriceLevel::Inexpensive],
            requested_fields: vec!["rating".into(), "id".into()],
            ..Default::default()
        };
        let b = SearchTextRequest {
            price_levels: vec![PriceLevel::Inexpensive, PriceLevel::Expensive],
            requested_fields: vec!["id".into(), "rating".into()],
            ..a.clone()
        };
        assert_eq!(client.key_search_text(&a), client.key_search_text(&b));
    }

    #[test]
    fn test_search_text_key_tracks_every_filter() {
        let client = client();
        let base = SearchTextRequest {
            text_query: "pizza".into(),
            ..Default::default()
        };
        let variants = [
            SearchTextRequest { rank_preference: RankPreference::Distance, ..base.clone() },
            SearchTextRequest { open_now: true, ..base.clone() },
            SearchTextRequest { min_rating: 4.5, ..base.clone() },
            SearchTextRequest { max_result_count: 5, ..base.clone() },
            SearchTextRequest { strict_type_filtering: true, ..base.clone() },
            SearchTextRequest { include_pure_service_area_businesses: true, ..base.clone() },
            SearchTextRequest { included_type: "cafe".into(), ..base.clone() },
        ];

        let base_key = client.key_search_text(&base);
        for variant in &variants {
            assert_ne!(client.key_search_text(variant), base_key);
        }
    }

    #[test]
    fn test_operations_use_distinct_namespaces() {
        let client = client().with_key_builder(KeyBuilder::new("test:"));
        let key = client.key_search_restaurants(&SearchRestaurantsRequest {
            text_query: "pizza".into(),
            ..Default::default()
        });
        assert!(key.starts_with("test:search_restaurants:"));

        let key = client.key_get_restaurant_details(&GetRestaurantDetailsRequest {
            name: "places/abc".into(),
            ..Default::default()
        });
        assert!(key.starts_with("test:get_restaurant:"));
    }

    #[tokio::test]
    async fn test_upstream_errors_pass_through_unchanged() {
        let client = client();
        let err = client
            .get_place(
                &CallContext::new(),
                &GetPlaceRequest {
                    name: "places/abc".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err, ProxyError::upstream("get place", "unreachable"));
    }
}
