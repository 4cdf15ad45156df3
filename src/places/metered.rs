//! Request metrics decorator for any [`PlacesClient`].

use async_trait::async_trait;
use metrics::{counter, gauge, histogram};
use std::future::Future;
use std::time::Instant;

use super::types::{
    GetPlaceRequest, GetRestaurantDetailsRequest, Place, SearchRestaurantsRequest,
    SearchTextRequest, SearchTextResponse,
};
use super::PlacesClient;
use crate::core::context::CallContext;
use crate::core::error::ProxyResult;

/// Records count, latency and in-flight requests per method. Results pass
/// through unchanged.
pub struct MeteredPlacesClient<C> {
    inner: C,
}

impl<C: PlacesClient> MeteredPlacesClient<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

/// Keeps the in-flight gauge balanced when a request future is dropped early.
struct InFlight {
    method: &'static str,
}

impl InFlight {
    fn enter(method: &'static str) -> Self {
        gauge!("places_rpc_inflight_requests", "method" => method).increment(1.0);
        Self { method }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        gauge!("places_rpc_inflight_requests", "method" => self.method).decrement(1.0);
    }
}

async fn observe<T, F>(method: &'static str, call: F) -> ProxyResult<T>
where
    F: Future<Output = ProxyResult<T>>,
{
    let _in_flight = InFlight::enter(method);
    let started = Instant::now();

    let result = call.await;

    let status = match &result {
        Ok(_) => "ok",
        Err(e) => e.error_type(),
    };
    counter!("places_rpc_requests_total", "method" => method, "status" => status).increment(1);
    histogram!("places_rpc_request_duration_seconds", "method" => method)
        .record(started.elapsed().as_secs_f64());
    result
}

#[async_trait]
impl<C: PlacesClient> PlacesClient for MeteredPlacesClient<C> {
    async fn search_text(
        &self,
        ctx: &CallContext,
        req: &SearchTextRequest,
    ) -> ProxyResult<SearchTextResponse> {
        observe("SearchText", self.inner.search_text(ctx, req)).await
    }

    async fn search_restaurants(
        &self,
        ctx: &CallContext,
        req: &SearchRestaurantsRequest,
    ) -> ProxyResult<SearchTextResponse> {
        observe("SearchRestaurants", self.inner.search_restaurants(ctx, req)).await
    }

    async fn get_place(&self, ctx: &CallContext, req: &GetPlaceRequest) -> ProxyResult<Place> {
        observe("GetPlace", self.inner.get_place(ctx, req)).await
    }

    async fn get_restaurant_details(
        &self,
        ctx: &CallContext,
        req: &GetRestaurantDetailsRequest,
    ) -> ProxyResult<Place> {
        observe("GetRestaurantDetails", self.inner.get_restaurant_details(ctx, req)).await
    }
}
