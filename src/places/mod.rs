//! # Places Module
//!
//! The upstream places provider behind a single [`PlacesClient`] trait, with
//! decorators that stack on any implementation:
//!
//! - [`DirectPlacesClient`]: HTTP calls to the Places API
//! - [`CachedPlacesClient`]: read-through cache with request coalescing
//! - [`MeteredPlacesClient`]: request metrics
//!
//! Production wiring is `Metered(Cached(Direct))`.

pub mod cached;
pub mod direct;
pub mod mapper;
pub mod metered;
pub mod service;
pub mod types;

pub use cached::CachedPlacesClient;
pub use direct::DirectPlacesClient;
pub use metered::MeteredPlacesClient;
pub use types::{
    BusinessStatus, GetPlaceRequest, GetRestaurantDetailsRequest, Place, PriceLevel,
    RankPreference, SearchRestaurantsRequest, SearchTextRequest, SearchTextResponse,
};

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::context::CallContext;
use crate::core::error::ProxyResult;

/// Operations offered by the places provider.
#[async_trait]
pub trait PlacesClient: Send + Sync {
    async fn search_text(
        &self,
        ctx: &CallContext,
        req: &SearchTextRequest,
    ) -> ProxyResult<SearchTextResponse>;

    async fn search_restaurants(
        &self,
        ctx: &CallContext,
        req: &SearchRestaurantsRequest,
    ) -> ProxyResult<SearchTextResponse>;

    async fn get_place(&self, ctx: &CallContext, req: &GetPlaceRequest) -> ProxyResult<Place>;

    async fn get_restaurant_details(
        &self,
        ctx: &CallContext,
        req: &GetRestaurantDetailsRequest,
    ) -> ProxyResult<Place>;
}

#[async_trait]
impl<T: PlacesClient + ?Sized> PlacesClient for Arc<T> {
    async fn search_text(
        &self,
        ctx: &CallContext,
        req: &SearchTextRequest,
    ) -> ProxyResult<SearchTextResponse> {
        (**self).search_text(ctx, req).await
    }

    async fn search_restaurants(
        &self,
        ctx: &CallContext,
        req: &SearchRestaurantsRequest,
    ) -> ProxyResult<SearchTextResponse> {
        (**self).search_restaurants(ctx, req).await
    }

    async fn get_place(&self, ctx: &CallContext, req: &GetPlaceRequest) -> ProxyResult<Place> {
        (**self).get_place(ctx, req).await
    }

    async fn get_restaurant_details(
        &self,
        ctx: &CallContext,
        req: &GetRestaurantDetailsRequest,
    ) -> ProxyResult<Place> {
        (**self).get_restaurant_details(ctx, req).await
    }
}
