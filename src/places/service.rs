//! # Places Service Endpoints
//!
//! JSON endpoints for the four places operations, named after the RPC methods
//! they serve:
//!
//! - POST /google_maps.v1.GoogleMapsService/SearchText
//! - POST /google_maps.v1.GoogleMapsService/SearchRestaurants
//! - POST /google_maps.v1.GoogleMapsService/GetPlace
//! - POST /google_maps.v1.GoogleMapsService/GetRestaurantDetails
//! - GET /health - liveness plus cache backend status

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::types::{
    GetPlaceRequest, GetRestaurantDetailsRequest, Place, SearchRestaurantsRequest,
    SearchTextRequest, SearchTextResponse,
};
use super::PlacesClient;
use crate::caching::ValueStore;
use crate::core::context::CallContext;
use crate::core::error::ProxyResult;

pub const SERVICE_PATH: &str = "/google_maps.v1.GoogleMapsService";

/// Shared state of the places endpoints
#[derive(Clone)]
pub struct PlacesServiceState {
    client: Arc<dyn PlacesClient>,
    request_timeout: Option<Duration>,
    store: Option<ValueStore>,
}

impl PlacesServiceState {
    pub fn new(client: Arc<dyn PlacesClient>) -> Self {
        Self {
            client,
            request_timeout: None,
            store: None,
        }
    }

    /// Deadline applied to every request.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Cache store reported by the health endpoint.
    pub fn with_store(mut self, store: ValueStore) -> Self {
        self.store = Some(store);
        self
    }

    fn context(&self) -> CallContext {
        match self.request_timeout {
            Some(timeout) => CallContext::with_timeout(timeout),
            None => CallContext::new(),
        }
    }
}

/// Places service router
pub struct PlacesServiceRouter;

impl PlacesServiceRouter {
    pub fn create_router(state: PlacesServiceState) -> Router {
        Router::new()
            .route(&format!("{}/SearchText", SERVICE_PATH), post(search_text))
            .route(&format!("{}/SearchRestaurants", SERVICE_PATH), post(search_restaurants))
            .route(&format!("{}/GetPlace", SERVICE_PATH), post(get_place))
            .route(&format!("{}/GetRestaurantDetails", SERVICE_PATH), post(get_restaurant_details))
            .route("/health", get(health))
            .with_state(state)
    }
}

async fn search_text(
    State(state): State<PlacesServiceState>,
    Json(req): Json<SearchTextRequest>,
) -> ProxyResult<Json<SearchTextResponse>> {
    let ctx = state.context();
    state.client.search_text(&ctx, &req).await.map(Json)
}

async fn search_restaurants(
    State(state): State<PlacesServiceState>,
    Json(req): Json<SearchRestaurantsRequest>,
) -> ProxyResult<Json<SearchTextResponse>> {
    let ctx = state.context();
    state.client.search_restaurants(&ctx, &req).await.map(Json)
}

async fn get_place(
    State(state): State<PlacesServiceState>,
    Json(req): Json<GetPlaceRequest>,
) -> ProxyResult<Json<Place>> {
    let ctx = state.context();
    state.client.get_place(&ctx, &req).await.map(Json)
}

async fn get_restaurant_details(
    State(state): State<PlacesServiceState>,
    Json(req): Json<GetRestaurantDetailsRequest>,
) -> ProxyResult<Json<Place>> {
    let ctx = state.context();
    state.client.get_restaurant_details(&ctx, &req).await.map(Json)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub cache: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_backend: Option<&'static str>,
}

/// Always 200: a down cache degrades latency, not correctness.
async fn health(State(state): State<PlacesServiceState>) -> Json<HealthResponse> {
    let response = match &state.store {
        Some(store) => {
            let up = store.is_healthy().await;
            debug!(backend = store.backend_name(), up, "Cache health probed");
            HealthResponse {
                status: if up { "ok" } else { "degraded" },
                cache: if up { "up" } else { "down" },
                cache_backend: Some(store.backend_name()),
            }
        }
        None => HealthResponse {
            status: "ok",
            cache: "disabled",
            cache_backend: None,
        },
    };
    Json(response)
}
