//! Places API v1 over HTTP.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::mapper::{
    build_field_mask, upstream_error_message, WirePlace, WireSearchTextRequest,
    WireSearchTextResponse, RESTAURANT_DETAIL_FIELDS, SEARCH_FIELD_PREFIX,
};
use super::types::{
    GetPlaceRequest, GetRestaurantDetailsRequest, Place, SearchRestaurantsRequest,
    SearchTextRequest, SearchTextResponse,
};
use super::PlacesClient;
use crate::core::config::UpstreamConfig;
use crate::core::context::CallContext;
use crate::core::error::{ProxyError, ProxyResult};

const API_KEY_HEADER: &str = "X-Goog-Api-Key";
const FIELD_MASK_HEADER: &str = "X-Goog-FieldMask";

/// Uncached client for the provider's REST API.
#[derive(Clone)]
pub struct DirectPlacesClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl DirectPlacesClient {
    pub fn new(config: &UpstreamConfig) -> ProxyResult<Self> {
        Url::parse(&config.base_url)
            .map_err(|e| ProxyError::config(format!("Invalid upstream base URL: {}", e)))?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProxyError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn search(
        &self,
        ctx: &CallContext,
        operation: &'static str,
        body: WireSearchTextRequest,
        field_mask: String,
    ) -> ProxyResult<SearchTextResponse> {
        let request = self
            .http
            .post(format!("{}/v1/places:searchText", self.base_url))
            .header(FIELD_MASK_HEADER, field_mask)
            .json(&body);

        let wire: WireSearchTextResponse = self.execute(ctx, operation, request).await?;
        Ok(wire.into())
    }

    async fn get(
        &self,
        ctx: &CallContext,
        operation: &'static str,
        name: &str,
        query: &[(&str, &str)],
        field_mask: String,
    ) -> ProxyResult<Place> {
        let request = self
            .http
            .get(format!("{}/v1/{}", self.base_url, name))
            .header(FIELD_MASK_HEADER, field_mask)
            .query(query);

        let wire: WirePlace = self.execute(ctx, operation, request).await?;
        Ok(wire.into())
    }

    /// Send with the API key, honoring the caller's context, and decode a 2xx
    /// JSON body.
    async fn execute<T: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        operation: &'static str,
        request: RequestBuilder,
    ) -> ProxyResult<T> {
        ctx.check()?;
        let request = request.header(API_KEY_HEADER, &self.api_key);

        ctx.run(async move {
            let response = request
                .send()
                .await
                .map_err(|e| ProxyError::upstream(operation, e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                debug!(operation, status = status.as_u16(), "Upstream call failed");
                return Err(ProxyError::upstream_status(
                    operation,
                    status.as_u16(),
                    upstream_error_message(&body),
                ));
            }

            response
                .json::<T>()
                .await
                .map_err(|e| ProxyError::upstream(operation, format!("invalid response body: {}", e)))
        })
        .await
    }
}

/// Query parameters of a place lookup; empty values are left out.
fn place_query<'a>(
    language_code: &'a str,
    region_code: &'a str,
    session_token: &'a str,
) -> Vec<(&'static str, &'a str)> {
    [
        ("languageCode", language_code),
        ("regionCode", region_code),
        ("sessionToken", session_token),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .collect()
}

fn require(field: &str, value: &str) -> ProxyResult<()> {
    if value.is_empty() {
        debug!(field, "Rejecting request with missing field");
        return Err(ProxyError::invalid_request(field, "is required"));
    }
    Ok(())
}

/// A resource name goes into the URL path verbatim, so only `places/{id}`
/// with an id of `[A-Za-z0-9_-]` is accepted.
fn require_place_name(name: &str) -> ProxyResult<()> {
    require("name", name)?;
    let valid = name.strip_prefix("places/").is_some_and(|id| {
        !id.is_empty()
            && id
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    });
    if !valid {
        debug!(name, "Rejecting malformed place name");
        return Err(ProxyError::invalid_request("name", "must be of the form places/{id}"));
    }
    Ok(())
}

#[async_trait]
impl PlacesClient for DirectPlacesClient {
    async fn search_text(
        &self,
        ctx: &CallContext,
        req: &SearchTextRequest,
    ) -> ProxyResult<SearchTextResponse> {
        require("text_query", &req.text_query)?;
        let mask = build_field_mask(&req.requested_fields, SEARCH_FIELD_PREFIX);
        self.search(ctx, "search text", req.into(), mask).await
    }

    async fn search_restaurants(
        &self,
        ctx: &CallContext,
        req: &SearchRestaurantsRequest,
    ) -> ProxyResult<SearchTextResponse> {
        require("text_query", &req.text_query)?;
        let mask = build_field_mask(RESTAURANT_DETAIL_FIELDS, SEARCH_FIELD_PREFIX);
        self.search(ctx, "search restaurants", req.into(), mask).await
    }

    async fn get_place(&self, ctx: &CallContext, req: &GetPlaceRequest) -> ProxyResult<Place> {
        require_place_name(&req.name)?;
        let query = place_query(&req.language_code, &req.region_code, &req.session_token);
        self.get(ctx, "get place", &req.name, &query, build_field_mask(&req.requested_fields, ""))
            .await
    }

    async fn get_restaurant_details(
        &self,
        ctx: &CallContext,
        req: &GetRestaurantDetailsRequest,
    ) -> ProxyResult<Place> {
        require_place_name(&req.name)?;
        let query = place_query(&req.language_code, &req.region_code, &req.session_token);
        self.get(ctx, "get place", &req.name, &query, build_field_mask(RESTAURANT_DETAIL_FIELDS, ""))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_names_are_validated() {
        assert!(require_place_name("places/ChIJN1t_tDeuEmsRUsoyG83frY4").is_ok());
        assert!(require_place_name("places/abc-123").is_ok());

        assert_eq!(
            require_place_name(""),
            Err(ProxyError::invalid_request("name", "is required"))
        );
        for name in [
            "abc",
            "places/",
            "places/x?key=other",
            "places/x#frag",
            "places/../admin",
            "../places/x",
            "places/a/b",
            "places/x%2F..",
        ] {
            assert_eq!(
                require_place_name(name),
                Err(ProxyError::invalid_request("name", "must be of the form places/{id}")),
                "{}",
                name
            );
        }
    }
}
