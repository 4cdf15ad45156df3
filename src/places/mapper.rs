//! Conversions between the Places API v1 JSON wire format and the internal
//! payload types.

use serde::{Deserialize, Serialize};

use super::types::{
    Attribution, BusinessStatus, LatLng, LocalizedText, OpeningHours, Photo, Place, PriceLevel,
    RankPreference, SearchRestaurantsRequest, SearchTextRequest, SearchTextResponse,
};

/// Fields requested for restaurant search and restaurant details.
pub const RESTAURANT_DETAIL_FIELDS: &[&str] = &[
    "id",
    "name",
    "display_name",
    "formatted_address",
    "short_formatted_address",
    "rating",
    "business_status",
    "google_maps_uri",
    "website_uri",
    "price_level",
    "user_rating_count",
    "current_opening_hours",
    "dine_in",
    "curbside_pickup",
    "reservable",
    "serves_breakfast",
    "serves_lunch",
    "serves_dinner",
    "serves_beer",
    "serves_wine",
    "serves_brunch",
    "serves_vegetarian_food",
    "outdoor_seating",
    "live_music",
    "menu_for_children",
    "serves_cocktails",
    "serves_dessert",
    "serves_coffee",
    "good_for_children",
    "allows_dogs",
    "restroom",
    "good_for_groups",
    "good_for_watching_sports",
    "takeout",
    "generative_summary",
    "review_summary",
    "editorial_summary",
];

/// Prefix for field mask entries on search responses.
pub const SEARCH_FIELD_PREFIX: &str = "places.";

/// `X-Goog-FieldMask` value: `*` for no fields, otherwise the prefixed
/// fields joined with commas.
pub fn build_field_mask<S: AsRef<str>>(fields: &[S], prefix: &str) -> String {
    if fields.is_empty() {
        return "*".to_string();
    }
    fields
        .iter()
        .map(|field| format!("{}{}", prefix, field.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn business_status_from_upstream(value: &str) -> BusinessStatus {
    match value {
        "OPERATIONAL" => BusinessStatus::Operational,
        "CLOSED_TEMPORARILY" => BusinessStatus::ClosedTemporarily,
        "CLOSED_PERMANENTLY" => BusinessStatus::ClosedPermanently,
        _ => BusinessStatus::Unspecified,
    }
}

/// The provider uses the same names as [`PriceLevel::as_str_name`].
pub fn price_level_from_upstream(value: &str) -> PriceLevel {
    PriceLevel::from_str_name(value).unwrap_or(PriceLevel::Unspecified)
}

pub fn rank_preference_to_upstream(value: RankPreference) -> Option<&'static str> {
    match value {
        RankPreference::Unspecified => None,
        RankPreference::Distance => Some("DISTANCE"),
        RankPreference::Relevance => Some("RELEVANCE"),
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero_f64(value: &f64) -> bool {
    *value == 0.0
}

fn is_zero_i32(value: &i32) -> bool {
    *value == 0
}

/// Request body of `places:searchText`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSearchTextRequest {
    pub text_query: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub language_code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub region_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank_preference: Option<&'static str>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub included_type: String,
    #[serde(skip_serializing_if = "is_false")]
    pub open_now: bool,
    #[serde(skip_serializing_if = "is_zero_f64")]
    pub min_rating: f64,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub max_result_count: i32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub price_levels: Vec<&'static str>,
    #[serde(skip_serializing_if = "is_false")]
    pub strict_type_filtering: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub include_pure_service_area_businesses: bool,
}

impl From<&SearchTextRequest> for WireSearchTextRequest {
    fn from(req: &SearchTextRequest) -> Self {
        Self {
            text_query: req.text_query.clone(),
            language_code: req.language_code.clone(),
            region_code: req.region_code.clone(),
            rank_preference: rank_preference_to_upstream(req.rank_preference),
            included_type: req.included_type.clone(),
            open_now: req.open_now,
            min_rating: req.min_rating,
            max_result_count: req.max_result_count,
            price_levels: req.price_levels.iter().map(PriceLevel::as_str_name).collect(),
            strict_type_filtering: req.strict_type_filtering,
            include_pure_service_area_businesses: req.include_pure_service_area_businesses,
        }
    }
}

impl From<&SearchRestaurantsRequest> for WireSearchTextRequest {
    fn from(req: &SearchRestaurantsRequest) -> Self {
        Self {
            text_query: req.text_query.clone(),
            language_code: req.language_code.clone(),
            region_code: req.region_code.clone(),
            rank_preference: rank_preference_to_upstream(RankPreference::Relevance),
            included_type: "restaurant".to_string(),
            strict_type_filtering: true,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireAuthorAttribution {
    pub display_name: String,
    pub uri: String,
    pub photo_uri: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WirePhoto {
    pub name: String,
    pub width_px: i32,
    pub height_px: i32,
    pub author_attributions: Vec<WireAuthorAttribution>,
}

/// Place resource as returned by the provider. Absent fields decode to
/// their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WirePlace {
    pub name: String,
    pub id: String,
    pub display_name: Option<LocalizedText>,
    pub types: Vec<String>,
    pub primary_type: String,
    pub primary_type_display_name: Option<LocalizedText>,
    pub national_phone_number: String,
    pub international_phone_number: String,
    pub formatted_address: String,
    pub short_formatted_address: String,
    pub location: Option<LatLng>,
    pub rating: f64,
    pub google_maps_uri: String,
    pub website_uri: String,
    pub business_status: String,
    pub price_level: String,
    pub user_rating_count: i32,
    pub utc_offset_minutes: i32,
    pub current_opening_hours: Option<OpeningHours>,
    pub editorial_summary: Option<LocalizedText>,
    pub adr_format_address: String,
    pub icon_mask_base_uri: String,
    pub icon_background_color: String,
    pub photos: Vec<WirePhoto>,
    pub attributions: Vec<Attribution>,
    pub takeout: bool,
    pub delivery: bool,
    pub dine_in: bool,
    pub curbside_pickup: bool,
    pub reservable: bool,
    pub serves_breakfast: bool,
    pub serves_lunch: bool,
    pub serves_dinner: bool,
    pub serves_beer: bool,
    pub serves_wine: bool,
    pub serves_brunch: bool,
    pub serves_vegetarian_food: bool,
    pub outdoor_seating: bool,
    pub live_music: bool,
    pub menu_for_children: bool,
    pub serves_cocktails: bool,
    pub serves_dessert: bool,
    pub serves_coffee: bool,
    pub good_for_children: bool,
    pub allows_dogs: bool,
    pub restroom: bool,
    pub good_for_groups: bool,
    pub good_for_watching_sports: bool,
    pub pure_service_area_business: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireSearchTextResponse {
    pub places: Vec<WirePlace>,
}

impl From<WirePhoto> for Photo {
    fn from(photo: WirePhoto) -> Self {
        Photo {
            name: photo.name,
            width_px: photo.width_px,
            height_px: photo.height_px,
            author_attributions: photo
                .author_attributions
                .into_iter()
                .map(|author| author.uri)
                .collect(),
        }
    }
}

impl From<WirePlace> for Place {
    fn from(wire: WirePlace) -> Self {
        Place {
            name: wire.name,
            id: wire.id,
            display_name: wire.display_name,
            types: wire.types,
            primary_type: wire.primary_type,
            primary_type_display_name: wire.primary_type_display_name,
            national_phone_number: wire.national_phone_number,
            international_phone_number: wire.international_phone_number,
            formatted_address: wire.formatted_address,
            short_formatted_address: wire.short_formatted_address,
            location: wire.location,
            rating: wire.rating,
            google_maps_uri: wire.google_maps_uri,
            website_uri: wire.website_uri,
            business_status: business_status_from_upstream(&wire.business_status) as i32,
            price_level: price_level_from_upstream(&wire.price_level) as i32,
            user_rating_count: wire.user_rating_count,
            utc_offset_minutes: wire.utc_offset_minutes,
            current_opening_hours: wire.current_opening_hours,
            editorial_summary: wire.editorial_summary,
            adr_format_address: wire.adr_format_address,
            icon_mask_base_uri: wire.icon_mask_base_uri,
            icon_background_color: wire.icon_background_color,
            photos: wire.photos.into_iter().map(Photo::from).collect(),
            attributions: wire.attributions,
            takeout: wire.takeout,
            delivery: wire.delivery,
            dine_in: wire.dine_in,
            curbside_pickup: wire.curbside_pickup,
            reservable: wire.reservable,
            serves_breakfast: wire.serves_breakfast,
            serves_lunch: wire.serves_lunch,
            serves_dinner: wire.serves_dinner,
            serves_beer: wire.serves_beer,
            serves_wine: wire.serves_wine,
            serves_brunch: wire.serves_brunch,
            serves_vegetarian_food: wire.serves_vegetarian_food,
            outdoor_seating: wire.outdoor_seating,
            live_music: wire.live_music,
            menu_for_children: wire.menu_for_children,
            serves_cocktails: wire.serves_cocktails,
            serves_dessert: wire.serves_dessert,
            serves_coffee: wire.serves_coffee,
            good_for_children: wire.good_for_children,
            allows_dogs: wire.allows_dogs,
            restroom: wire.restroom,
            good_for_groups: wire.good_for_groups,
            good_for_watching_sports: wire.good_for_watching_sports,
            pure_service_area_business: wire.pure_service_area_business,
        }
    }
}

impl From<WireSearchTextResponse> for SearchTextResponse {
    fn from(wire: WireSearchTextResponse) -> Self {
        SearchTextResponse {
            places: wire.places.into_iter().map(Place::from).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireErrorBody {
    error: WireError,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireError {
    message: String,
    status: String,
}

/// Human-readable message from a provider error body, falling back to the
/// raw body.
pub fn upstream_error_message(body: &str) -> String {
    match serde_json::from_str::<WireErrorBody>(body) {
        Ok(parsed) if !parsed.error.message.is_empty() => {
            if parsed.error.status.is_empty() {
                parsed.error.message
            } else {
                format!("{}: {}", parsed.error.status, parsed.error.message)
            }
        }
        _ => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_field_mask() {
        let none: [&str; 0] = [];
        assert_eq!(build_field_mask(&none, ""), "*");
        assert_eq!(build_field_mask(&none, SEARCH_FIELD_PREFIX), "*");
        assert_eq!(build_field_mask(&["id", "rating"], ""), "id,rating");
        assert_eq!(
            build_field_mask(&["id", "rating"], SEARCH_FIELD_PREFIX),
            "places.id,places.rating"
        );
    }

    #[test]
    fn test_search_body_skips_defaults() {
        let req = SearchTextRequest {
            text_query: "pizza".to_string(),
            open_now: true,
            price_levels: vec![PriceLevel::Inexpensive],
            ..Default::default()
        };
        let body = serde_json::to_value(WireSearchTextRequest::from(&req)).unwrap();
        assert_eq!(
            body,
            json!({
                "textQuery": "pizza",
                "openNow": true,
                "priceLevels": ["PRICE_LEVEL_INEXPENSIVE"],
            })
        );
    }

    #[test]
    fn test_restaurant_search_body_is_fixed() {
        let req = SearchRestaurantsRequest {
            text_query: "sushi".to_string(),
            language_code: "ja".to_string(),
            ..Default::default()
        };
        let body = serde_json::to_value(WireSearchTextRequest::from(&req)).unwrap();
        assert_eq!(body["rankPreference"], "RELEVANCE");
        assert_eq!(body["includedType"], "restaurant");
        assert_eq!(body["strictTypeFiltering"], true);
        assert!(body.get("includePureServiceAreaBusinesses").is_none());
    }

    #[test]
    fn test_place_from_wire() {
        let wire: WirePlace = serde_json::from_value(json!({
            "name": "places/abc",
            "id": "abc",
            "displayName": {"text": "Luigi's", "languageCode": "en"},
            "rating": 4.5,
            "businessStatus": "OPERATIONAL",
            "priceLevel": "PRICE_LEVEL_MODERATE",
            "userRatingCount": 120,
            "dineIn": true,
            "photos": [{"name": "p1", "widthPx": 10, "heightPx": 20,
                        "authorAttributions": [{"displayName": "A", "uri": "https://a"}]}],
            "someNewField": {"ignored": true}
        }))
        .unwrap();

        let place = Place::from(wire);
        assert_eq!(place.id, "abc");
        assert_eq!(place.display_name.as_ref().map(|d| d.text.as_str()), Some("Luigi's"));
        assert_eq!(place.business_status(), BusinessStatus::Operational);
        assert_eq!(place.price_level(), PriceLevel::Moderate);
        assert_eq!(place.user_rating_count, 120);
        assert!(place.dine_in);
        assert!(!place.takeout);
        assert_eq!(place.photos[0].author_attributions, vec!["https://a"]);
    }

    #[test]
    fn test_unknown_enum_strings_map_to_unspecified() {
        assert_eq!(business_status_from_upstream("SOMETHING_NEW"), BusinessStatus::Unspecified);
        assert_eq!(price_level_from_upstream(""), PriceLevel::Unspecified);
    }

    #[test]
    fn test_upstream_error_message() {
        let body = r#"{"error":{"code":400,"message":"Invalid text query","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(upstream_error_message(body), "INVALID_ARGUMENT: Invalid text query");
        assert_eq!(upstream_error_message("bad gateway\n"), "bad gateway");
    }
}
