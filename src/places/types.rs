//! Places payloads and requests.
//!
//! Responses are prost messages so they can be cached as length-delimited
//! protobuf; they also carry serde derives for the JSON service surface.
//! Requests are plain serde structs and are never cached themselves.

use serde::{Deserialize, Serialize};

use crate::caching::CachedPayload;

/// Price level of a place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration, Serialize, Deserialize)]
#[repr(i32)]
pub enum PriceLevel {
    #[serde(rename = "PRICE_LEVEL_UNSPECIFIED")]
    Unspecified = 0,
    #[serde(rename = "PRICE_LEVEL_FREE")]
    Free = 1,
    #[serde(rename = "PRICE_LEVEL_INEXPENSIVE")]
    Inexpensive = 2,
    #[serde(rename = "PRICE_LEVEL_MODERATE")]
    Moderate = 3,
    #[serde(rename = "PRICE_LEVEL_EXPENSIVE")]
    Expensive = 4,
    #[serde(rename = "PRICE_LEVEL_VERY_EXPENSIVE")]
    VeryExpensive = 5,
}

impl PriceLevel {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Self::Unspecified => "PRICE_LEVEL_UNSPECIFIED",
            Self::Free => "PRICE_LEVEL_FREE",
            Self::Inexpensive => "PRICE_LEVEL_INEXPENSIVE",
            Self::Moderate => "PRICE_LEVEL_MODERATE",
            Self::Expensive => "PRICE_LEVEL_EXPENSIVE",
            Self::VeryExpensive => "PRICE_LEVEL_VERY_EXPENSIVE",
        }
    }

    pub fn from_str_name(value: &str) -> Option<Self> {
        match value {
            "PRICE_LEVEL_UNSPECIFIED" => Some(Self::Unspecified),
            "PRICE_LEVEL_FREE" => Some(Self::Free),
            "PRICE_LEVEL_INEXPENSIVE" => Some(Self::Inexpensive),
            "PRICE_LEVEL_MODERATE" => Some(Self::Moderate),
            "PRICE_LEVEL_EXPENSIVE" => Some(Self::Expensive),
            "PRICE_LEVEL_VERY_EXPENSIVE" => Some(Self::VeryExpensive),
            _ => None,
        }
    }
}

/// Result ordering for text search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration, Serialize, Deserialize)]
#[repr(i32)]
pub enum RankPreference {
    #[serde(rename = "RANK_PREFERENCE_UNSPECIFIED")]
    Unspecified = 0,
    #[serde(rename = "DISTANCE")]
    Distance = 1,
    #[serde(rename = "RELEVANCE")]
    Relevance = 2,
}

impl RankPreference {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Self::Unspecified => "RANK_PREFERENCE_UNSPECIFIED",
            Self::Distance => "DISTANCE",
            Self::Relevance => "RELEVANCE",
        }
    }

    pub fn from_str_name(value: &str) -> Option<Self> {
        match value {
            "RANK_PREFERENCE_UNSPECIFIED" => Some(Self::Unspecified),
            "DISTANCE" => Some(Self::Distance),
            "RELEVANCE" => Some(Self::Relevance),
            _ => None,
        }
    }
}

/// Operational state of a business.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration, Serialize, Deserialize)]
#[repr(i32)]
pub enum BusinessStatus {
    #[serde(rename = "BUSINESS_STATUS_UNSPECIFIED")]
    Unspecified = 0,
    #[serde(rename = "BUSINESS_STATUS_OPERATIONAL")]
    Operational = 1,
    #[serde(rename = "BUSINESS_STATUS_CLOSED_TEMPORARILY")]
    ClosedTemporarily = 2,
    #[serde(rename = "BUSINESS_STATUS_CLOSED_PERMANENTLY")]
    ClosedPermanently = 3,
}

impl BusinessStatus {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Self::Unspecified => "BUSINESS_STATUS_UNSPECIFIED",
            Self::Operational => "BUSINESS_STATUS_OPERATIONAL",
            Self::ClosedTemporarily => "BUSINESS_STATUS_CLOSED_TEMPORARILY",
            Self::ClosedPermanently => "BUSINESS_STATUS_CLOSED_PERMANENTLY",
        }
    }

    pub fn from_str_name(value: &str) -> Option<Self> {
        match value {
            "BUSINESS_STATUS_UNSPECIFIED" => Some(Self::Unspecified),
            "BUSINESS_STATUS_OPERATIONAL" => Some(Self::Operational),
            "BUSINESS_STATUS_CLOSED_TEMPORARILY" => Some(Self::ClosedTemporarily),
            "BUSINESS_STATUS_CLOSED_PERMANENTLY" => Some(Self::ClosedPermanently),
            _ => None,
        }
    }
}

// Serde adapters that render an `i32` enumeration field by its name.
macro_rules! enum_name_serde {
    ($module:ident, $ty:ty) => {
        pub(crate) mod $module {
            use serde::{Deserialize, Deserializer, Serializer};

            pub fn serialize<S: Serializer>(value: &i32, serializer: S) -> Result<S::Ok, S::Error> {
                let name = <$ty>::try_from(*value)
                    .unwrap_or_default()
                    .as_str_name();
                serializer.serialize_str(name)
            }

            pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
                let name = String::deserialize(deserializer)?;
                Ok(<$ty>::from_str_name(&name).unwrap_or_default() as i32)
            }
        }
    };
}

enum_name_serde!(price_level_name, super::PriceLevel);
enum_name_serde!(business_status_name, super::BusinessStatus);

/// Text with its language.
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocalizedText {
    #[prost(string, tag = "1")]
    pub text: String,
    #[prost(string, tag = "2")]
    pub language_code: String,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct LatLng {
    #[prost(double, tag = "1")]
    pub latitude: f64,
    #[prost(double, tag = "2")]
    pub longitude: f64,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OpeningHours {
    #[prost(bool, tag = "1")]
    pub open_now: bool,
    #[prost(string, repeated, tag = "2")]
    pub weekday_descriptions: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Photo {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(int32, tag = "2")]
    pub width_px: i32,
    #[prost(int32, tag = "3")]
    pub height_px: i32,
    /// Author profile URIs.
    #[prost(string, repeated, tag = "4")]
    pub author_attributions: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Attribution {
    #[prost(string, tag = "1")]
    pub provider: String,
    #[prost(string, tag = "2")]
    pub provider_uri: String,
}

/// A place as returned by get and search operations.
#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Place {
    /// Resource name, `places/{id}`.
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub id: String,
    #[prost(message, optional, tag = "3")]
    pub display_name: Option<LocalizedText>,
    #[prost(string, repeated, tag = "4")]
    pub types: Vec<String>,
    #[prost(string, tag = "5")]
    pub primary_type: String,
    #[prost(message, optional, tag = "6")]
    pub primary_type_display_name: Option<LocalizedText>,
    #[prost(string, tag = "7")]
    pub national_phone_number: String,
    #[prost(string, tag = "8")]
    pub international_phone_number: String,
    #[prost(string, tag = "9")]
    pub formatted_address: String,
    #[prost(string, tag = "10")]
    pub short_formatted_address: String,
    #[prost(message, optional, tag = "11")]
    pub location: Option<LatLng>,
    #[prost(double, tag = "12")]
    pub rating: f64,
    #[prost(string, tag = "13")]
    pub google_maps_uri: String,
    #[prost(string, tag = "14")]
    pub website_uri: String,
    #[prost(enumeration = "BusinessStatus", tag = "15")]
    #[serde(with = "business_status_name")]
    pub business_status: i32,
    #[prost(enumeration = "PriceLevel", tag = "16")]
    #[serde(with = "price_level_name")]
    pub price_level: i32,
    #[prost(int32, tag = "17")]
    pub user_rating_count: i32,
    #[prost(int32, tag = "18")]
    pub utc_offset_minutes: i32,
    #[prost(message, optional, tag = "19")]
    pub current_opening_hours: Option<OpeningHours>,
    #[prost(message, optional, tag = "20")]
    pub editorial_summary: Option<LocalizedText>,
    #[prost(string, tag = "21")]
    pub adr_format_address: String,
    #[prost(string, tag = "22")]
    pub icon_mask_base_uri: String,
    #[prost(string, tag = "23")]
    pub icon_background_color: String,
    #[prost(message, repeated, tag = "24")]
    pub photos: Vec<Photo>,
    #[prost(message, repeated, tag = "25")]
    pub attributions: Vec<Attribution>,

    #[prost(bool, tag = "30")]
    pub takeout: bool,
    #[prost(bool, tag = "31")]
    pub delivery: bool,
    #[prost(bool, tag = "32")]
    pub dine_in: bool,
    #[prost(bool, tag = "33")]
    pub curbside_pickup: bool,
    #[prost(bool, tag = "34")]
    pub reservable: bool,
    #[prost(bool, tag = "35")]
    pub serves_breakfast: bool,
    #[prost(bool, tag = "36")]
    pub serves_lunch: bool,
    #[prost(bool, tag = "37")]
    pub serves_dinner: bool,
    #[prost(bool, tag = "38")]
    pub serves_beer: bool,
    #[prost(bool, tag = "39")]
    pub serves_wine: bool,
    #[prost(bool, tag = "40")]
    pub serves_brunch: bool,
    #[prost(bool, tag = "41")]
    pub serves_vegetarian_food: bool,
    #[prost(bool, tag = "42")]
    pub outdoor_seating: bool,
    #[prost(bool, tag = "43")]
    pub live_music: bool,
    #[prost(bool, tag = "44")]
    pub menu_for_children: bool,
    #[prost(bool, tag = "45")]
    pub serves_cocktails: bool,
    #[prost(bool, tag = "46")]
    pub serves_dessert: bool,
    #[prost(bool, tag = "47")]
    pub serves_coffee: bool,
    #[prost(bool, tag = "48")]
    pub good_for_children: bool,
    #[prost(bool, tag = "49")]
    pub allows_dogs: bool,
    #[prost(bool, tag = "50")]
    pub restroom: bool,
    #[prost(bool, tag = "51")]
    pub good_for_groups: bool,
    #[prost(bool, tag = "52")]
    pub good_for_watching_sports: bool,
    #[prost(bool, tag = "53")]
    pub pure_service_area_business: bool,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchTextResponse {
    #[prost(message, repeated, tag = "1")]
    pub places: Vec<Place>,
}

impl CachedPayload for Place {}

// A search with no matches is a real answer and is cached like any other.
impl CachedPayload for SearchTextResponse {
    fn is_empty_payload(&self) -> bool {
        false
    }
}

/// Free-text place search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchTextRequest {
    pub text_query: String,
    pub language_code: String,
    pub region_code: String,
    pub rank_preference: RankPreference,
    pub included_type: String,
    pub open_now: bool,
    pub min_rating: f64,
    pub max_result_count: i32,
    pub price_levels: Vec<PriceLevel>,
    pub strict_type_filtering: bool,
    pub include_pure_service_area_businesses: bool,
    /// Field mask entries; empty requests every field.
    pub requested_fields: Vec<String>,
}

/// Restaurant search with a fixed type filter and field set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchRestaurantsRequest {
    pub text_query: String,
    pub language_code: String,
    pub region_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetPlaceRequest {
    /// Resource name, `places/{id}`.
    pub name: String,
    pub language_code: String,
    pub region_code: String,
    /// Billing session; never part of the cache key.
    pub session_token: String,
    pub requested_fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GetRestaurantDetailsRequest {
    pub name: String,
    pub language_code: String,
    pub region_code: String,
    pub session_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_enum_names_round_trip() {
        for level in [PriceLevel::Free, PriceLevel::VeryExpensive] {
            assert_eq!(PriceLevel::from_str_name(level.as_str_name()), Some(level));
        }
        assert_eq!(RankPreference::Relevance.as_str_name(), "RELEVANCE");
        assert_eq!(RankPreference::default(), RankPreference::Unspecified);
        assert_eq!(BusinessStatus::from_str_name("OPERATIONAL"), None);
    }

    #[test]
    fn test_place_json_uses_enum_names() {
        let mut place = Place {
            id: "abc".to_string(),
            ..Default::default()
        };
        place.set_price_level(PriceLevel::Moderate);
        place.set_business_status(BusinessStatus::Operational);

        let json = serde_json::to_value(&place).unwrap();
        assert_eq!(json["priceLevel"], "PRICE_LEVEL_MODERATE");
        assert_eq!(json["businessStatus"], "BUSINESS_STATUS_OPERATIONAL");

        let back: Place = serde_json::from_value(json).unwrap();
        assert_eq!(back.price_level(), PriceLevel::Moderate);
    }

    #[test]
    fn test_default_place_encodes_to_nothing() {
        assert_eq!(Place::default().encoded_len(), 0);
        assert_eq!(SearchTextResponse::default().encoded_len(), 0);

        let place = Place {
            dine_in: true,
            ..Default::default()
        };
        assert!(place.encoded_len() > 0);
    }

    #[test]
    fn test_only_an_empty_place_is_an_empty_payload() {
        assert!(Place::default().is_empty_payload());
        assert!(!SearchTextResponse::default().is_empty_payload());
        assert_eq!(
            SearchTextResponse::default().encode_length_delimited_to_vec(),
            vec![0x00]
        );
    }

    #[test]
    fn test_request_json_is_camel_case() {
        let req: SearchTextRequest = serde_json::from_str(
            r#"{"textQuery":"pizza","rankPreference":"DISTANCE","priceLevels":["PRICE_LEVEL_MODERATE"]}"#,
        )
        .unwrap();
        assert_eq!(req.text_query, "pizza");
        assert_eq!(req.rank_preference, RankPreference::Distance);
        assert_eq!(req.price_levels, vec![PriceLevel::Moderate]);
    }
}
