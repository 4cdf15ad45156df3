//! # Request Fingerprints
//!
//! Canonicalizes request parameters into deterministic cache keys.
//!
//! A key has the shape `<prefix><operation>:<sha256 hex>`. The digest covers
//! the sorted `name=value` parts of every specified parameter, each preceded by
//! a `0x00` separator so that `["ab", "c"]` and `["a", "bc"]` never collide.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// Namespace prefix for places responses. Bump the version to invalidate
/// every cached entry after a payload schema change.
pub const DEFAULT_KEY_PREFIX: &str = "gplaces:v1:";

/// Hash an ordered list of parts into a lowercase hex SHA-256 digest.
pub fn hash_key<S: AsRef<str>>(parts: &[S]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update([0u8]);
        hasher.update(part.as_ref().as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// A single request parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    StrList(Vec<String>),
    Float(f64),
    Bool(bool),
    Int(i64),
}

impl ParamValue {
    /// Canonical string form used in the fingerprint.
    pub fn normalize(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::StrList(values) => {
                let mut sorted = values.clone();
                sorted.sort();
                format!("[{}]", sorted.join(","))
            }
            Self::Float(f) => format_float(*f),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
        }
    }

    /// Empty strings and empty lists carry no information and are left out
    /// of the key. `false` and zero are real values.
    pub fn is_unspecified(&self) -> bool {
        match self {
            Self::Str(s) => s.is_empty(),
            Self::StrList(values) => values.is_empty(),
            Self::Float(_) | Self::Bool(_) | Self::Int(_) => false,
        }
    }
}

// f64's Display is already the shortest round-trippable form without an
// exponent; only the non-finite values need a stable spelling.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f == f64::INFINITY {
        "+Inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        f.to_string()
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalize())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        Self::StrList(value)
    }
}

impl From<&[String]> for ParamValue {
    fn from(value: &[String]) -> Self {
        Self::StrList(value.to_vec())
    }
}

impl From<&Vec<String>> for ParamValue {
    fn from(value: &Vec<String>) -> Self {
        Self::StrList(value.clone())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

/// Named request parameters. Iteration is always in name order, so the
/// insertion order of the caller never affects the fingerprint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParams {
    values: BTreeMap<String, Option<ParamValue>>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter that is always present.
    pub fn with<V: Into<ParamValue>>(mut self, name: &str, value: V) -> Self {
        self.insert(name, Some(value.into()));
        self
    }

    /// Add a parameter that may be absent.
    pub fn with_opt<V: Into<ParamValue>>(mut self, name: &str, value: Option<V>) -> Self {
        self.insert(name, value.map(Into::into));
        self
    }

    pub fn insert(&mut self, name: &str, value: Option<ParamValue>) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `name=value` parts for every specified parameter, sorted by name.
    pub fn parts(&self) -> Vec<String> {
        self.values
            .iter()
            .filter_map(|(name, value)| match value {
                Some(value) if !value.is_unspecified() => {
                    Some(format!("{}={}", name, value.normalize()))
                }
                _ => None,
            })
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<ParamValue>)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (K, Option<ParamValue>)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Builds namespaced cache keys.
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    prefix: String,
}

impl Default for KeyBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

impl KeyBuilder {
    pub fn new<S: Into<String>>(prefix: S) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `<prefix><operation>:<hash_key(parts)>`
    pub fn build_key<S: AsRef<str>>(&self, operation: &str, parts: &[S]) -> String {
        format!("{}{}:{}", self.prefix, operation, hash_key(parts))
    }

    /// Key for an operation and its parameter bag.
    pub fn key_for_request(&self, operation: &str, params: &RequestParams) -> String {
        self.build_key(operation, &params.parts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_DIGEST: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn test_hash_key_known_digests() {
        let none: [&str; 0] = [];
        assert_eq!(hash_key(&none), EMPTY_DIGEST);
        assert_eq!(
            hash_key(&["ab", "c"]),
            "9bea7847161086093e12e77d611e1994a25b304ee3209a9b77cf794def614d04"
        );
        assert_eq!(
            hash_key(&["a", "bc"]),
            "6bc4473aafb7f51c4932ceabb77c296e2ec3e200ae593bcd929739db07e7faf7"
        );
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let a = RequestParams::new()
            .with("q", "pizza")
            .with("lang", "en")
            .with("max", 20);
        let b = RequestParams::new()
            .with("max", 20)
            .with("q", "pizza")
            .with("lang", "en");

        let keys = KeyBuilder::default();
        assert_eq!(
            keys.key_for_request("search_text", &a),
            keys.key_for_request("search_text", &b)
        );
    }

    #[test]
    fn test_any_value_change_changes_key() {
        let keys = KeyBuilder::default();
        let base = RequestParams::new().with("q", "pizza").with("lang", "en");
        let changed = RequestParams::new().with("q", "pizza").with("lang", "it");

        assert_ne!(
            keys.key_for_request("search_text", &base),
            keys.key_for_request("search_text", &changed)
        );
        assert_ne!(
            keys.key_for_request("search_text", &base),
            keys.key_for_request("search_restaurants", &base)
        );
    }

    #[test]
    fn test_unspecified_values_are_skipped() {
        let keys = KeyBuilder::default();
        let bare = RequestParams::new().with("q", "pizza");
        let padded = RequestParams::new()
            .with("q", "pizza")
            .with("region", "")
            .with("fields", Vec::<String>::new())
            .with_opt::<String>("lang", None);

        assert_eq!(bare.parts(), padded.parts());
        assert_eq!(
            keys.key_for_request("get", &bare),
            keys.key_for_request("get", &padded)
        );
    }

    #[test]
    fn test_false_and_zero_participate() {
        let parts = RequestParams::new()
            .with("open", false)
            .with("min", 0.0)
            .with("max", 0)
            .parts();
        assert_eq!(parts, vec!["max=0", "min=0", "open=false"]);
    }

    #[test]
    fn test_list_order_does_not_matter() {
        let a = RequestParams::new().with("fields", vec!["b".to_string(), "a".to_string()]);
        let b = RequestParams::new().with("fields", vec!["a".to_string(), "b".to_string()]);
        assert_eq!(a.parts(), vec!["fields=[a,b]"]);
        assert_eq!(a.parts(), b.parts());
    }

    #[test]
    fn test_float_normalization() {
        assert_eq!(ParamValue::Float(1.5).normalize(), "1.5");
        assert_eq!(ParamValue::Float(4.0).normalize(), "4");
        assert_eq!(ParamValue::Float(0.1).normalize(), "0.1");
        assert_eq!(ParamValue::Float(1e21).normalize(), "1000000000000000000000");
        assert_eq!(ParamValue::Float(f64::INFINITY).normalize(), "+Inf");
    }

    #[test]
    fn test_key_shape() {
        let key = KeyBuilder::default().build_key("get", &["name=places/abc"]);
        let digest = key.strip_prefix("gplaces:v1:get:").unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_from_iterator() {
        let params: RequestParams = vec![
            ("q", Some(ParamValue::from("pizza"))),
            ("lang", None),
        ]
        .into_iter()
        .collect();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("q"), Some(&ParamValue::Str("pizza".into())));
        assert_eq!(params.get("lang"), None);
        assert_eq!(params.parts(), vec!["q=pizza"]);
    }
}
