//! # Places Proxy
//!
//! A caching, request-coalescing proxy in front of the Google Places API.
//!
//! Upstream responses are memoized in a shared Redis/Valkey cache under a
//! canonical request fingerprint, and concurrent identical requests are
//! collapsed so only one upstream call per fingerprint is in flight in a
//! process. The cache fails open: when it is unavailable every request goes
//! straight to the upstream.
//!
//! ## Modules
//! - [`core`]: configuration, call context, error taxonomy
//! - [`caching`]: fingerprints, stores, single-flight, cached fetch
//! - [`places`]: the places client trait, its HTTP adapter and decorators,
//!   and the JSON service surface
//! - [`observability`]: tracing and Prometheus setup

pub mod caching;
pub mod core;
pub mod observability;
pub mod places;

pub use caching::{CachedFetcher, KeyBuilder, ParamValue, RequestParams, SingleFlight, ValueStore};
pub use core::config::ProxyConfig;
pub use core::context::CallContext;
pub use core::error::{ProxyError, ProxyResult};
pub use places::PlacesClient;
