//! # Error Handling
//!
//! Error taxonomy for the places proxy. Every operation that can fail returns a
//! [`ProxyResult`], and every failure falls into one of four classes:
//!
//! - **Cache unavailable**: never surfaced. Backend failures are represented by
//!   [`CacheError`](crate::caching::CacheError) and are absorbed by the value
//!   store, which degrades to a cache miss.
//! - **Upstream failed**: [`ProxyError::Upstream`] and
//!   [`ProxyError::InvalidRequest`], produced by the upstream adapter and passed
//!   through the cache layer unchanged.
//! - **Invariant violation**: [`ProxyError::EmptyPayload`] and
//!   [`ProxyError::Internal`], which indicate a defect rather than an external
//!   condition.
//! - **Cancellation**: [`ProxyError::Cancelled`] and
//!   [`ProxyError::DeadlineExceeded`], so callers can decide whether to retry.
//!
//! `ProxyError` is `Clone` because a single loader result is handed to every
//! caller waiting on the same in-flight request.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Result type used throughout the proxy.
pub type ProxyResult<T> = Result<T, ProxyError>;

/// Errors surfaced by the places proxy.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProxyError {
    /// The upstream places provider rejected or failed the call.
    #[error("{operation} failed: {message}")]
    Upstream {
        operation: String,
        status: Option<u16>,
        message: String,
    },

    /// The request was rejected before reaching the upstream provider.
    #[error("invalid request: {field} {reason}")]
    InvalidRequest { field: String, reason: String },

    /// A fetch reported success but produced an empty payload.
    #[error("fetch returned empty result for key {key}")]
    EmptyPayload { key: String },

    /// Internal invariant violation.
    #[error("internal error: {message}")]
    Internal { message: String },

    /// The caller cancelled the request while it was waiting.
    #[error("request cancelled")]
    Cancelled,

    /// The caller's deadline elapsed while it was waiting.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Invalid or missing configuration.
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl ProxyError {
    /// Create an upstream error without an HTTP status.
    pub fn upstream<O: Into<String>, M: Into<String>>(operation: O, message: M) -> Self {
        Self::Upstream {
            operation: operation.into(),
            status: None,
            message: message.into(),
        }
    }

    /// Create an upstream error carrying the provider's HTTP status.
    pub fn upstream_status<O: Into<String>, M: Into<String>>(
        operation: O,
        status: u16,
        message: M,
    ) -> Self {
        Self::Upstream {
            operation: operation.into(),
            status: Some(status),
            message: message.into(),
        }
    }

    /// Create an invalid request error for a missing or malformed field.
    pub fn invalid_request<F: Into<String>, R: Into<String>>(field: F, reason: R) -> Self {
        Self::InvalidRequest {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an internal error with a custom message.
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a configuration error with a custom message.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// True for [`ProxyError::Cancelled`] and [`ProxyError::DeadlineExceeded`].
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }

    /// True for errors that indicate a programming defect.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::EmptyPayload { .. } | Self::Internal { .. })
    }

    /// Stable identifier used in API responses and metric labels.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Upstream { .. } => "upstream_error",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::EmptyPayload { .. } => "empty_payload",
            Self::Internal { .. } => "internal_error",
            Self::Cancelled => "cancelled",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::Configuration { .. } => "configuration_error",
        }
    }

    /// HTTP status code for the service surface.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Upstream { status, .. } => match status {
                Some(400) => StatusCode::BAD_REQUEST,
                Some(403) => StatusCode::FORBIDDEN,
                Some(404) => StatusCode::NOT_FOUND,
                Some(429) => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            // 499: client closed request
            Self::Cancelled => {
                StatusCode::from_u16(499).unwrap_or(StatusCode::SERVICE_UNAVAILABLE)
            }
            Self::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            Self::EmptyPayload { .. } | Self::Internal { .. } | Self::Configuration { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = json!({
            "error": {
                "code": status.as_u16(),
                "message": self.to_string(),
                "type": self.error_type(),
            }
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_display_carries_operation() {
        let err = ProxyError::upstream("search text", "quota exhausted");
        assert_eq!(err.to_string(), "search text failed: quota exhausted");
    }

    #[test]
    fn test_error_classes_are_distinct() {
        assert!(ProxyError::Cancelled.is_cancellation());
        assert!(ProxyError::DeadlineExceeded.is_cancellation());
        assert!(!ProxyError::Cancelled.is_invariant_violation());

        let empty = ProxyError::EmptyPayload { key: "k".into() };
        assert!(empty.is_invariant_violation());
        assert!(!empty.is_cancellation());

        let upstream = ProxyError::upstream("get place", "boom");
        assert!(!upstream.is_cancellation());
        assert!(!upstream.is_invariant_violation());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ProxyError::upstream_status("get place", 404, "not found").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ProxyError::upstream_status("get place", 503, "unavailable").status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ProxyError::invalid_request("name", "is required").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ProxyError::Cancelled.status_code().as_u16(), 499);
        assert_eq!(
            ProxyError::DeadlineExceeded.status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ProxyError::internal("bad").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
