//! Relay error taxonomy and HTTP mapping.
//!
//! # Responsibilities
//! - Classify every relay failure (input, upstream, transport, deadline)
//! - Map each failure to a status code and a JSON error envelope
//!
//! # Design Decisions
//! - Upstream non-success statuses are forwarded as-is with a message
//! - Callers always receive `{"error": "<message>"}`, never a stack trace

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Failures the relay can surface to the caller.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The inbound request did not carry a target URL.
    #[error("URL parameter is required")]
    MissingUrl,

    /// The upstream answered with a non-success, non-redirect status.
    #[error("Failed to fetch PDF: HTTP {0}")]
    UpstreamStatus(u16),

    /// The initial outbound request failed at the transport level.
    #[error("Failed to fetch PDF")]
    Fetch(#[source] reqwest::Error),

    /// The manual redirect follow failed, either at the transport level or
    /// because the redirect carried no usable `Location`.
    #[error("Failed to fetch PDF from redirect")]
    RedirectFetch(#[source] Option<reqwest::Error>),

    /// An outbound attempt exceeded its deadline.
    #[error("Request timeout")]
    Timeout,

    /// A fault during synchronous setup, before any outbound request.
    #[error("Internal server error")]
    Internal,
}

impl RelayError {
    /// The status code written to the inbound response.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingUrl => StatusCode::BAD_REQUEST,
            RelayError::UpstreamStatus(code) => {
                StatusCode::from_u16(*code).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            RelayError::Fetch(_) | RelayError::RedirectFetch(_) | RelayError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RelayError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Label used for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            RelayError::MissingUrl => "missing_url",
            RelayError::UpstreamStatus(_) => "upstream_error",
            RelayError::Fetch(_) => "fetch_error",
            RelayError::RedirectFetch(_) => "redirect_fetch_error",
            RelayError::Timeout => "timeout",
            RelayError::Internal => "internal_error",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
