//! Request ID middleware.
//!
//! # Responsibilities
//! - Assign a UUID v4 to requests arriving without one
//! - Echo the ID on the response for correlation
//!
//! # Design Decisions
//! - An existing `x-request-id` from the caller is preserved
//! - The ID is attached as early as possible so every log line carries it

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Ensure the request carries an ID and echo it on the response.
pub async fn propagate_request_id(mut req: Request, next: Next) -> Response {
    let id = match req.headers().get(X_REQUEST_ID).and_then(|v| v.to_str().ok()) {
        Some(existing) => existing.to_owned(),
        None => Uuid::new_v4().to_string(),
    };
    let value = HeaderValue::from_str(&id).unwrap();
    req.headers_mut().insert(X_REQUEST_ID, value.clone());

    let mut response = next.run(req).await;
    response.headers_mut().insert(X_REQUEST_ID, value);
    response
}
