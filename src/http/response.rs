//! Response handling and transformation.
//!
//! # Responsibilities
//! - Render registry, payload and routing errors as JSON bodies
//! - Relay buffered upstream responses to the client
//!
//! # Design Decisions
//! - Client input errors are 400, routing failures are 500
//! - Upstream transport errors never reach the client verbatim

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::http::forwarder::UpstreamResponse;
use crate::load_balancer::registry::RegistryError;
use crate::routing::RouteError;

pub const BAD_PAYLOAD: &str = "bad payload request";
pub const INVALID_JSON: &str = "payload must be valid json";

/// `{"message": ...}` body with the given status.
pub fn message(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// Errors surfaced by the HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Register/deregister body could not be decoded.
    BadPayload,
    /// Routed payload is not JSON.
    InvalidJson,
    Registry(RegistryError),
    Route(RouteError),
    /// The routing task died before producing a result.
    Internal(String),
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        ApiError::Registry(e)
    }
}

impl From<RouteError> for ApiError {
    fn from(e: RouteError) -> Self {
        ApiError::Route(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadPayload => message(StatusCode::BAD_REQUEST, BAD_PAYLOAD),
            ApiError::InvalidJson => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": INVALID_JSON }))).into_response()
            }
            ApiError::Registry(e) => message(StatusCode::BAD_REQUEST, &e.to_string()),
            ApiError::Route(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response(),
            ApiError::Internal(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e })),
            )
                .into_response(),
        }
    }
}

/// Relay an upstream response, optionally forcing its content type.
pub fn relay(upstream: UpstreamResponse, content_type: Option<HeaderValue>) -> Response {
    let mut builder = Response::builder().status(upstream.status);
    if let Some(value) = content_type.or(upstream.content_type) {
        builder = builder.header(header::CONTENT_TYPE, value);
    }
    builder
        .body(Body::from(upstream.body))
        .unwrap_or_else(|e| ApiError::Internal(e.to_string()).into_response())
}
