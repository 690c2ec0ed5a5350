//! HTTP handlers.
//!
//! Thin adapters between axum extractors and the router: decode, delegate,
//! render. No routing decisions are made here.

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;

use crate::http::forwarder::{OutboundRequest, UpstreamResponse};
use crate::http::request::{self, X_REQUEST_ID};
use crate::http::response::{self, ApiError};
use crate::http::server::AppState;
use crate::lifecycle::startup::started_at_rfc1123z;
use crate::observability::metrics;
use crate::routing::RouteError;

/// Body of `/registerhost` and `/deregisterhost`.
#[derive(Debug, Deserialize, Serialize)]
pub struct ModifyHostRequest {
    #[serde(rename = "HostAddress", alias = "hostAddress")]
    pub host_address: String,
}

/// Host as listed by `GET /hosts`.
#[derive(Debug, Serialize)]
pub struct HostStatus {
    pub address: String,
    pub healthy: bool,
}

fn decode_host(body: &[u8]) -> Result<String, ApiError> {
    serde_json::from_slice::<ModifyHostRequest>(body)
        .map(|req| req.host_address)
        .map_err(|_| ApiError::BadPayload)
}

pub async fn register_host(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let address = decode_host(&body)?;
    state.router.register_host(&address)?;
    Ok(response::message(StatusCode::OK, "Successful registration"))
}

pub async fn deregister_host(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let address = decode_host(&body)?;
    state.router.deregister_host(&address)?;
    Ok(response::message(StatusCode::OK, "Successful deregistration"))
}

pub async fn status() -> Json<serde_json::Value> {
    Json(json!({
        "status": "Healthy",
        "startedAt": started_at_rfc1123z(),
    }))
}

pub async fn list_hosts(State(state): State<AppState>) -> Json<Vec<HostStatus>> {
    let hosts = state
        .router
        .registry()
        .snapshot()
        .into_iter()
        .map(|h| HostStatus {
            address: h.address,
            healthy: h.healthy,
        })
        .collect();
    Json(hosts)
}

/// Fallthrough: replay any other request against the pool.
pub async fn forward_any(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read request body");
            return response::message(StatusCode::BAD_REQUEST, response::BAD_PAYLOAD);
        }
    };

    let outbound = request::outbound(parts.method, &parts.uri, &parts.headers, body);
    match route(&state, outbound).await {
        Ok(upstream) => response::relay(upstream, None),
        Err(e) => e.into_response(),
    }
}

/// `POST /routejson`: forward a JSON payload to the configured upstream path.
pub async fn route_json(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    if serde_json::from_slice::<serde::de::IgnoredAny>(&body).is_err() {
        return ApiError::InvalidJson.into_response();
    }

    let path = state
        .json_forward_path
        .clone()
        .unwrap_or_else(|| "/echojson".to_string());
    let mut outbound = OutboundRequest::json(path, body);
    if let Some(id) = headers.get(X_REQUEST_ID) {
        outbound.headers.insert(X_REQUEST_ID, id.clone());
    }

    match route(&state, outbound).await {
        Ok(upstream) => response::relay(upstream, Some(HeaderValue::from_static("application/json"))),
        Err(e) => e.into_response(),
    }
}

/// Run the retry loop on its own task.
///
/// The loop completes even if this handler is dropped, e.g. by the server
/// timeout or a client disconnect.
async fn route(state: &AppState, outbound: OutboundRequest) -> Result<UpstreamResponse, ApiError> {
    let start = Instant::now();
    let request_id = request::request_id(&outbound.headers);
    tracing::debug!(
        request_id = %request_id,
        method = %outbound.method,
        path = %outbound.path,
        "Routing request"
    );

    let router = state.router.clone();
    let result = tokio::spawn(async move { router.forward(outbound).await })
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let outcome = match &result {
        Ok(_) => "forwarded",
        Err(RouteError::NoHealthyTargets) => "no_target",
        Err(RouteError::RetriesExhausted { .. }) => "exhausted",
    };
    metrics::record_request(outcome, start);

    result.map_err(ApiError::from)
}

/// Echo receiver: `POST /echojson` returns a valid JSON body unchanged.
pub async fn echo_json(body: Bytes) -> Response {
    if serde_json::from_slice::<serde::de::IgnoredAny>(&body).is_err() {
        return ApiError::InvalidJson.into_response();
    }
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        Body::from(body),
    )
        .into_response()
}
