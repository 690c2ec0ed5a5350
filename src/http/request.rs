//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4)
//! - Turn a buffered inbound request into an `OutboundRequest`
//! - Strip hop-by-hop headers before forwarding
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Original request is consumed once; the buffered copy is replayed per attempt

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::forwarder::OutboundRequest;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Headers that describe one connection and must not be forwarded.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Issues a fresh UUID v4 for requests arriving without an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request ID of an inbound request, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Copy of `headers` safe to send upstream.
///
/// Headers named in `Connection` are hop-by-hop as well (RFC 9110 §7.6.1).
/// `Host` and `Content-Length` are dropped too; the client sets both per attempt.
pub fn forwardable_headers(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = headers.clone();
    for name in connection_listed(headers) {
        forwarded.remove(name.as_str());
    }
    for name in HOP_BY_HOP {
        forwarded.remove(name);
    }
    forwarded.remove(header::HOST);
    forwarded.remove(header::CONTENT_LENGTH);
    forwarded
}

fn connection_listed(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Path and query of `uri`, defaulting to `/`.
pub fn path_and_query(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string())
}

/// Build the request replayed against upstream hosts.
pub fn outbound(method: Method, uri: &Uri, headers: &HeaderMap, body: Bytes) -> OutboundRequest {
    OutboundRequest::new(method, path_and_query(uri))
        .with_headers(forwardable_headers(headers))
        .with_body(body)
}
