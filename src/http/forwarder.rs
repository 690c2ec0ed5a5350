//! Downstream HTTP client abstraction.
//!
//! # Responsibilities
//! - Send one outbound request to a chosen host
//! - Return the buffered upstream response or a transport error
//! - Apply the per-call timeout
//!
//! # Design Decisions
//! - The router and the active prober only see the `RequestForwarder` trait
//! - Requests are plain values; each attempt builds a fresh hyper request
//! - Responses are buffered so they can be inspected before being returned

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::time::Duration;
use thiserror::Error;

use crate::resilience::timeouts::with_timeout;

/// Errors produced while talking to an upstream host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForwardError {
    /// Address and path do not form a usable URI.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// Connection, protocol or body read failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// No response within the configured deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Request to replay against a host.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    /// Path and query appended to the host address.
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl OutboundRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Body-less GET, as used by health probes.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// JSON POST.
    pub fn json(path: impl Into<String>, body: Bytes) -> Self {
        let mut request = Self::new(Method::POST, path);
        request
            .headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        request.body = body;
        request
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }
}

/// Buffered upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

/// Capability to send a request to a host.
#[async_trait]
pub trait RequestForwarder: Send + Sync {
    async fn forward(
        &self,
        address: &str,
        request: OutboundRequest,
    ) -> Result<UpstreamResponse, ForwardError>;
}

/// Join a host address and a request path into an absolute URI.
pub fn target_uri(address: &str, path: &str) -> Result<Uri, ForwardError> {
    let base = address.trim_end_matches('/');
    let joined = if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    };

    let uri: Uri = joined
        .parse()
        .map_err(|e| ForwardError::InvalidTarget(format!("{}: {}", joined, e)))?;
    if uri.scheme().is_none() || uri.authority().is_none() {
        return Err(ForwardError::InvalidTarget(format!("{}: not an absolute URI", joined)));
    }
    Ok(uri)
}

/// `RequestForwarder` over hyper's pooled HTTP/1.1 client.
#[derive(Clone)]
pub struct HttpForwarder {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
    max_body_bytes: usize,
}

impl HttpForwarder {
    pub fn new(timeout: Duration, max_body_bytes: usize) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            timeout,
            max_body_bytes,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl RequestForwarder for HttpForwarder {
    async fn forward(
        &self,
        address: &str,
        request: OutboundRequest,
    ) -> Result<UpstreamResponse, ForwardError> {
        let uri = target_uri(address, &request.path)?;

        let mut builder = Request::builder().method(request.method).uri(uri);
        if let Some(headers) = builder.headers_mut() {
            headers.extend(request.headers);
        }
        let outbound = builder
            .body(Body::from(request.body))
            .map_err(|e| ForwardError::InvalidTarget(e.to_string()))?;

        tracing::debug!(address = %address, uri = %outbound.uri(), "Forwarding request");

        with_timeout(self.timeout, async {
            let response = self
                .client
                .request(outbound)
                .await
                .map_err(|e| ForwardError::Transport(e.to_string()))?;

            let (parts, body) = response.into_parts();
            let body = axum::body::to_bytes(Body::new(body), self.max_body_bytes)
                .await
                .map_err(|e| ForwardError::Transport(e.to_string()))?;

            Ok(UpstreamResponse {
                status: parts.status,
                content_type: parts.headers.get(header::CONTENT_TYPE).cloned(),
                body,
            })
        })
        .await
    }
}
