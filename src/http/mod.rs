//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → handlers.rs (decode admin calls, buffer routed requests)
//!     → request.rs (request ID, hop-by-hop stripping)
//!     → routing::Router (pick host, retry)
//!     → forwarder.rs (one attempt against one host)
//!     → response.rs (relay or render error)
//!     → Send to client
//! ```

pub mod echo;
pub mod forwarder;
pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use forwarder::{ForwardError, HttpForwarder, OutboundRequest, RequestForwarder, UpstreamResponse};
pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
