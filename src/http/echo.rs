//! Echo receiver backend.
//!
//! A minimal upstream for local setups and tests: it reports its status and
//! echoes JSON payloads back.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::http::handlers::{echo_json, status};

/// Routes: `GET /status`, `POST /echojson`.
pub fn echo_router() -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/echojson", post(echo_json))
        .layer(TraceLayer::new_for_http())
}
