//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, timeout, request ID)
//! - Start the active prober alongside the listener
//! - Serve until shutdown is signalled

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::health::active::ActiveHealthPolicy;
use crate::http::handlers;
use crate::http::request::MakeRequestUuidV4;
use crate::lifecycle::startup::{build_app, App, StartupError};
use crate::lifecycle::Shutdown;
use crate::routing::Router as HostRouter;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<HostRouter>,
    /// Set when `POST /routejson` is served.
    pub json_forward_path: Option<String>,
    pub max_body_bytes: usize,
}

/// HTTP server for the host router.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    prober: Option<Arc<ActiveHealthPolicy>>,
    host_router: Arc<HostRouter>,
}

impl HttpServer {
    /// Build the core from configuration and wrap it in a server.
    pub fn new(config: ProxyConfig) -> Result<Self, StartupError> {
        let app = build_app(&config)?;
        Ok(Self::from_app(config, app))
    }

    /// Wrap an already built core.
    pub fn from_app(config: ProxyConfig, app: App) -> Self {
        let state = AppState {
            router: app.router.clone(),
            json_forward_path: app.json_forward_path,
            max_body_bytes: config.listener.max_body_bytes,
        };
        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            prober: app.prober,
            host_router: app.router,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/status", get(handlers::status))
            .route("/hosts", get(handlers::list_hosts))
            .route("/registerhost", post(handlers::register_host))
            .route("/deregisterhost", post(handlers::deregister_host));

        if state.json_forward_path.is_some() {
            router = router.route("/routejson", post(handlers::route_json));
        }

        router
            .fallback(handlers::forward_any)
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(config.listener.request_timeout()))
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// The axum router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn host_router(&self) -> &Arc<HostRouter> {
        &self.host_router
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            policy = self.host_router.policy_name(),
            "HTTP server starting"
        );

        let prober = self.prober.as_ref().map(|policy| policy.spawn(shutdown.subscribe()));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.signalled())
            .await?;

        if let Some(handle) = prober {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Health monitor task ended abnormally");
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HandlerConfig;
    use crate::http::forwarder::mock::{MockForwarder, MockOutcome};
    use crate::lifecycle::startup::build_app_with;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn active_server(forwarder: Arc<MockForwarder>) -> HttpServer {
        let config = ProxyConfig::default();
        let prober = Arc::new(MockForwarder::always(MockOutcome::Respond(StatusCode::OK, "")));
        let app = build_app_with(&config, forwarder, prober).unwrap();
        HttpServer::from_app(config, app)
    }

    fn passive_server(forwarder: Arc<MockForwarder>) -> HttpServer {
        let config = ProxyConfig {
            handler: Some(HandlerConfig {
                host_addresses: vec!["http://host1".into(), "http://host2".into()],
                max_retries: 1,
                ..Default::default()
            }),
            ..Default::default()
        };
        let prober = Arc::new(MockForwarder::always(MockOutcome::Fail));
        let app = build_app_with(&config, forwarder, prober).unwrap();
        HttpServer::from_app(config, app)
    }

    async fn send(server: &HttpServer, request: Request<Body>) -> Response {
        server.router().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1 << 20).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_register_and_deregister() {
        let server = active_server(Arc::new(MockForwarder::always(MockOutcome::Fail)));

        let res = send(&server, post_json("/registerhost", r#"{"HostAddress":"http://localhost:7777"}"#)).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await, json!({"message": "Successful registration"}));

        let res = send(&server, post_json("/registerhost", r#"{"HostAddress":"http://localhost:7777"}"#)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await, json!({"message": "Duplicate host address detected"}));

        let res = send(&server, post_json("/deregisterhost", r#"{"HostAddress":"http://localhost:7777"}"#)).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await, json!({"message": "Successful deregistration"}));

        let res = send(&server, post_json("/deregisterhost", r#"{"HostAddress":"http://localhost:7777"}"#)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await, json!({"message": "Host address not found"}));
    }

    #[tokio::test]
    async fn test_register_bad_payload() {
        let server = active_server(Arc::new(MockForwarder::always(MockOutcome::Fail)));
        let res = send(&server, post_json("/registerhost", "{broken")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await, json!({"message": "bad payload request"}));
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let server = active_server(Arc::new(MockForwarder::always(MockOutcome::Fail)));
        let res = send(&server, Request::get("/status").body(Body::empty()).unwrap()).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key("x-request-id"));

        let body = json_body(res).await;
        assert_eq!(body["status"], "Healthy");
        assert_eq!(body["startedAt"], crate::lifecycle::startup::started_at_rfc1123z());
    }

    #[tokio::test]
    async fn test_fallthrough_with_empty_pool() {
        let server = active_server(Arc::new(MockForwarder::always(MockOutcome::Fail)));
        let res = send(&server, post_json("/anything", "{}")).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(res).await;
        assert!(body["error"].as_str().unwrap().starts_with("no available healthy server"));
    }

    #[tokio::test]
    async fn test_fallthrough_relays_upstream() {
        let forwarder = Arc::new(MockForwarder::always(MockOutcome::Respond(StatusCode::ACCEPTED, "{\"ok\":true}")));
        let server = active_server(forwarder.clone());
        server.host_router().register_host("http://host1").unwrap();

        let request = Request::put("/items/7?x=1")
            .header("x-request-id", "req-42")
            .body(Body::from("payload"))
            .unwrap();
        let res = send(&server, request).await;
        assert_eq!(res.status(), StatusCode::ACCEPTED);
        assert_eq!(res.headers()["x-request-id"], "req-42");
        assert_eq!(json_body(res).await, json!({"ok": true}));

        let sent = &forwarder.requests()[0];
        assert_eq!(sent.path, "/items/7?x=1");
        assert_eq!(&sent.body[..], b"payload");
        assert_eq!(sent.headers["x-request-id"], "req-42");
    }

    #[tokio::test]
    async fn test_fallthrough_retries_exhausted() {
        let forwarder = Arc::new(MockForwarder::always(MockOutcome::Respond(StatusCode::INTERNAL_SERVER_ERROR, "")));
        let server = active_server(forwarder);
        server.host_router().register_host("http://host1").unwrap();

        let res = send(&server, post_json("/anything", "{}")).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(res).await;
        assert!(body["error"].as_str().unwrap().starts_with("server encountered error"));
    }

    #[tokio::test]
    async fn test_routejson_only_in_passive_mode() {
        let forwarder = Arc::new(MockForwarder::always(MockOutcome::Respond(StatusCode::OK, "{\"echo\":1}")));
        let server = passive_server(forwarder.clone());

        let res = send(&server, post_json("/routejson", r#"{"echo":1}"#)).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(json_body(res).await, json!({"echo": 1}));

        let sent = &forwarder.requests()[0];
        assert_eq!(sent.path, "/echojson");
        assert_eq!(sent.method, axum::http::Method::POST);
    }

    #[tokio::test]
    async fn test_routejson_rejects_invalid_json() {
        let forwarder = Arc::new(MockForwarder::always(MockOutcome::Respond(StatusCode::OK, "{}")));
        let server = passive_server(forwarder.clone());

        let res = send(&server, post_json("/routejson", "not json")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await, json!({"error": "payload must be valid json"}));
        assert_eq!(forwarder.call_count(), 0);
    }

    #[tokio::test]
    async fn test_routejson_retries_on_next_host() {
        let forwarder = Arc::new(MockForwarder::always(MockOutcome::Respond(StatusCode::OK, "{\"from\":2}")));
        forwarder.set_for("http://host1", MockOutcome::Respond(StatusCode::INTERNAL_SERVER_ERROR, ""));
        let server = passive_server(forwarder);

        let res = send(&server, post_json("/routejson", "{}")).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await, json!({"from": 2}));

        let res = send(&server, Request::get("/hosts").body(Body::empty()).unwrap()).await;
        assert_eq!(
            json_body(res).await,
            json!([
                {"address": "http://host1", "healthy": false},
                {"address": "http://host2", "healthy": true}
            ])
        );
    }
}
