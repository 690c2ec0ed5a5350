//! Host router library: a registry of upstream hosts, health policies and a
//! round-robin router with retries, served over HTTP.

pub mod config;
pub mod http;
pub mod routing;
pub mod health;
pub mod load_balancer;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
