//! Startup orchestration.
//!
//! # Responsibilities
//! - Record the process start time once
//! - Build registry, health policy, balancer, forwarder and router from config
//! - Seed statically configured hosts
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Background tasks are started by the server, not here

use chrono::{DateTime, Local};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use thiserror::Error;

use crate::config::validation::{validate_config, ValidationError};
use crate::config::ProxyConfig;
use crate::health::active::{ActiveHealthPolicy, ProbeSettings};
use crate::health::passive::PassiveHealthPolicy;
use crate::health::HealthPolicy;
use crate::http::forwarder::{HttpForwarder, RequestForwarder};
use crate::load_balancer::{self, registry::HostRegistry, registry::RegistryError};
use crate::observability::metrics;
use crate::routing::Router;

static STARTED_AT: OnceLock<DateTime<Local>> = OnceLock::new();

/// Time the process started serving. Fixed on first call.
pub fn started_at() -> DateTime<Local> {
    *STARTED_AT.get_or_init(Local::now)
}

/// Start time in RFC 1123 form with numeric zone, e.g. `Mon, 02 Jan 2006 15:04:05 -0700`.
pub fn started_at_rfc1123z() -> String {
    started_at().format("%a, %d %b %Y %H:%M:%S %z").to_string()
}

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0:?}")]
    Config(Vec<ValidationError>),

    #[error("unsupported routing algorithm {0}")]
    UnsupportedAlgorithm(String),

    #[error("failed to seed host: {0}")]
    Seed(#[from] RegistryError),
}

/// Wired core, ready to be served.
pub struct App {
    pub router: Arc<Router>,
    /// Prober to start with the server (active variant only).
    pub prober: Option<Arc<ActiveHealthPolicy>>,
    /// Upstream path for `POST /routejson` (passive variant only).
    pub json_forward_path: Option<String>,
}

/// Build the core with HTTP forwarders.
pub fn build_app(config: &ProxyConfig) -> Result<App, StartupError> {
    let max_body = config.listener.max_body_bytes;
    let (request_timeout, probe_timeout) = match &config.handler {
        Some(handler) => (handler.timeout_seconds, config.health_check.timeout_seconds),
        None => (
            config.request_handling.timeout_seconds,
            config.health_check.timeout_seconds,
        ),
    };

    let forwarder = Arc::new(HttpForwarder::new(Duration::from_secs(request_timeout), max_body));
    let prober = Arc::new(HttpForwarder::new(Duration::from_secs(probe_timeout), max_body));
    build_app_with(config, forwarder, prober)
}

/// Register statically configured hosts and publish their health.
fn seed(registry: &HostRegistry, addresses: &[String]) -> Result<(), RegistryError> {
    for address in addresses {
        registry.register_static(address)?;
        metrics::record_host_health(address, true);
    }
    Ok(())
}

/// Build the core around the given forwarders.
///
/// `prober` is only used by the active variant.
pub fn build_app_with(
    config: &ProxyConfig,
    forwarder: Arc<dyn RequestForwarder>,
    prober: Arc<dyn RequestForwarder>,
) -> Result<App, StartupError> {
    validate_config(config).map_err(StartupError::Config)?;

    match &config.handler {
        Some(handler) => {
            let registry = Arc::new(HostRegistry::new(true));
            seed(&registry, &handler.host_addresses)?;

            let policy = Arc::new(PassiveHealthPolicy::new(
                registry.clone(),
                Duration::from_secs(handler.recovery_seconds),
            ));
            let balancer = load_balancer::from_name(&handler.handler_type, policy.selection_mode())
                .ok_or_else(|| StartupError::UnsupportedAlgorithm(handler.handler_type.clone()))?;

            tracing::info!(
                hosts = registry.len(),
                max_retries = handler.max_retries,
                recovery_secs = handler.recovery_seconds,
                "Passive circuit-breaker routing configured"
            );

            let router = Router::new(registry, policy, balancer, forwarder, handler.max_retries);
            Ok(App {
                router: Arc::new(router),
                prober: None,
                json_forward_path: Some(handler.forward_path.clone()),
            })
        }
        None => {
            let registry = Arc::new(HostRegistry::new(false));
            seed(&registry, &config.hosts)?;

            let hc = &config.health_check;
            let settings = ProbeSettings {
                path: hc.path.clone(),
                num_required: hc.num_required,
                interval: Duration::from_secs(hc.interval_seconds),
            };
            let policy = Arc::new(ActiveHealthPolicy::new(registry.clone(), prober, settings));
            let balancer = load_balancer::from_name(&config.routing_algorithm, policy.selection_mode())
                .ok_or_else(|| StartupError::UnsupportedAlgorithm(config.routing_algorithm.clone()))?;

            tracing::info!(
                hosts = registry.len(),
                max_retries = config.request_handling.max_retries,
                "Active polling routing configured"
            );

            let router = Router::new(
                registry,
                policy.clone(),
                balancer,
                forwarder,
                config.request_handling.max_retries,
            );
            Ok(App {
                router: Arc::new(router),
                prober: Some(policy),
                json_forward_path: None,
            })
        }
    }
}
