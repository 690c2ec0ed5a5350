//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.
//! Keys are camelCase, e.g. `requestHandling.maxRetries`. PascalCase keys
//! (`RequestHandling.MaxRetries`) are accepted as aliases. Unknown keys are
//! rejected.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ProxyConfig {
    /// Listener configuration.
    #[serde(alias = "Listener")]
    pub listener: ListenerConfig,

    /// Selection algorithm name. Only `RoundRobin` is supported.
    #[serde(alias = "RoutingAlgorithm")]
    pub routing_algorithm: String,

    /// Retry and timeout settings for forwarded requests (active variant).
    #[serde(alias = "RequestHandling")]
    pub request_handling: RequestHandlingConfig,

    /// Probe settings (active variant).
    #[serde(alias = "HealthCheck")]
    pub health_check: HealthCheckConfig,

    /// Hosts registered at boot (active variant). These start healthy.
    #[serde(alias = "Hosts")]
    pub hosts: Vec<String>,

    /// Presence selects the passive circuit-breaker variant.
    #[serde(alias = "Handler")]
    pub handler: Option<HandlerConfig>,

    /// Observability settings.
    #[serde(alias = "Observability")]
    pub observability: ObservabilityConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            routing_algorithm: crate::load_balancer::ROUND_ROBIN.to_string(),
            request_handling: RequestHandlingConfig::default(),
            health_check: HealthCheckConfig::default(),
            hosts: Vec::new(),
            handler: None,
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ProxyConfig {
    /// Configuration holding only a passive handler, everything else defaulted.
    pub fn passive(handler: HandlerConfig) -> Self {
        Self {
            handler: Some(handler),
            ..Self::default()
        }
    }

    /// Whether the passive health variant is configured.
    pub fn is_passive(&self) -> bool {
        self.handler.is_some()
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    #[serde(alias = "BindAddress")]
    pub bind_address: String,

    /// Server-side deadline for answering a client.
    #[serde(alias = "RequestTimeoutSeconds")]
    pub request_timeout_seconds: u64,

    /// Largest accepted request or upstream response body.
    #[serde(alias = "MaxBodyBytes")]
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            request_timeout_seconds: 30,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

impl ListenerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Forwarding settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct RequestHandlingConfig {
    /// Retries after the first attempt.
    #[serde(alias = "MaxRetries")]
    pub max_retries: u32,

    /// Per-attempt timeout.
    #[serde(alias = "TimeoutSeconds")]
    pub timeout_seconds: u64,
}

impl Default for RequestHandlingConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            timeout_seconds: 5,
        }
    }
}

/// Active health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct HealthCheckConfig {
    /// Path to probe on each host.
    #[serde(alias = "Path")]
    pub path: String,

    /// Identical consecutive probe results needed for a transition.
    #[serde(alias = "NumRequired")]
    pub num_required: usize,

    /// Time between probe rounds.
    #[serde(alias = "IntervalSeconds")]
    pub interval_seconds: u64,

    /// Per-probe timeout.
    #[serde(alias = "TimeoutSeconds")]
    pub timeout_seconds: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            path: "/status".to_string(),
            num_required: 1,
            interval_seconds: 1,
            timeout_seconds: 1,
        }
    }
}

/// Passive circuit-breaker handler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct HandlerConfig {
    /// Selection algorithm name. Only `RoundRobin` is supported.
    #[serde(alias = "HandlerType")]
    pub handler_type: String,

    /// Hosts routed to. At least one is required.
    #[serde(alias = "HostAddresses")]
    pub host_addresses: Vec<String>,

    /// Retries after the first attempt.
    #[serde(alias = "MaxRetries")]
    pub max_retries: u32,

    /// Per-attempt timeout.
    #[serde(alias = "TimeoutSeconds")]
    pub timeout_seconds: u64,

    /// Delay before a failed host is restored.
    #[serde(alias = "RecoverySeconds")]
    pub recovery_seconds: u64,

    /// Upstream path JSON payloads are posted to.
    #[serde(alias = "ForwardPath")]
    pub forward_path: String,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            handler_type: crate::load_balancer::ROUND_ROBIN.to_string(),
            host_addresses: Vec::new(),
            max_retries: 0,
            timeout_seconds: 5,
            recovery_seconds: 10,
            forward_path: "/echojson".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(alias = "LogLevel")]
    pub log_level: String,

    /// Enable metrics endpoint.
    #[serde(alias = "MetricsEnabled")]
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    #[serde(alias = "MetricsAddress")]
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
