//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every registered host
//! - Feed results through each host's hysteresis buffer
//! - Commit health transitions under the registry write lock

use axum::http::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::health::HealthPolicy;
use crate::http::forwarder::{OutboundRequest, RequestForwarder};
use crate::load_balancer::{registry::HostRegistry, SelectionMode};
use crate::observability::metrics;
use crate::resilience::retries::FailureCondition;

/// Probe settings, resolved from configuration.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    /// Path requested on every host, e.g. `/status`.
    pub path: String,
    /// Identical consecutive results needed to commit a transition.
    pub num_required: usize,
    /// Time between probe rounds.
    pub interval: Duration,
}

/// Health policy driven by a background prober.
pub struct ActiveHealthPolicy {
    registry: Arc<HostRegistry>,
    prober: Arc<dyn RequestForwarder>,
    settings: ProbeSettings,
}

impl ActiveHealthPolicy {
    /// `prober` carries the health-check timeout.
    pub fn new(
        registry: Arc<HostRegistry>,
        prober: Arc<dyn RequestForwarder>,
        settings: ProbeSettings,
    ) -> Self {
        Self {
            registry,
            prober,
            settings,
        }
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    /// Start the probe loop on the runtime.
    pub fn spawn(self: &Arc<Self>, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        let policy = self.clone();
        tokio::spawn(async move { policy.run(shutdown).await })
    }

    /// Probe loop. The first round fires one interval after start.
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval = ?self.settings.interval,
            path = %self.settings.path,
            num_required = self.settings.num_required,
            "Health monitor starting"
        );

        let period = self.settings.interval;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // rounds overlap freely; a slow probe never delays the next tick
                    drop(self.probe_all());
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Launch one independent probe per registered host.
    pub fn probe_all(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        self.registry
            .addresses()
            .into_iter()
            .map(|address| {
                let policy = self.clone();
                tokio::spawn(async move {
                    let healthy = policy.probe(&address).await;
                    policy.record(&address, healthy);
                })
            })
            .collect()
    }

    /// Probe one host. Only a `200 OK` counts as healthy.
    pub async fn probe(&self, address: &str) -> bool {
        let request = OutboundRequest::get(self.settings.path.clone());
        match self.prober.forward(address, request).await {
            Ok(response) if response.status == StatusCode::OK => true,
            Ok(response) => {
                tracing::warn!(address = %address, status = %response.status, "Health check failed: non-200 status");
                false
            }
            Err(e) => {
                tracing::warn!(address = %address, error = %e, "Health check failed");
                false
            }
        }
    }

    /// Apply a probe result. Hosts deregistered meanwhile are ignored.
    pub fn record(&self, address: &str, healthy: bool) {
        let num_required = self.settings.num_required;
        let transition = self
            .registry
            .update(address, |host| host.record_probe(healthy, num_required));

        match transition {
            Some(Some(now_healthy)) => {
                tracing::info!(address = %address, healthy = now_healthy, "Host health changed");
                metrics::record_health_transition(address, now_healthy);
                metrics::record_host_health(address, now_healthy);
            }
            Some(None) => {}
            None => {
                tracing::debug!(address = %address, "Probe result for deregistered host dropped");
            }
        }
    }
}

impl HealthPolicy for ActiveHealthPolicy {
    fn name(&self) -> &'static str {
        "active"
    }

    fn registration_health(&self) -> bool {
        false
    }

    fn selection_mode(&self) -> SelectionMode {
        SelectionMode::FailOpen
    }

    fn failure_condition(&self) -> FailureCondition {
        FailureCondition::InternalServerError
    }

    fn on_attempt_failure(&self, address: &str) {
        // health is owned by the prober
        tracing::debug!(address = %address, "Attempt failed, awaiting next probe");
    }
}
