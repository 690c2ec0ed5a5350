//! Passive health checking (circuit breaker without half-open).
//!
//! # Responsibilities
//! - Mark a host unhealthy the moment a routed attempt to it fails
//! - Restore it after a fixed recovery interval, without re-probing
//!
//! # Design Decisions
//! - Connection errors, timeouts and any 5xx count as failures
//! - Each failure schedules its own one-shot timer; restoring is idempotent
//! - Timers are detached tasks and outlive the request that armed them

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::health::HealthPolicy;
use crate::load_balancer::{registry::HostRegistry, SelectionMode};
use crate::observability::metrics;
use crate::resilience::retries::FailureCondition;

/// Health policy reacting to routing failures only.
pub struct PassiveHealthPolicy {
    registry: Arc<HostRegistry>,
    recovery: Duration,
}

impl PassiveHealthPolicy {
    pub fn new(registry: Arc<HostRegistry>, recovery: Duration) -> Self {
        Self { registry, recovery }
    }

    pub fn recovery(&self) -> Duration {
        self.recovery
    }

    /// Mark `address` unhealthy and arm its recovery timer.
    pub fn trip(&self, address: &str) -> Option<JoinHandle<()>> {
        match self.registry.set_healthy(address, false) {
            None => {
                tracing::debug!(address = %address, "Failure reported for unknown host");
                return None;
            }
            Some(true) => {
                tracing::warn!(address = %address, recovery = ?self.recovery, "Host marked unhealthy");
                metrics::record_health_transition(address, false);
                metrics::record_host_health(address, false);
            }
            Some(false) => {}
        }

        let registry = self.registry.clone();
        let recovery = self.recovery;
        let address = address.to_string();
        Some(tokio::spawn(async move {
            tokio::time::sleep(recovery).await;
            if let Some(true) = registry.set_healthy(&address, true) {
                tracing::info!(address = %address, "Host restored after recovery interval");
                metrics::record_health_transition(&address, true);
                metrics::record_host_health(&address, true);
            }
        }))
    }
}

impl HealthPolicy for PassiveHealthPolicy {
    fn name(&self) -> &'static str {
        "passive"
    }

    fn registration_health(&self) -> bool {
        true
    }

    fn selection_mode(&self) -> SelectionMode {
        SelectionMode::FailClosed
    }

    fn failure_condition(&self) -> FailureCondition {
        FailureCondition::ServerError
    }

    fn on_attempt_failure(&self, address: &str) {
        // detached: the timer must fire even if the request is gone
        let _ = self.trip(address);
    }
}
