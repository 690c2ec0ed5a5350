//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active polling (active.rs):
//!     Periodic timer
//!     → Probe every registered host concurrently
//!     → Host hysteresis buffer (load_balancer/host.rs)
//!     → Commit after `numRequired` identical results
//!
//! Passive circuit breaker (passive.rs):
//!     Routed request to a host fails
//!     → Host marked unhealthy at once
//!     → One-shot timer restores it after the recovery interval
//! ```
//!
//! # Design Decisions
//! - One `HealthPolicy` trait, chosen at startup; the router is shared
//! - All health mutations go through the registry write lock
//! - Probe and forward failures become state, never caller errors

pub mod active;
pub mod passive;

use crate::load_balancer::SelectionMode;
use crate::resilience::retries::FailureCondition;

pub use active::ActiveHealthPolicy;
pub use passive::PassiveHealthPolicy;

/// Strategy maintaining the `healthy` flag of registered hosts.
pub trait HealthPolicy: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Initial health of hosts registered at runtime.
    fn registration_health(&self) -> bool;

    /// How selection treats a pool without healthy hosts.
    fn selection_mode(&self) -> SelectionMode;

    /// Upstream statuses that fail a forwarding attempt.
    fn failure_condition(&self) -> FailureCondition;

    /// Called by the router after a failed attempt against `address`.
    fn on_attempt_failure(&self, address: &str);
}
