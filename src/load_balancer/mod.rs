//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Router asks for a target
//!     → registry.rs (eligible view or full snapshot)
//!     → round_robin.rs (rotate with a shared cursor)
//!     → host.rs value handed back to the router
//! ```
//!
//! # Design Decisions
//! - The registry is the only owner of host state
//! - Selection mode follows the health policy (fail-open or fail-closed)
//! - Algorithm chosen by name at startup

use thiserror::Error;

pub mod host;
pub mod registry;
pub mod round_robin;

use crate::load_balancer::{host::Host, registry::HostRegistry, round_robin::RoundRobin};

/// Name accepted for the round-robin algorithm in configuration.
pub const ROUND_ROBIN: &str = "RoundRobin";

/// How selection treats a pool without healthy hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Rotate over healthy hosts, or over the whole pool if none is healthy.
    FailOpen,
    /// Rotate over the whole pool, skipping unhealthy hosts; fail if all are.
    FailClosed,
}

/// Reasons selection can produce no target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no available hosts")]
    NoHosts,

    #[error("no available healthy targets")]
    NoHealthyTargets,
}

/// Strategy picking the next host out of a registry.
pub trait LoadBalancer: Send + Sync + std::fmt::Debug {
    fn next_host(&self, registry: &HostRegistry) -> Result<Host, SelectionError>;
}

/// Build the balancer named in configuration.
///
/// Returns `None` for unsupported algorithms.
pub fn from_name(algorithm: &str, mode: SelectionMode) -> Option<Box<dyn LoadBalancer>> {
    match algorithm {
        ROUND_ROBIN => Some(Box::new(RoundRobin::new(mode))),
        _ => None,
    }
}
