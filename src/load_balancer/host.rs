//! Host abstraction.
//!
//! # Responsibilities
//! - Represent a single backend endpoint by its address
//! - Carry the routing health flag
//! - Buffer recent probe results for hysteresis (active polling only)

use serde::Serialize;

/// A single backend endpoint and its health state.
///
/// Hosts live inside a [`HostRegistry`](crate::load_balancer::registry::HostRegistry);
/// everything handed out of the registry is a clone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Host {
    /// Endpoint identifier, e.g. `http://localhost:4001`. Unique per registry.
    pub address: String,
    /// Whether the host currently receives traffic.
    pub healthy: bool,
    /// Run of identical probe results not yet committed.
    #[serde(skip)]
    recent_probe_results: Vec<bool>,
}

impl Host {
    /// Create a new host with the given initial health.
    pub fn new(address: impl Into<String>, healthy: bool) -> Self {
        Self {
            address: address.into(),
            healthy,
            recent_probe_results: Vec::new(),
        }
    }

    /// Probe results buffered since the last commit or reset.
    pub fn recent_probe_results(&self) -> &[bool] {
        &self.recent_probe_results
    }

    /// Feed one probe result through the hysteresis buffer.
    ///
    /// A result that differs from the first buffered one restarts the run.
    /// Once the run reaches `num_required` entries it is committed and the
    /// buffer cleared. Returns the new health flag if it changed.
    pub fn record_probe(&mut self, healthy: bool, num_required: usize) -> Option<bool> {
        if let Some(&first) = self.recent_probe_results.first() {
            if first != healthy {
                self.recent_probe_results.clear();
            }
        }
        self.recent_probe_results.push(healthy);

        if self.recent_probe_results.len() < num_required.max(1) {
            return None;
        }

        let committed = self.recent_probe_results[0];
        self.recent_probe_results.clear();
        if self.healthy == committed {
            return None;
        }
        self.healthy = committed;
        Some(committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flaky_probe_does_not_flip() {
        let mut host = Host::new("http://h1", true);
        assert_eq!(host.record_probe(false, 3), None);
        assert_eq!(host.record_probe(true, 3), None);
        assert!(host.healthy);
        assert_eq!(host.recent_probe_results(), &[true]);
    }

    #[test]
    fn test_run_of_required_length_commits() {
        let mut host = Host::new("http://h1", false);
        assert_eq!(host.record_probe(true, 2), None);
        assert_eq!(host.record_probe(true, 2), Some(true));
        assert!(host.healthy);
        assert!(host.recent_probe_results().is_empty());
    }

    #[test]
    fn test_alternating_noise_never_commits() {
        let mut host = Host::new("http://h1", true);
        for i in 0..20 {
            assert_eq!(host.record_probe(i % 2 == 0, 2), None);
            assert!(host.recent_probe_results().len() <= 2);
        }
        assert!(host.healthy);
    }

    #[test]
    fn test_noise_then_run_commits_once() {
        let mut host = Host::new("http://h1", true);
        host.record_probe(false, 3);
        host.record_probe(true, 3);
        host.record_probe(false, 3);

        // the run restarted at the last `false`, two more complete it
        assert_eq!(host.record_probe(false, 3), None);
        assert_eq!(host.record_probe(false, 3), Some(false));

        // a further run of identical results does not change anything
        for _ in 0..6 {
            assert_eq!(host.record_probe(false, 3), None);
        }
        assert!(!host.healthy);
    }

    #[test]
    fn test_confirming_run_clears_buffer_without_transition() {
        let mut host = Host::new("http://h1", true);
        assert_eq!(host.record_probe(true, 2), None);
        assert_eq!(host.record_probe(true, 2), None);
        assert!(host.recent_probe_results().is_empty());
    }

    #[test]
    fn test_threshold_of_one_commits_immediately() {
        let mut host = Host::new("http://h1", true);
        assert_eq!(host.record_probe(false, 1), Some(false));
        assert_eq!(host.record_probe(true, 1), Some(true));
    }
}
