//! Round-robin load balancing strategy.

use std::sync::Mutex;

use crate::load_balancer::{
    host::Host, registry::HostRegistry, LoadBalancer, SelectionError, SelectionMode,
};

/// Round-robin selector.
/// Stores a single cursor shared by all requests routed through it.
#[derive(Debug)]
pub struct RoundRobin {
    mode: SelectionMode,
    cursor: Mutex<usize>,
}

impl RoundRobin {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            cursor: Mutex::new(0),
        }
    }

    /// Current cursor position.
    pub fn cursor(&self) -> usize {
        *self.cursor.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Rotate over the eligible view.
    ///
    /// The eligible list is rebuilt per call and can change shape, so the
    /// cursor only approximates fairness when the pool changes.
    fn next_eligible(&self, eligible: Vec<Host>) -> Result<Host, SelectionError> {
        let len = eligible.len();
        match len {
            0 => Err(SelectionError::NoHosts),
            1 => eligible.into_iter().next().ok_or(SelectionError::NoHosts),
            _ => {
                let mut cursor = self.cursor.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                let index = *cursor % len;
                *cursor = (index + 1) % len;
                Ok(eligible[index].clone())
            }
        }
    }

    /// Walk the full pool from the cursor to the first healthy host.
    ///
    /// The cursor advances on every step, including a fruitless full cycle.
    fn next_healthy(&self, hosts: Vec<Host>) -> Result<Host, SelectionError> {
        let len = hosts.len();
        if len == 0 {
            return Err(SelectionError::NoHosts);
        }
        if len == 1 {
            let host = &hosts[0];
            return if host.healthy {
                Ok(host.clone())
            } else {
                Err(SelectionError::NoHealthyTargets)
            };
        }

        let mut cursor = self.cursor.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if *cursor >= len {
            *cursor = 0;
        }
        let start = *cursor;
        loop {
            let host = &hosts[*cursor];
            *cursor = (*cursor + 1) % len;
            if host.healthy {
                return Ok(host.clone());
            }
            if *cursor == start {
                return Err(SelectionError::NoHealthyTargets);
            }
        }
    }
}

impl LoadBalancer for RoundRobin {
    fn next_host(&self, registry: &HostRegistry) -> Result<Host, SelectionError> {
        match self.mode {
            SelectionMode::FailOpen => self.next_eligible(registry.eligible_hosts()),
            SelectionMode::FailClosed => self.next_healthy(registry.snapshot()),
        }
    }
}
