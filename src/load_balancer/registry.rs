//! Host registry.
//!
//! # Responsibilities
//! - Own the ordered list of hosts behind a single reader/writer lock
//! - Register/deregister hosts with address uniqueness
//! - Hand out value snapshots for selection and health evaluation
//! - Apply health mutations under the write lock
//!
//! # Design Decisions
//! - Insertion order is kept; round-robin depends on it
//! - Callers never get references into the list, only clones
//! - Lock hold time is O(number of hosts), never across an await

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

use crate::load_balancer::host::Host;

/// Errors returned by registry mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The address is already registered.
    #[error("Duplicate host address detected")]
    DuplicateHost(String),

    /// The address is not registered.
    #[error("Host address not found")]
    HostNotFound(String),
}

/// Thread-safe, ordered set of hosts.
#[derive(Debug)]
pub struct HostRegistry {
    hosts: RwLock<Vec<Host>>,
    /// Health assigned to hosts added through [`HostRegistry::register`].
    registration_health: bool,
}

impl HostRegistry {
    /// Create an empty registry.
    ///
    /// `registration_health` is the initial flag for dynamically registered hosts.
    pub fn new(registration_health: bool) -> Self {
        Self {
            hosts: RwLock::new(Vec::new()),
            registration_health,
        }
    }

    /// Register a host at runtime with the registry's default health.
    pub fn register(&self, address: &str) -> Result<(), RegistryError> {
        self.insert(address, self.registration_health)
    }

    /// Register a statically configured host. These start healthy.
    pub fn register_static(&self, address: &str) -> Result<(), RegistryError> {
        self.insert(address, true)
    }

    /// Remove a host, keeping the relative order of the rest.
    pub fn deregister(&self, address: &str) -> Result<(), RegistryError> {
        let mut hosts = self.write();
        match hosts.iter().position(|h| h.address == address) {
            Some(index) => {
                hosts.remove(index);
                tracing::info!(address = %address, remaining = hosts.len(), "Host deregistered");
                Ok(())
            }
            None => Err(RegistryError::HostNotFound(address.to_string())),
        }
    }

    /// Healthy hosts in registration order, or the whole pool when none is healthy.
    pub fn eligible_hosts(&self) -> Vec<Host> {
        let hosts = self.read();
        let healthy: Vec<Host> = hosts.iter().filter(|h| h.healthy).cloned().collect();
        if healthy.is_empty() {
            return hosts.clone();
        }
        healthy
    }

    /// Full pool in registration order.
    pub fn snapshot(&self) -> Vec<Host> {
        self.read().clone()
    }

    /// Registered addresses in registration order.
    pub fn addresses(&self) -> Vec<String> {
        self.read().iter().map(|h| h.address.clone()).collect()
    }

    /// Current health flag of a host, if registered.
    pub fn is_healthy(&self, address: &str) -> Option<bool> {
        self.read().iter().find(|h| h.address == address).map(|h| h.healthy)
    }

    /// Set the health flag of a host.
    ///
    /// Returns `None` if the host is gone, otherwise whether the flag changed.
    pub fn set_healthy(&self, address: &str, healthy: bool) -> Option<bool> {
        self.update(address, |host| {
            let changed = host.healthy != healthy;
            host.healthy = healthy;
            changed
        })
    }

    /// Run a mutation against one host under the write lock.
    ///
    /// Returns `None` if no host with that address is registered.
    pub fn update<F, R>(&self, address: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut Host) -> R,
    {
        let mut hosts = self.write();
        hosts.iter_mut().find(|h| h.address == address).map(f)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn insert(&self, address: &str, healthy: bool) -> Result<(), RegistryError> {
        let mut hosts = self.write();
        if hosts.iter().any(|h| h.address == address) {
            return Err(RegistryError::DuplicateHost(address.to_string()));
        }
        hosts.push(Host::new(address, healthy));
        tracing::info!(address = %address, healthy, total = hosts.len(), "Host registered");
        Ok(())
    }

    // A panic while holding the lock cannot leave the list half-edited,
    // so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Host>> {
        self.hosts.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Host>> {
        self.hosts.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
