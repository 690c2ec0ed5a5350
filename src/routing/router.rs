//! Request routing with retry.
//!
//! # Responsibilities
//! - Pick the next target through the load balancer
//! - Forward the request, retrying on failed attempts up to the bound
//! - Report failed attempts to the health policy
//! - Surface a terminal result to the HTTP layer
//!
//! # Design Decisions
//! - Selection failure aborts at once; there is nothing left to retry against
//! - Every attempt forwards a fresh copy of the buffered request
//! - Any response that is not a failure per the policy is returned verbatim

use std::sync::Arc;
use thiserror::Error;

use crate::health::HealthPolicy;
use crate::http::forwarder::{OutboundRequest, RequestForwarder, UpstreamResponse};
use crate::http::request::request_id;
use crate::load_balancer::{
    registry::{HostRegistry, RegistryError},
    LoadBalancer,
};
use crate::observability::metrics;
use crate::resilience::retries::max_attempts;

/// Terminal routing failures, as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("no available healthy server to process request. please try again after a while.")]
    NoHealthyTargets,

    #[error("server encountered error. please try again after a while.")]
    RetriesExhausted { attempts: u32 },
}

/// Routes requests over a shared host pool.
pub struct Router {
    registry: Arc<HostRegistry>,
    policy: Arc<dyn HealthPolicy>,
    balancer: Box<dyn LoadBalancer>,
    forwarder: Arc<dyn RequestForwarder>,
    max_retries: u32,
}

impl Router {
    pub fn new(
        registry: Arc<HostRegistry>,
        policy: Arc<dyn HealthPolicy>,
        balancer: Box<dyn LoadBalancer>,
        forwarder: Arc<dyn RequestForwarder>,
        max_retries: u32,
    ) -> Self {
        Self {
            registry,
            policy,
            balancer,
            forwarder,
            max_retries,
        }
    }

    pub fn registry(&self) -> &Arc<HostRegistry> {
        &self.registry
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn register_host(&self, address: &str) -> Result<(), RegistryError> {
        self.registry.register(address)?;
        metrics::record_host_health(address, self.policy.registration_health());
        Ok(())
    }

    pub fn deregister_host(&self, address: &str) -> Result<(), RegistryError> {
        self.registry.deregister(address)?;
        metrics::clear_host_health(address);
        Ok(())
    }

    /// Forward `request` to a host, retrying failed attempts.
    pub async fn forward(&self, request: OutboundRequest) -> Result<UpstreamResponse, RouteError> {
        let request_id = request_id(&request.headers);
        let failure = self.policy.failure_condition();
        let allowed = max_attempts(self.max_retries);

        let mut attempts = 0;
        while attempts < allowed {
            let target = match self.balancer.next_host(&self.registry) {
                Ok(host) => host,
                Err(e) => {
                    tracing::warn!(request_id = %request_id, reason = %e, "No target available");
                    return Err(RouteError::NoHealthyTargets);
                }
            };

            tracing::debug!(
                request_id = %request_id,
                address = %target.address,
                attempt = attempts + 1,
                "Forwarding request"
            );

            match self.forwarder.forward(&target.address, request.clone()).await {
                Ok(response) if !failure.is_failure(response.status) => return Ok(response),
                Ok(response) => {
                    tracing::warn!(
                        request_id = %request_id,
                        address = %target.address,
                        attempt = attempts + 1,
                        status = %response.status,
                        "Upstream returned error status"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        request_id = %request_id,
                        address = %target.address,
                        attempt = attempts + 1,
                        error = %e,
                        "Upstream error"
                    );
                }
            }

            metrics::record_attempt_failure(&target.address);
            self.policy.on_attempt_failure(&target.address);
            attempts += 1;
        }

        tracing::error!(request_id = %request_id, attempts, "Retries exhausted");
        Err(RouteError::RetriesExhausted { attempts })
    }
}
