//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject unsupported algorithms and empty passive pools
//! - Validate value ranges (thresholds and intervals > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;
use crate::load_balancer::ROUND_ROBIN;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unsupported routing algorithm {0}")]
    UnsupportedAlgorithm(String),

    #[error("unsupported handler type {0}")]
    UnsupportedHandler(String),

    #[error("at least 1 host address must be provided")]
    NoHosts,

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("invalid host address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },
}

/// Check a parsed configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match &config.handler {
        Some(handler) => {
            if handler.handler_type != ROUND_ROBIN {
                errors.push(ValidationError::UnsupportedHandler(handler.handler_type.clone()));
            }
            if handler.host_addresses.is_empty() {
                errors.push(ValidationError::NoHosts);
            }
            if handler.timeout_seconds == 0 {
                errors.push(ValidationError::Zero { field: "handler.timeoutSeconds" });
            }
            check_addresses(&handler.host_addresses, &mut errors);
        }
        None => {
            if config.routing_algorithm != ROUND_ROBIN {
                errors.push(ValidationError::UnsupportedAlgorithm(
                    config.routing_algorithm.clone(),
                ));
            }
            let hc = &config.health_check;
            if hc.num_required == 0 {
                errors.push(ValidationError::Zero { field: "healthCheck.numRequired" });
            }
            if hc.interval_seconds == 0 {
                errors.push(ValidationError::Zero { field: "healthCheck.intervalSeconds" });
            }
            if hc.timeout_seconds == 0 {
                errors.push(ValidationError::Zero { field: "healthCheck.timeoutSeconds" });
            }
            if config.request_handling.timeout_seconds == 0 {
                errors.push(ValidationError::Zero { field: "requestHandling.timeoutSeconds" });
            }
            check_addresses(&config.hosts, &mut errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_addresses(addresses: &[String], errors: &mut Vec<ValidationError>) {
    for address in addresses {
        // the forwarder speaks plain HTTP only
        match Url::parse(address) {
            Ok(url) if url.scheme() == "http" && url.has_host() => {}
            Ok(url) if url.scheme() == "http" => errors.push(ValidationError::InvalidAddress {
                address: address.clone(),
                reason: "missing host".to_string(),
            }),
            Ok(url) => errors.push(ValidationError::InvalidAddress {
                address: address.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            }),
            Err(e) => errors.push(ValidationError::InvalidAddress {
                address: address.clone(),
                reason: e.to_string(),
            }),
        }
    }
}
