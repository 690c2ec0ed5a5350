//! Attempt classification for the forward retry loop.
//!
//! # Design Decisions
//! - Transport errors and timeouts always count as a failed attempt
//! - Which upstream statuses count as failures depends on the health policy
//! - Retries are immediate; the bound is `max_retries + 1` attempts

use axum::http::StatusCode;

/// Upstream statuses that fail an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCondition {
    /// Only `500 Internal Server Error`.
    InternalServerError,
    /// Any `5xx`.
    ServerError,
}

impl FailureCondition {
    pub fn is_failure(self, status: StatusCode) -> bool {
        match self {
            FailureCondition::InternalServerError => status == StatusCode::INTERNAL_SERVER_ERROR,
            FailureCondition::ServerError => status.is_server_error(),
        }
    }
}

/// Total attempts allowed for a retry bound.
pub fn max_attempts(max_retries: u32) -> u32 {
    max_retries.saturating_add(1)
}
