//! Timeout enforcement.
//!
//! # Design Decisions
//! - Every outbound probe or forward carries its own deadline
//! - A timed-out call is reported like any other transport error

use std::future::Future;
use std::time::Duration;
use tokio::time;

use crate::http::forwarder::ForwardError;

/// Run an outbound call with a deadline.
pub async fn with_timeout<T, F>(timeout: Duration, call: F) -> Result<T, ForwardError>
where
    F: Future<Output = Result<T, ForwardError>>,
{
    match time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(ForwardError::Timeout(timeout)),
    }
}
