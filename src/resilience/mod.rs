//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Attempt to a host:
//!     → timeouts.rs (per-call deadline, elapsed = transport error)
//!     → retries.rs (does this outcome fail the attempt?)
//!     → on failure the router asks the health policy to react and retries
//! ```

pub mod retries;
pub mod timeouts;
