//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Buffered inbound request
//!     → router.rs (retry loop)
//!         → load_balancer (next target)
//!         → http::forwarder (send, with timeout)
//!         → health policy (react to failed attempts)
//!     → Return: upstream response or RouteError
//! ```
//!
//! # Design Decisions
//! - One router per process, shared by all request handlers
//! - Cursor and pool are shared; rotation is best-effort under topology changes

pub mod router;

pub use router::{RouteError, Router};
