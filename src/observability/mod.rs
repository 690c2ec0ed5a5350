//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router, registry and health policies produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows from the inbound request to every upstream attempt
//! - Per-host labels on failure and health metrics

pub mod logging;
pub mod metrics;
