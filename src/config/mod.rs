//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (JSON or TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → lifecycle::startup builds the core from it
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the host pool changes at runtime instead
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Any configuration error is fatal at startup

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    HandlerConfig, HealthCheckConfig, ListenerConfig, ObservabilityConfig, ProxyConfig,
    RequestHandlingConfig,
};
