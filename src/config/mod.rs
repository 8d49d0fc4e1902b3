//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read and deserialize)
//!     → validation.rs (semantic checks, all errors reported at once)
//!     → ServiceConfig (validated, immutable)
//!     → consumed at startup; the engine keeps its own pricing copy
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changing it requires a restart
//! - Only the rate table files hot-reload, through their own watcher
//! - Every field has a default, so the service runs with no config file
//! - Serde handles shape, validation.rs handles meaning

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{DataConfig, ListenerConfig, PricingConfig, ServiceConfig};
