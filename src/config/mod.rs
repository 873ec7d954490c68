//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BridgeConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → changed static routes sent to the binary
//!     → static routes diffed into Add/Remove updates
//! ```
//!
//! # Design Decisions
//! - Device and driver settings are read once at startup; reloads only
//!   affect static routes
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AggregatorConfig, BigIpConfig, BridgeConfig, DriverConfig, ObservabilityConfig,
    OutputConfig, StaticRouteConfig,
};
pub use validation::ValidationError;
