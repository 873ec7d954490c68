//! Load-balancer bridge library.
//!
//! Coalesces route registry changes into deterministic configuration
//! snapshots and supervises the external reconciler that applies them.

pub mod aggregator;
pub mod config;
pub mod driver;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod registry;
pub mod sink;
pub mod snapshot;

pub use aggregator::{Aggregator, AggregatorError, AggregatorHandle};
pub use config::schema::BridgeConfig;
pub use driver::{DriverCommand, DriverError, Supervisor};
pub use lifecycle::Shutdown;
pub use registry::{RegistryView, RouteEvent, RouteTable, RouteUri};
pub use sink::{ConfigSink, FileSink};
