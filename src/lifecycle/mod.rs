//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Spawn aggregator (initial snapshot)
//!     → Seed static routes → Start watcher → Launch reconciler → Ready
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → forwarded to the reconciler → shutdown broadcast
//!
//! Shutdown (shutdown.rs):
//!     Reconciler exits → final aggregator sync → Exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - A fatal reconciler outcome ends the process with a non-zero status
//! - No timeout on reconciler shutdown

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{run, StartupError};
