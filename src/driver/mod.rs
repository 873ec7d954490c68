//! Reconciler process driver.
//!
//! # State Machine
//! ```text
//! NotStarted → Starting → Running → Stopping → Stopped
//!
//! Starting: spawn <interpreter> <script> --config-file <path>
//! Running:  pid published on `ready`, stderr classified into the logger
//! Stopping: inbound signal forwarded verbatim to the child pid
//! Stopped:  exit status inspected
//! ```
//!
//! # Design Decisions
//! - Start failure, non-zero exit and death by signal are fatal: the
//!   device can no longer be trusted to follow the snapshots
//! - Fatal outcomes are returned as errors; the binary decides to exit
//! - Signal lookup/delivery failures are recoverable and returned as-is
//! - No timeout on child shutdown

pub mod classify;
pub mod command;
pub mod supervisor;

use nix::sys::signal::Signal;
use thiserror::Error;

pub use classify::{classify, LineLevel};
pub use command::DriverCommand;
pub use supervisor::Supervisor;

/// Lifecycle of the supervised reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    NotStarted,
    Starting,
    Running,
    Stopping,
    Stopped,
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to start reconciler '{program}': {source}")]
    Start {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for reconciler: {0}")]
    Wait(#[source] std::io::Error),

    #[error("reconciler exited with status {code}")]
    Exited { code: i32 },

    #[error("reconciler terminated by signal {signal} ({})", signal_name(.signal))]
    Signaled { signal: i32 },

    #[error("reconciler process {pid} not found")]
    ProcessLookup { pid: u32 },

    #[error("failed to send {} to reconciler process {pid}: {source}", .signal.as_str())]
    SignalDelivery {
        pid: u32,
        signal: Signal,
        #[source]
        source: nix::errno::Errno,
    },
}

impl DriverError {
    /// True when the reconciler is gone or never started.
    pub fn is_fatal(&self) -> bool {
        match self {
            DriverError::Start { .. }
            | DriverError::Wait(_)
            | DriverError::Exited { .. }
            | DriverError::Signaled { .. } => true,
            DriverError::ProcessLookup { .. } | DriverError::SignalDelivery { .. } => false,
        }
    }
}

fn signal_name(signal: &i32) -> &'static str {
    Signal::try_from(*signal).map(Signal::as_str).unwrap_or("unknown")
}
