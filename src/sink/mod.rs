//! Snapshot destination.
//!
//! # Data Flow
//! ```text
//! Aggregator flush
//!     → ConfigSink::write(full snapshot bytes)
//!     → file.rs (temp file + rename)
//!     → reconciler reads output_filename() out of band
//! ```
//!
//! # Design Decisions
//! - One write per flush, always the complete snapshot
//! - Atomicity is the sink's job; the aggregator never sees partial writes

pub mod file;

use thiserror::Error;

pub use file::FileSink;

/// Failure to persist a snapshot.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write snapshot to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("sink rejected snapshot: {0}")]
    Rejected(String),
}

/// Durable target for serialized snapshots.
pub trait ConfigSink: Send + Sync {
    /// Location agreed upon with the reconciler.
    fn output_filename(&self) -> String;

    /// Persist the full snapshot. Returns the number of bytes written.
    fn write(&self, bytes: &[u8]) -> Result<usize, SinkError>;
}
