//! Snapshot serialization.
//!
//! # Data Flow
//! ```text
//! ConfigModel (clone taken by the aggregator)
//!     → Snapshot::render (sort pools by name/port, rules by full uri,
//!                         assign rule ordinals by specificity)
//!     → Snapshot::to_bytes (pretty JSON)
//!     → ConfigSink::write
//! ```
//!
//! # Design Decisions
//! - Output is a pure function of the model's logical content; map
//!   iteration order and update arrival order never leak into it
//! - No version counter in the bytes, so equal models give equal files
//! - Field layout is the contract agreed with the reconciler

pub mod serializer;

pub use serializer::{DeviceSettings, Snapshot, SnapshotError};
