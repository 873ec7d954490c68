//! Update-coalescing aggregator.
//!
//! # Data Flow
//! ```text
//! registry callers (any number, concurrently)
//!     → AggregatorHandle::route_update (read view, enqueue)
//!     → unbounded queue
//!     → AggregatorCore (single task, owns ConfigModel)
//!         wait for one request
//!         drain everything queued (+ optional settle window)
//!         apply all updates
//!         flush once: render → serialize → ConfigSink::write
//! ```
//!
//! # Design Decisions
//! - One owner for the model; callers never lock anything
//! - Updates arriving during a flush wait in the queue and form the next
//!   batch, so a burst of K updates produces between 1 and K flushes and
//!   the last one always reflects the whole burst
//! - The initial empty snapshot is written before `spawn` returns
//! - Sink failures are logged; the next flush rewrites the full state

mod actor;
pub mod handle;
pub mod messages;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::loader::join;
use crate::config::validation::{validate_device, ValidationError};
use crate::config::BridgeConfig;
use crate::model::ConfigModel;
use crate::sink::{ConfigSink, SinkError};
use crate::snapshot::{DeviceSettings, Snapshot, SnapshotError};

use self::actor::AggregatorCore;

pub use handle::AggregatorHandle;
pub use messages::RouteUpdate;

#[derive(Debug, Error)]
pub enum AggregatorError {
    /// Device settings are missing; no aggregator was created.
    #[error("invalid device configuration: {}", join(.0))]
    Configuration(Vec<ValidationError>),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// The initial snapshot could not be written.
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// The aggregator task is gone.
    #[error("aggregator is closed")]
    Closed,
}

/// Entry point for creating the aggregator task.
pub struct Aggregator;

impl Aggregator {
    /// Validate settings, write the initial empty snapshot, and start the task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        config: &BridgeConfig,
        sink: Arc<dyn ConfigSink>,
    ) -> Result<AggregatorHandle, AggregatorError> {
        validate_device(&config.bigip).map_err(AggregatorError::Configuration)?;

        let settings = config.bigip.model_settings();
        let device = DeviceSettings::from_config(&config.bigip, &config.observability.log_level);

        let initial = Snapshot::render(&ConfigModel::new(), &device).to_bytes()?;
        sink.write(&initial)?;
        tracing::info!(output = %sink.output_filename(), generation = 1, "Initial snapshot written");

        let (tx, rx) = mpsc::unbounded_channel();
        let output = sink.output_filename();
        let core = AggregatorCore::new(
            rx,
            settings,
            device,
            sink,
            Duration::from_millis(config.aggregator.settle_ms),
            1,
        );
        tokio::spawn(core.run());

        Ok(AggregatorHandle::new(tx, output))
    }
}
