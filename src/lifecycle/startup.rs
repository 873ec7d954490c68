//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Start background tasks (static route reload, signal forwarding)
//! - Launch the reconciler and wait for it to finish
//!
//! # Design Decisions
//! - Fail fast: any startup error is returned before the reconciler runs
//! - The aggregator comes first so the reconciler always finds a snapshot

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::aggregator::{Aggregator, AggregatorError, AggregatorHandle};
use crate::config::watcher::ConfigWatcher;
use crate::config::{BridgeConfig, StaticRouteConfig};
use crate::driver::{DriverCommand, DriverError, Supervisor};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::registry::StaticRouteSource;
use crate::sink::FileSink;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Aggregator(#[from] AggregatorError),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("failed to watch config file: {0}")]
    Watch(#[from] notify::Error),
}

impl StartupError {
    /// Fatal outcomes must end the process with a failure status.
    pub fn is_fatal(&self) -> bool {
        match self {
            StartupError::Driver(e) => e.is_fatal(),
            _ => true,
        }
    }
}

/// Run the bridge until the reconciler stops.
pub async fn run(config_path: &Path, config: BridgeConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let sink = Arc::new(FileSink::new(&config.output.config_file));
    let aggregator = Aggregator::spawn(&config, sink)?;

    let shutdown = Shutdown::new();
    let mut routes = StaticRouteSource::new();
    routes.apply(&config.routes, &aggregator)?;

    let (watcher, updates) = ConfigWatcher::new(config_path, config.routes.clone());
    let _watcher = watcher.run()?;
    tokio::spawn(reload_routes(routes, updates, aggregator.clone(), shutdown.clone()));

    let supervisor = Supervisor::new(DriverCommand::from_config(
        &config.driver,
        &config.output.config_file,
    ));
    let (signal_tx, signal_rx) = mpsc::channel(1);
    let (ready_tx, ready_rx) = oneshot::channel();
    let driver = tokio::spawn(supervisor.run(signal_rx, ready_tx));

    if let Ok(pid) = ready_rx.await {
        tracing::info!(pid, output = %aggregator.output_filename(), "Bridge ready");
    }

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = signals::forward_termination(signal_shutdown, signal_tx).await {
            tracing::error!(error = %e, "Failed to install signal handlers");
        }
    });

    let outcome = match driver.await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "Reconciler supervisor task failed");
            Err(DriverError::Wait(std::io::Error::other(e.to_string())))
        }
    };
    shutdown.trigger();

    match aggregator.sync().await {
        Ok(generation) => tracing::info!(generation, "Final snapshot flushed"),
        Err(e) => tracing::warn!(error = %e, "Final snapshot sync failed"),
    }

    outcome.map_err(StartupError::from)
}

/// Apply reloaded static routes until shutdown.
async fn reload_routes(
    mut routes: StaticRouteSource,
    mut updates: mpsc::UnboundedReceiver<Vec<StaticRouteConfig>>,
    aggregator: AggregatorHandle,
    shutdown: Shutdown,
) {
    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(reloaded) = update else { break };
                if let Err(e) = routes.apply(&reloaded, &aggregator) {
                    tracing::error!(error = %e, "Failed to apply reloaded routes");
                    break;
                }
            }
            _ = shutdown.wait() => break,
        }
    }
    tracing::debug!("Static route reload stopped");
}
