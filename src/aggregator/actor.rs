//! The aggregator task: sole owner of the config model.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::aggregator::messages::{AggregatorRequest, RouteUpdate};
use crate::model::{ConfigModel, ModelSettings};
use crate::observability::metrics;
use crate::sink::ConfigSink;
use crate::snapshot::{DeviceSettings, Snapshot};

/// Actor state. Runs until every handle is dropped.
pub(crate) struct AggregatorCore {
    rx: mpsc::UnboundedReceiver<AggregatorRequest>,
    model: ConfigModel,
    settings: ModelSettings,
    device: DeviceSettings,
    sink: Arc<dyn ConfigSink>,
    settle: Duration,
    /// Generation of the last completed flush.
    generation: u64,
}

/// Work collected from the queue for one flush.
#[derive(Default)]
struct Batch {
    updates: usize,
    changed: bool,
    waiters: Vec<oneshot::Sender<u64>>,
}

impl AggregatorCore {
    pub(crate) fn new(
        rx: mpsc::UnboundedReceiver<AggregatorRequest>,
        settings: ModelSettings,
        device: DeviceSettings,
        sink: Arc<dyn ConfigSink>,
        settle: Duration,
        generation: u64,
    ) -> Self {
        Self {
            rx,
            model: ConfigModel::new(),
            settings,
            device,
            sink,
            settle,
            generation,
        }
    }

    pub(crate) async fn run(mut self) {
        info!(
            output = %self.sink.output_filename(),
            settle_ms = self.settle.as_millis() as u64,
            "Aggregator started"
        );

        while let Some(first) = self.rx.recv().await {
            let mut batch = Batch::default();
            self.handle(first, &mut batch);
            self.drain(&mut batch);

            if batch.updates > 0 && !self.settle.is_zero() {
                tokio::time::sleep(self.settle).await;
                self.drain(&mut batch);
            }

            if batch.updates > 0 {
                debug!(updates = batch.updates, changed = batch.changed, "Coalesced updates");
                self.flush().await;
            }

            for waiter in batch.waiters {
                let _ = waiter.send(self.generation);
            }
        }

        info!(generation = self.generation, "Aggregator stopped");
    }

    /// Take everything already queued without waiting.
    fn drain(&mut self, batch: &mut Batch) {
        while let Ok(request) = self.rx.try_recv() {
            self.handle(request, batch);
        }
    }

    fn handle(&mut self, request: AggregatorRequest, batch: &mut Batch) {
        match request {
            AggregatorRequest::Update(update) => {
                batch.updates += 1;
                batch.changed |= self.apply(update);
            }
            AggregatorRequest::Sync { reply_tx } => batch.waiters.push(reply_tx),
        }
    }

    fn apply(&mut self, update: RouteUpdate) -> bool {
        let changed = self
            .model
            .apply(&self.settings, update.event, &update.uri, &update.observed);
        debug!(
            event = update.event.as_str(),
            uri = %update.uri,
            routes = update.observed.len(),
            changed,
            "Route update applied"
        );
        changed
    }

    /// Render the current model and hand it to the sink.
    ///
    /// The sink runs on the blocking pool; the next batch waits for it, so
    /// at most one flush is in flight.
    async fn flush(&mut self) {
        let started = Instant::now();
        self.generation += 1;
        let generation = self.generation;

        let snapshot = Snapshot::render(&self.model, &self.device);
        metrics::record_model_size(self.model.route_config_count(), self.model.rule_count());

        let bytes = match snapshot.to_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(generation, error = %e, "Failed to serialize snapshot");
                metrics::record_flush(false, started.elapsed());
                return;
            }
        };

        let sink = Arc::clone(&self.sink);
        let result = tokio::task::spawn_blocking(move || sink.write(&bytes)).await;

        match result {
            Ok(Ok(written)) => {
                info!(
                    generation,
                    bytes = written,
                    route_configs = self.model.route_config_count(),
                    rules = self.model.rule_count(),
                    "Snapshot flushed"
                );
                metrics::record_flush(true, started.elapsed());
            }
            Ok(Err(e)) => {
                // The next flush carries the full state again.
                error!(generation, error = %e, "Failed to write snapshot");
                metrics::record_flush(false, started.elapsed());
            }
            Err(e) => {
                warn!(generation, error = %e, "Snapshot write task failed");
                metrics::record_flush(false, started.elapsed());
            }
        }
    }
}
