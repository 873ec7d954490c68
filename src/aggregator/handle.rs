//! AggregatorHandle - client interface for registry callers

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::aggregator::messages::{AggregatorRequest, RouteUpdate};
use crate::aggregator::AggregatorError;
use crate::model::ObservedRoute;
use crate::observability::metrics;
use crate::registry::{RegistryView, RouteEvent, RouteUri};

/// Cloneable handle to the aggregator task.
///
/// Sending never waits for a flush; callers only pay for reading the
/// registry view and one channel push.
#[derive(Debug, Clone)]
pub struct AggregatorHandle {
    tx: mpsc::UnboundedSender<AggregatorRequest>,
    output: String,
}

impl AggregatorHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<AggregatorRequest>, output: String) -> Self {
        Self { tx, output }
    }

    /// Report a registry change for `uri`.
    ///
    /// Every route under `view` is read now; the view is not kept.
    pub fn route_update(
        &self,
        event: RouteEvent,
        view: &dyn RegistryView,
        uri: &RouteUri,
    ) -> Result<(), AggregatorError> {
        let observed = ObservedRoute::collect(view);
        debug!(event = event.as_str(), %uri, routes = observed.len(), "route_update: enqueue");
        metrics::record_route_update(event.as_str());

        self.tx
            .send(AggregatorRequest::Update(RouteUpdate {
                event,
                uri: uri.clone(),
                observed,
            }))
            .map_err(|_| AggregatorError::Closed)
    }

    /// Wait until every update sent before this call has been flushed.
    ///
    /// Returns the generation of that flush.
    pub async fn sync(&self) -> Result<u64, AggregatorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(AggregatorRequest::Sync { reply_tx })
            .map_err(|_| AggregatorError::Closed)?;
        reply_rx.await.map_err(|_| AggregatorError::Closed)
    }

    /// Location the snapshots are written to.
    pub fn output_filename(&self) -> &str {
        &self.output
    }

    /// True once the aggregator task has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
