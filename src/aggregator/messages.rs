//! Requests delivered to the aggregator task.

use tokio::sync::oneshot;

use crate::model::ObservedRoute;
use crate::registry::{RouteEvent, RouteUri};

/// A registry event with the routes read at call time.
#[derive(Debug, Clone)]
pub struct RouteUpdate {
    pub event: RouteEvent,
    pub uri: RouteUri,
    pub observed: Vec<ObservedRoute>,
}

#[derive(Debug)]
pub enum AggregatorRequest {
    /// Mutate the model.
    Update(RouteUpdate),

    /// Reply with the generation of the flush covering every earlier request.
    Sync { reply_tx: oneshot::Sender<u64> },
}
