//! Routes declared in the config file, fed to the aggregator as registry
//! events.

use crate::aggregator::{AggregatorError, AggregatorHandle};
use crate::config::StaticRouteConfig;
use crate::registry::{Endpoint, Pool, RouteEvent, RouteTable, RouteUri};

/// Keeps the last applied static routes and emits the difference on reload.
#[derive(Debug, Default)]
pub struct StaticRouteSource {
    table: RouteTable,
}

impl StaticRouteSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Bring the table in line with `routes` and report every change.
    ///
    /// Returns the number of events sent.
    pub fn apply(
        &mut self,
        routes: &[StaticRouteConfig],
        aggregator: &AggregatorHandle,
    ) -> Result<usize, AggregatorError> {
        let desired: Vec<(RouteUri, Pool)> = routes.iter().map(build_pool).collect();
        let mut events = 0;

        let stale: Vec<RouteUri> = self
            .table
            .uris()
            .filter(|uri| !desired.iter().any(|(d, _)| d == *uri))
            .cloned()
            .collect();
        for uri in stale {
            self.table.delete(&uri);
            aggregator.route_update(RouteEvent::Remove, &self.table.subtree(&uri), &uri)?;
            events += 1;
        }

        for (uri, pool) in desired {
            if self.table.find(&uri) == Some(&pool) {
                continue;
            }
            self.table.insert(uri.clone(), pool);
            aggregator.route_update(RouteEvent::Add, &self.table.subtree(&uri), &uri)?;
            events += 1;
        }

        tracing::info!(routes = self.table.len(), events, "Static routes applied");
        Ok(events)
    }
}

fn build_pool(route: &StaticRouteConfig) -> (RouteUri, Pool) {
    let mut pool = Pool::new(&route.context_path);
    for addr in &route.endpoints {
        match Endpoint::parse(addr) {
            Some(endpoint) => {
                pool.put(endpoint);
            }
            None => tracing::warn!(uri = %route.uri, endpoint = %addr, "Ignoring invalid endpoint"),
        }
    }
    (RouteUri::new(&route.uri), pool)
}
