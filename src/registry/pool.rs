//! Endpoint pool for one route.

use std::collections::BTreeMap;

use crate::registry::endpoint::Endpoint;

/// The set of endpoints serving one route and context path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pool {
    context_path: String,
    /// address -> endpoint
    endpoints: BTreeMap<String, Endpoint>,
}

impl Pool {
    pub fn new(context_path: impl Into<String>) -> Self {
        Self {
            context_path: context_path.into(),
            endpoints: BTreeMap::new(),
        }
    }

    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    /// Insert or replace the endpoint at its address.
    ///
    /// Returns true if the pool changed.
    pub fn put(&mut self, endpoint: Endpoint) -> bool {
        match self.endpoints.insert(endpoint.address(), endpoint.clone()) {
            Some(previous) => previous != endpoint,
            None => true,
        }
    }

    /// Remove the endpoint with the same address. Returns true if it was present.
    pub fn remove(&mut self, endpoint: &Endpoint) -> bool {
        self.endpoints.remove(&endpoint.address()).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.values()
    }
}
