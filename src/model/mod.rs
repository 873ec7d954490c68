//! Desired device state.
//!
//! # Data Flow
//! ```text
//! RouteUpdate (event, uri, observed routes)
//!     → ConfigModel::apply
//!         route_configs: ServiceKey → RouteConfig
//!         rules:         full uri   → Rule
//!     → clone handed to snapshot::Snapshot::render
//! ```
//!
//! # Invariants
//! - At most one RouteConfig per ServiceKey, one Rule per full uri
//! - No RouteConfig with an empty member set
//! - Every Rule forwards to a RouteConfig present in the model

pub mod ordering;
pub mod route_config;
pub mod rule;

use std::collections::{BTreeSet, HashMap};

use crate::registry::{RegistryView, RouteEvent, RouteUri};

pub use route_config::{RouteConfig, ServiceKey};
pub use rule::{HostMatch, Rule};

/// Naming and placement used when deriving entries from routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSettings {
    pub pool_prefix: String,
    pub service_port: u16,
    pub partition: String,
}

impl ModelSettings {
    /// Service identity for a route uri.
    ///
    /// `*` becomes `_` and `/` becomes `~` so the name stays a flat token.
    /// Literal `%`, `_` and `~` are percent-escaped first, so distinct uris
    /// never share a name.
    pub fn service_key(&self, uri: &RouteUri) -> ServiceKey {
        let mut flat = String::with_capacity(uri.as_str().len());
        for c in uri.as_str().chars() {
            match c {
                '%' => flat.push_str("%25"),
                '_' => flat.push_str("%5F"),
                '~' => flat.push_str("%7E"),
                '*' => flat.push('_'),
                '/' => flat.push('~'),
                c => flat.push(c),
            }
        }
        ServiceKey::new(format!("{}-{}", self.pool_prefix, flat), self.service_port)
    }
}

/// One route as read from the registry at update time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedRoute {
    pub uri: RouteUri,
    pub members: BTreeSet<String>,
}

impl ObservedRoute {
    /// Read every route under `view`.
    pub fn collect(view: &dyn RegistryView) -> Vec<ObservedRoute> {
        let mut observed = Vec::new();
        view.visit(&mut |uri, pool| {
            observed.push(ObservedRoute {
                uri: uri.clone(),
                members: pool.endpoints().map(|e| e.address()).collect(),
            });
        });
        observed
    }
}

/// The mutable model owned by the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigModel {
    route_configs: HashMap<ServiceKey, RouteConfig>,
    rules: HashMap<String, Rule>,
}

impl ConfigModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route_configs(&self) -> impl Iterator<Item = &RouteConfig> {
        self.route_configs.values()
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    pub fn route_config_count(&self) -> usize {
        self.route_configs.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn rule(&self, full_uri: &str) -> Option<&Rule> {
        self.rules.get(full_uri)
    }

    pub fn route_config(&self, key: &ServiceKey) -> Option<&RouteConfig> {
        self.route_configs.get(key)
    }

    /// Apply one registry event. Returns true if the model changed.
    pub fn apply(
        &mut self,
        settings: &ModelSettings,
        event: RouteEvent,
        uri: &RouteUri,
        observed: &[ObservedRoute],
    ) -> bool {
        let mut changed = false;
        if event == RouteEvent::Remove {
            changed |= self.remove_route(settings, uri);
        }
        for route in observed {
            changed |= self.sync_route(settings, route);
        }
        changed
    }

    /// Upsert the entries for one route, or drop them if its pool is empty.
    fn sync_route(&mut self, settings: &ModelSettings, route: &ObservedRoute) -> bool {
        if route.members.is_empty() {
            return self.remove_route(settings, &route.uri);
        }

        let key = settings.service_key(&route.uri);
        let mut changed = false;

        let config = self
            .route_configs
            .entry(key.clone())
            .or_insert_with(|| RouteConfig::new(key.clone(), settings.partition.clone()));
        if config.members != route.members {
            config.members = route.members.clone();
            changed = true;
        }

        let rule = Rule::for_uri(&route.uri, key);
        if self.rules.get(&rule.full_uri) != Some(&rule) {
            self.rules.insert(rule.full_uri.clone(), rule);
            changed = true;
        }

        changed
    }

    fn remove_route(&mut self, settings: &ModelSettings, uri: &RouteUri) -> bool {
        let removed_rule = self.rules.remove(uri.as_str());
        let key = match &removed_rule {
            Some(rule) => rule.forward_to.clone(),
            None => settings.service_key(uri),
        };
        let removed_config = self.route_configs.remove(&key).is_some();
        removed_rule.is_some() || removed_config
    }
}
