//! In-memory route table.

use std::collections::BTreeMap;
use std::fmt;

use crate::registry::pool::Pool;
use crate::registry::RegistryView;

/// Fully-qualified route key: host plus optional path (`baz.cf.com/segment1`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteUri(String);

impl RouteUri {
    /// Normalizes case of the host and strips trailing slashes.
    pub fn new(uri: impl AsRef<str>) -> Self {
        let uri = uri.as_ref().trim().trim_end_matches('/');
        let normalized = match uri.split_once('/') {
            Some((host, path)) => format!("{}/{}", host.to_lowercase(), path),
            None => uri.to_lowercase(),
        };
        Self(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn host(&self) -> &str {
        match self.0.split_once('/') {
            Some((host, _)) => host,
            None => &self.0,
        }
    }

    pub fn path_segments(&self) -> Vec<&str> {
        match self.0.split_once('/') {
            Some((_, path)) => path.split('/').filter(|s| !s.is_empty()).collect(),
            None => Vec::new(),
        }
    }

    /// True for wildcard domains such as `*.cf.com`.
    pub fn is_wildcard(&self) -> bool {
        self.host().starts_with("*.")
    }

    /// True if `other` is this uri or a path below it.
    pub fn contains(&self, other: &RouteUri) -> bool {
        match other.0.strip_prefix(self.0.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

impl fmt::Display for RouteUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RouteUri {
    fn from(uri: &str) -> Self {
        Self::new(uri)
    }
}

/// Registry keyed by route uri.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: BTreeMap<RouteUri, Pool>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the pool for `uri`. Returns the previous pool.
    pub fn insert(&mut self, uri: RouteUri, pool: Pool) -> Option<Pool> {
        self.routes.insert(uri, pool)
    }

    pub fn find(&self, uri: &RouteUri) -> Option<&Pool> {
        self.routes.get(uri)
    }

    pub fn find_mut(&mut self, uri: &RouteUri) -> Option<&mut Pool> {
        self.routes.get_mut(uri)
    }

    /// Remove the route. Returns true if it existed.
    pub fn delete(&mut self, uri: &RouteUri) -> bool {
        self.routes.remove(uri).is_some()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn uris(&self) -> impl Iterator<Item = &RouteUri> {
        self.routes.keys()
    }

    /// View limited to `uri` and the routes below it.
    pub fn subtree<'a>(&'a self, uri: &'a RouteUri) -> Subtree<'a> {
        Subtree { table: self, root: uri }
    }
}

impl RegistryView for RouteTable {
    fn visit(&self, f: &mut dyn FnMut(&RouteUri, &Pool)) {
        for (uri, pool) in &self.routes {
            f(uri, pool);
        }
    }
}

/// A `RouteTable` view rooted at one uri.
#[derive(Debug, Clone, Copy)]
pub struct Subtree<'a> {
    table: &'a RouteTable,
    root: &'a RouteUri,
}

impl RegistryView for Subtree<'_> {
    fn visit(&self, f: &mut dyn FnMut(&RouteUri, &Pool)) {
        for (uri, pool) in self.table.routes.range(self.root.clone()..) {
            if !uri.as_str().starts_with(self.root.as_str()) {
                break;
            }
            if self.root.contains(uri) {
                f(uri, pool);
            }
        }
    }
}
