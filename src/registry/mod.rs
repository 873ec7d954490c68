//! Route registry boundary.
//!
//! # Data Flow
//! ```text
//! Service discovery (external)
//!     → RouteTable (uri → Pool of endpoints)
//!     → RouteEvent::Add / RouteEvent::Remove
//!     → AggregatorHandle::route_update(event, view, uri)
//!         view.visit() enumerates the node's pool and every descendant
//! ```
//!
//! # Design Decisions
//! - The aggregator only reads a view during the call; it never keeps one
//! - `RouteTable` is a plain ordered map, enough to drive the binary's
//!   static routes and the tests; trie internals live in the real registry
//! - Endpoints are immutable values; pools replace them by address

pub mod endpoint;
pub mod pool;
pub mod static_source;
pub mod table;

pub use endpoint::{Endpoint, ModificationTag};
pub use pool::Pool;
pub use static_source::StaticRouteSource;
pub use table::{RouteTable, RouteUri, Subtree};

/// Kind of change reported by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteEvent {
    Add,
    Remove,
}

impl RouteEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteEvent::Add => "add",
            RouteEvent::Remove => "remove",
        }
    }
}

/// Read access to a registry node and its descendants.
pub trait RegistryView {
    /// Call `f` once for every route (node with a pool) under this view.
    fn visit(&self, f: &mut dyn FnMut(&RouteUri, &Pool));
}
