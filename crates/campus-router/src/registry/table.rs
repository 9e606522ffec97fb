//! The immutable uri-to-route map handed to the dispatcher.

use std::collections::HashMap;

use super::RouteEntry;
use crate::instances::ControllerCache;

/// Immutable route table published for concurrent dispatch.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: HashMap<String, RouteEntry>,
    controllers: ControllerCache,
}

impl RouteTable {
    pub(crate) const fn new(
        routes: HashMap<String, RouteEntry>,
        controllers: ControllerCache,
    ) -> Self {
        Self {
            routes,
            controllers,
        }
    }

    /// Looks up a route.
    #[must_use]
    pub fn get(&self, uri: &str) -> Option<&RouteEntry> {
        self.routes.get(uri)
    }

    /// Whether `uri` is registered.
    #[must_use]
    pub fn has_route(&self, uri: &str) -> bool {
        self.routes.contains_key(uri)
    }

    /// Required-role field of `uri` as declared.
    #[must_use]
    pub fn required_role(&self, uri: &str) -> Option<&str> {
        self.routes.get(uri).map(RouteEntry::required_role)
    }

    /// Number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` when no route is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered uris in lexical order.
    #[must_use]
    pub fn uris(&self) -> Vec<&str> {
        let mut uris: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        uris.sort_unstable();
        uris
    }

    /// All routes, unordered.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &RouteEntry)> {
        self.routes.iter().map(|(uri, entry)| (uri.as_str(), entry))
    }

    /// Controller singletons backing the routes.
    #[must_use]
    pub const fn controllers(&self) -> &ControllerCache {
        &self.controllers
    }
}
