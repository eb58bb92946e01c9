//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store composed routes keyed by (method, normalized pattern)
//! - Reject a second claim on an existing key
//! - Look up the route for a request, or report an explicit no-match
//!
//! # Design Decisions
//! - Built through `DispatchTableBuilder`, then frozen; the frozen table has
//!   no mutating methods and is shared via `Arc` without locks
//! - O(1) lookup for static patterns via HashMap
//! - O(n) scan of parameterised patterns in registration order
//! - Static patterns win over parameterised ones

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;
use thiserror::Error;

use crate::middleware::ComposedRoute;
use crate::routing::matcher::{normalize_path, PathParams};

/// A second route claimed an already registered (method, route).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{method} {route} is already registered by '{existing}'")]
pub struct DuplicateRoute {
    pub method: Method,
    pub route: String,
    pub existing: String,
}

type Key = (Method, String);

/// Mutable table used during registration.
#[derive(Debug, Default)]
pub struct DispatchTableBuilder {
    routes: Vec<Arc<ComposedRoute>>,
    index: HashMap<Key, usize>,
}

impl DispatchTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the route already holding `(method, key)`, if any.
    pub fn existing(&self, method: &Method, key: &str) -> Option<&str> {
        self.index
            .get(&(method.clone(), key.to_string()))
            .map(|&i| self.routes[i].name())
    }

    pub fn insert(&mut self, route: ComposedRoute) -> Result<(), DuplicateRoute> {
        let key = (route.method().clone(), route.pattern().key().to_string());
        if let Some(&i) = self.index.get(&key) {
            return Err(DuplicateRoute {
                method: key.0,
                route: route.pattern().raw().to_string(),
                existing: self.routes[i].name().to_string(),
            });
        }
        self.index.insert(key, self.routes.len());
        self.routes.push(Arc::new(route));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Freeze into the immutable serving table.
    pub fn freeze(self) -> DispatchTable {
        let mut exact = HashMap::new();
        let mut patterned = Vec::new();
        for route in &self.routes {
            if route.pattern().is_static() {
                exact.insert(
                    (route.method().clone(), route.pattern().key().to_string()),
                    route.clone(),
                );
            } else {
                patterned.push(route.clone());
            }
        }
        DispatchTable {
            routes: self.routes,
            exact,
            patterned,
        }
    }
}

/// Result of a successful lookup.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<ComposedRoute>,
    pub params: PathParams,
}

/// Immutable (method, path) → route mapping used while serving.
#[derive(Debug, Default)]
pub struct DispatchTable {
    routes: Vec<Arc<ComposedRoute>>,
    exact: HashMap<Key, Arc<ComposedRoute>>,
    patterned: Vec<Arc<ComposedRoute>>,
}

impl DispatchTable {
    pub fn lookup(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let normalized = normalize_path(path);
        if let Some(route) = self.exact.get(&(method.clone(), normalized)) {
            return Some(RouteMatch {
                route: route.clone(),
                params: PathParams::new(),
            });
        }

        self.patterned
            .iter()
            .filter(|r| r.method() == method)
            .find_map(|r| {
                r.pattern().matches(path).map(|params| RouteMatch {
                    route: r.clone(),
                    params,
                })
            })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Arc<ComposedRoute>> {
        self.routes.iter()
    }

    /// Count of entries for a (method, route) pair.
    pub fn count(&self, method: &Method, route: &str) -> usize {
        let Ok(pattern) = crate::routing::matcher::PathPattern::parse(route) else {
            return 0;
        };
        self.routes
            .iter()
            .filter(|r| r.method() == method && r.pattern().key() == pattern.key())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{Handler, HandlerRegistry, HandlerResult};
    use crate::http::{RequestContext, ResponseSink};
    use crate::middleware::compose;
    use crate::observability::access::{AccessSinks, MemorySink};
    use crate::routing::descriptor::{LogMode, RouteDescriptor};
    use crate::routing::matcher::PathPattern;
    use crate::storage::StoreHandle;
    use async_trait::async_trait;

    struct Noop;

    #[async_trait]
    impl Handler for Noop {
        async fn handle(
            &self,
            _ctx: &RequestContext,
            _res: &mut ResponseSink,
            _store: Option<StoreHandle>,
        ) -> HandlerResult {
            Ok(None)
        }
    }

    fn route(name: &str, method: Method, path: &str) -> ComposedRoute {
        let mut registry = HandlerRegistry::new();
        registry.register("noop", Noop);
        let descriptor = RouteDescriptor {
            name: name.into(),
            route: PathPattern::parse(path).unwrap(),
            method,
            log_mode: LogMode::None,
            storage_file: None,
            handler_id: "noop".into(),
            handler: registry.get("noop").unwrap(),
        };
        let sink = std::sync::Arc::new(MemorySink::new());
        let mut sinks = AccessSinks::with_sinks(sink.clone(), sink);
        compose(descriptor, None, &mut sinks).unwrap()
    }

    #[test]
    fn test_duplicate_rejected_first_kept() {
        let mut builder = DispatchTableBuilder::new();
        builder.insert(route("first", Method::GET, "/x")).unwrap();

        let err = builder.insert(route("second", Method::GET, "/x/")).unwrap_err();
        assert_eq!(err.existing, "first");
        assert_eq!(builder.existing(&Method::GET, "/x"), Some("first"));

        // Same path, different method is a different key
        builder.insert(route("post", Method::POST, "/x")).unwrap();

        let table = builder.freeze();
        assert_eq!(table.len(), 2);
        assert_eq!(table.count(&Method::GET, "/x"), 1);
        assert_eq!(table.lookup(&Method::GET, "/x").unwrap().route.name(), "first");
    }

    #[test]
    fn test_static_beats_patterned() {
        let mut builder = DispatchTableBuilder::new();
        builder.insert(route("by-id", Method::GET, "/users/:id")).unwrap();
        builder.insert(route("me", Method::GET, "/users/me")).unwrap();
        let table = builder.freeze();

        assert_eq!(table.lookup(&Method::GET, "/users/me").unwrap().route.name(), "me");
        let m = table.lookup(&Method::GET, "/users/7").unwrap();
        assert_eq!(m.route.name(), "by-id");
        assert_eq!(m.params["id"], "7");
    }

    #[test]
    fn test_no_match() {
        let mut builder = DispatchTableBuilder::new();
        builder.insert(route("root", Method::GET, "/")).unwrap();
        let table = builder.freeze();

        assert!(table.lookup(&Method::POST, "/").is_none());
        assert!(table.lookup(&Method::GET, "/missing").is_none());
    }
}
