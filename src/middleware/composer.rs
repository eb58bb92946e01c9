//! Middleware composition.
//!
//! # Responsibilities
//! - Pair a validated descriptor with its bound store handle
//! - Attach the access observer its log mode asks for
//!
//! # Design Decisions
//! - Composition happens once at registration; the result is immutable
//! - The observer is invoked by the executor exactly once per request,
//!   after the final response is resolved, whatever the handler did

use std::io;
use std::sync::Arc;
use std::time::Instant;

use axum::http::Method;

use crate::handlers::Handler;
use crate::observability::access::{AccessEvent, AccessSink, AccessSinks};
use crate::routing::descriptor::{LogMode, RouteDescriptor};
use crate::routing::matcher::PathPattern;
use crate::storage::StoreHandle;

/// A descriptor ready to be served.
pub struct ComposedRoute {
    descriptor: RouteDescriptor,
    store: Option<StoreHandle>,
    observer: Option<Arc<dyn AccessSink>>,
}

impl ComposedRoute {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn method(&self) -> &Method {
        &self.descriptor.method
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.descriptor.route
    }

    pub fn log_mode(&self) -> LogMode {
        self.descriptor.log_mode
    }

    pub fn descriptor(&self) -> &RouteDescriptor {
        &self.descriptor
    }

    pub fn handler(&self) -> &dyn Handler {
        self.descriptor.handler.as_ref()
    }

    pub fn store(&self) -> Option<&StoreHandle> {
        self.store.as_ref()
    }

    pub fn is_observed(&self) -> bool {
        self.observer.is_some()
    }

    /// Record the completion event, if this route is instrumented.
    pub fn observe(&self, method: &Method, url: &str, status: u16, started: Instant) {
        if let Some(observer) = &self.observer {
            observer.record(&AccessEvent::finished(method.as_str(), url, status, started));
        }
    }
}

impl std::fmt::Debug for ComposedRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposedRoute")
            .field("descriptor", &self.descriptor)
            .field("store", &self.store.as_ref().map(|s| s.name().to_string()))
            .field("observer", &self.observer)
            .finish()
    }
}

/// Attach the observer for `descriptor.log_mode`.
///
/// Fails only when the file sink is needed and cannot be opened.
pub fn compose(
    descriptor: RouteDescriptor,
    store: Option<StoreHandle>,
    sinks: &mut AccessSinks,
) -> io::Result<ComposedRoute> {
    let observer = sinks.sink_for(descriptor.log_mode)?;
    Ok(ComposedRoute {
        descriptor,
        store,
        observer,
    })
}
