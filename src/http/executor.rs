//! Executor: the error boundary around every handler invocation.
//!
//! # Lifecycle
//! ```text
//! Received → Routed{matched} → Handling
//!     → CompletedByHandler   handler wrote the sink
//!     → CompletedByDefault   handler returned a body (or nothing) unsent
//!     → Failed               Err, panic, or unreadable body
//! → Observed (if the route has an observer) → Sent
//! ```
//!
//! # Design Decisions
//! - Failures are logged with the route; the client only ever gets the
//!   generic 500 body, and only if the handler had not already responded
//! - Panics are caught, so a synchronous blow-up and an error returned
//!   after an await look the same from outside
//! - Exactly one observation per request, after the response is final

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use futures_util::FutureExt;

use crate::handlers::HandlerError;
use crate::http::context::RequestContext;
use crate::http::fallback::internal_error;
use crate::http::sink::ResponseSink;
use crate::routing::RouteMatch;

/// How a request finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    ByHandler,
    ByDefault,
    Failed,
}

/// Run the matched route's handler for `request`.
///
/// `started` is when the request was received; it is the start of the
/// observed duration.
pub async fn execute(
    matched: RouteMatch,
    request: Request<Body>,
    max_body_bytes: usize,
    started: Instant,
) -> Response {
    let route = matched.route;
    let method = request.method().clone();
    let url = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let mut sink = ResponseSink::new();
    let outcome = match RequestContext::from_request(request, route.pattern().raw(), matched.params, max_body_bytes).await {
        Ok(ctx) => {
            let store = route.store().cloned();
            AssertUnwindSafe(route.handler().handle(&ctx, &mut sink, store))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(HandlerError::Panicked(panic_message(&panic))))
        }
        Err(e) => Err(e),
    };

    let completion = match outcome {
        Ok(Some(body)) if !sink.is_sent() => {
            sink.send_value(body);
            Completion::ByDefault
        }
        Ok(_) if sink.is_sent() => Completion::ByHandler,
        Ok(_) => Completion::ByDefault,
        Err(error) => {
            tracing::error!(
                route = %route.pattern(),
                name = %route.name(),
                method = %method,
                url = %url,
                error = %error,
                "Handler failed"
            );
            Completion::Failed
        }
    };

    let response = if completion == Completion::Failed && !sink.is_sent() {
        internal_error()
    } else {
        sink.into_response()
    };

    tracing::trace!(route = %route.pattern(), ?completion, status = %response.status(), "Request completed");
    route.observe(&method, &url, response.status().as_u16(), started);
    response
}

fn panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
