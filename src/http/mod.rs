//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, CORS)
//!     → DispatchTable lookup (method, path)
//!         unmatched → fallback.rs (fixed 404 page)
//!         matched   → executor.rs
//!                       → context.rs (buffer body, params, cookies)
//!                       → handler(ctx, sink, store)
//!                       → sink.rs (handler or default response)
//!                       → fallback.rs (generic 500 on failure)
//!     → Send to client
//! ```

pub mod context;
pub mod executor;
pub mod fallback;
pub mod server;
pub mod sink;

pub use context::{RequestContext, X_REQUEST_ID};
pub use executor::{execute, Completion};
pub use fallback::{internal_error, NotFoundPage, GENERIC_FAILURE_MESSAGE};
pub use server::{AppState, HttpServer};
pub use sink::ResponseSink;
