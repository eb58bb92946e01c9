//! Convention-based route discovery and request dispatch.
//!
//! Route manifests found under a directory tree are validated, bound to
//! their stores and access sinks, and frozen into a dispatch table that a
//! single Axum fallback handler serves from.

pub mod config;
pub mod discovery;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod middleware;
pub mod observability;
pub mod report;
pub mod routing;
pub mod storage;

pub use config::schema::AppConfig;
pub use handlers::{Handler, HandlerRegistry};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
