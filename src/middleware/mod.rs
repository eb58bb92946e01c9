//! Per-route middleware.
//!
//! # Data Flow
//! ```text
//! RouteDescriptor + Option<StoreHandle>
//!     → composer.rs (log_mode → observer)
//!     → ComposedRoute (inserted into the dispatch table)
//! ```

pub mod composer;

pub use composer::{compose, ComposedRoute};
