//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → table.rs (exact lookup, then pattern scan)
//!     → matcher.rs (evaluate pattern, capture params)
//!     → Return: RouteMatch or NoMatch
//!
//! Route Compilation (at startup):
//!     validated RouteDescriptor[]
//!     → composed with store + observer
//!     → DispatchTableBuilder (duplicate keys rejected)
//!     → Freeze as immutable DispatchTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always matches same route
//! - Explicit NoMatch rather than silent default

pub mod descriptor;
pub mod matcher;
pub mod table;

pub use descriptor::{LogMode, RouteDescriptor};
pub use matcher::{PathParams, PathPattern};
pub use table::{DispatchTable, DispatchTableBuilder, DuplicateRoute, RouteMatch};
