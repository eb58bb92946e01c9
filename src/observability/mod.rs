//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events: console + error log)
//!
//! Observed routes produce:
//!     → access.rs (one AccessEvent per finished request)
//!         log_mode Console → tracing target "access"
//!         log_mode File    → JSON lines in the access log
//! ```
//!
//! # Design Decisions
//! - Access events go through a sink trait so tests can capture them
//! - Request ID is set by the HTTP layer and flows into every span

pub mod access;
pub mod logging;

pub use access::{AccessEvent, AccessSink, AccessSinks, ConsoleSink, FileSink, MemorySink};
pub use logging::{init_logging, LoggingError};
