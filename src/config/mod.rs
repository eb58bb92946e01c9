//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, or defaults)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → handed to discovery, storage, observability and the HTTP server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the dispatch table it feeds is too
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError, ConfigSource};
pub use schema::AppConfig;
pub use schema::ObservabilityConfig;
