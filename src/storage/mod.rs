//! Persistent storage subsystem.
//!
//! # Data Flow
//! ```text
//! Registration:
//!     manifest storage_file = "users.store"
//!     → binder.rs (cache hit, or open under storage.dir)
//!     → Arc<Store> kept on the composed route
//!
//! Serving:
//!     executor passes the handle to the handler
//!     → store.rs (DashMap entries, write-through JSON file)
//!
//! Shutdown:
//!     binder.flush_all()
//! ```

pub mod binder;
pub mod store;

pub use binder::{ResourceBinder, StoreHandle};
pub use store::{Store, StoreError};
