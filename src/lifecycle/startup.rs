//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the resource binder and access sinks from configuration
//! - Run route discovery once, before any listener exists
//!
//! # Design Decisions
//! - Registration never fails as a whole; bad candidates become failed
//!   report rows and the rest still serve
//! - The binder outlives the server so stores can be flushed on exit

use crate::config::AppConfig;
use crate::discovery::{Discovery, Registration};
use crate::handlers::HandlerRegistry;
use crate::observability::AccessSinks;
use crate::report::RegistrationReport;
use crate::routing::DispatchTable;
use crate::storage::ResourceBinder;

/// Everything registration hands to the serving phase.
#[derive(Debug)]
pub struct Registered {
    pub table: DispatchTable,
    pub report: RegistrationReport,
    pub binder: ResourceBinder,
}

/// Discover, validate and compose every route under the configured root.
pub fn register_routes(config: &AppConfig, registry: &HandlerRegistry) -> Registered {
    let binder = ResourceBinder::new(config.storage.dir.clone());
    let mut sinks = AccessSinks::new(config.observability.access_log.clone());

    let Registration { table, report } = Discovery::new(
        config.discovery.routes_dir.clone(),
        config.discovery.max_depth,
        registry,
        &binder,
        &mut sinks,
    )
    .run();

    tracing::info!(
        routes = table.len(),
        stores = binder.len(),
        failed = report.len() - report.active_routes(),
        "Registration complete"
    );

    Registered {
        table,
        report,
        binder,
    }
}
