//! Route discovery subsystem.
//!
//! # Data Flow
//! ```text
//! routes/ (manifest tree)
//!     → walker.rs (depth-first, sorted, cycle/depth guarded)
//!     → loader.rs (parse manifest, resolve handler id)
//!     → validator.rs (mandatory fields, method, pattern, duplicates)
//!     → ResourceBinder (storage_file → shared handle)
//!     → middleware::compose (log_mode → observer)
//!     → DispatchTableBuilder
//!
//! Every candidate, loaded or not, appends one row to the report.
//! ```
//!
//! # Design Decisions
//! - Runs once, synchronously, before the listener accepts traffic
//! - One bad candidate never stops the others (partial-failure isolation)
//! - The namespace a candidate was found under never changes its route

pub mod error;
pub mod loader;
pub mod validator;
pub mod walker;

use std::path::PathBuf;

use crate::handlers::HandlerRegistry;
use crate::middleware::compose;
use crate::observability::access::AccessSinks;
use crate::report::RegistrationReport;
use crate::routing::{DispatchTable, DispatchTableBuilder};
use crate::storage::ResourceBinder;

pub use error::RegistrationError;
pub use loader::{Candidate, DescriptorLoader, RawDescriptor};
pub use walker::{CandidatePath, WalkError, WalkItem, Walker};

/// What registration produced.
#[derive(Debug)]
pub struct Registration {
    pub table: DispatchTable,
    pub report: RegistrationReport,
}

/// One registration pass over a routes directory.
pub struct Discovery<'a> {
    walker: Walker,
    loader: DescriptorLoader<'a>,
    binder: &'a ResourceBinder,
    sinks: &'a mut AccessSinks,
}

impl<'a> Discovery<'a> {
    pub fn new(
        root: impl Into<PathBuf>,
        max_depth: usize,
        registry: &'a HandlerRegistry,
        binder: &'a ResourceBinder,
        sinks: &'a mut AccessSinks,
    ) -> Self {
        Self {
            walker: Walker::new(root, max_depth),
            loader: DescriptorLoader::new(registry),
            binder,
            sinks,
        }
    }

    /// Walk, validate and compose every candidate.
    pub fn run(self) -> Registration {
        let Discovery {
            walker,
            loader,
            binder,
            sinks,
        } = self;

        tracing::info!(root = %walker.root().display(), "Discovering routes");

        let mut builder = DispatchTableBuilder::new();
        let mut report = RegistrationReport::new();

        for item in walker.walk() {
            let source = match item {
                WalkItem::Candidate(source) => source,
                WalkItem::Rejected { label, error } => {
                    let error = RegistrationError::Walk { label, source: error };
                    tracing::error!(kind = error.kind(), "{error}");
                    report.record_failed(&error);
                    continue;
                }
            };

            tracing::debug!(candidate = %source.label, namespace = %source.namespace, "Loading candidate");

            match register_one(source, &loader, binder, sinks, &mut builder) {
                Ok(descriptor) => {
                    tracing::debug!(
                        name = %descriptor.name,
                        method = %descriptor.method,
                        route = %descriptor.route,
                        log_mode = %descriptor.log_mode,
                        storage = descriptor.storage_file.as_deref().unwrap_or("-"),
                        "Route registered"
                    );
                    report.record_ok(&descriptor);
                }
                Err(error) => {
                    tracing::error!(kind = error.kind(), "{error}");
                    report.record_failed(&error);
                }
            }
        }

        Registration {
            table: builder.freeze(),
            report,
        }
    }
}

/// Load, validate, bind and compose one candidate. Returns a copy of the
/// registered descriptor for reporting.
fn register_one(
    source: CandidatePath,
    loader: &DescriptorLoader<'_>,
    binder: &ResourceBinder,
    sinks: &mut AccessSinks,
    builder: &mut DispatchTableBuilder,
) -> Result<crate::routing::RouteDescriptor, RegistrationError> {
    let label = source.label.clone();
    let candidate = loader.load(source)?;
    let descriptor = validator::validate(candidate)?;
    validator::ensure_unique(&label, &descriptor, builder)?;

    let store = binder
        .bind(descriptor.storage_file.as_deref())
        .map_err(|e| RegistrationError::Resource {
            label: label.clone(),
            resource: descriptor.storage_file.clone().unwrap_or_default(),
            reason: e.to_string(),
        })?;

    let composed = compose(descriptor.clone(), store, sinks).map_err(|e| RegistrationError::Resource {
        label: label.clone(),
        resource: "access log".to_string(),
        reason: e.to_string(),
    })?;

    builder
        .insert(composed)
        .map_err(|source| RegistrationError::DuplicateRoute { label, source })?;

    Ok(descriptor)
}
