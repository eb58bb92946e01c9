//! Registration failures.

use thiserror::Error;

use crate::discovery::walker::WalkError;
use crate::routing::DuplicateRoute;

/// Why a candidate did not make it into the dispatch table.
///
/// None of these abort registration: each becomes a failed report row and
/// the walk carries on.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The candidate could not be read, parsed, or names an unknown handler.
    #[error("failed to load {label}: {reason}")]
    ModuleLoad { label: String, reason: String },

    /// Required fields are missing or hold unusable values.
    #[error("{label} is not a valid route: {reason}")]
    ModuleShape { label: String, reason: String },

    #[error("{label} rejected: {source}")]
    DuplicateRoute {
        label: String,
        #[source]
        source: DuplicateRoute,
    },

    /// A storage handle or log sink for the route could not be opened.
    #[error("{label} rejected: resource '{resource}' unavailable: {reason}")]
    Resource {
        label: String,
        resource: String,
        reason: String,
    },

    /// A subtree could not be walked (cycle, depth, IO).
    #[error("{label} skipped: {source}")]
    Walk {
        label: String,
        #[source]
        source: WalkError,
    },
}

impl RegistrationError {
    /// Label of the candidate (or subtree) this error belongs to.
    pub fn label(&self) -> &str {
        match self {
            RegistrationError::ModuleLoad { label, .. }
            | RegistrationError::ModuleShape { label, .. }
            | RegistrationError::DuplicateRoute { label, .. }
            | RegistrationError::Resource { label, .. }
            | RegistrationError::Walk { label, .. } => label,
        }
    }

    /// Short machine-friendly kind, used in logs and the report.
    pub fn kind(&self) -> &'static str {
        match self {
            RegistrationError::ModuleLoad { .. } => "module_load",
            RegistrationError::ModuleShape { .. } => "module_shape",
            RegistrationError::DuplicateRoute { .. } => "duplicate_route",
            RegistrationError::Resource { .. } => "resource",
            RegistrationError::Walk { .. } => "walk",
        }
    }
}
