//! Route validator.
//!
//! # Responsibilities
//! - Require `name`, `route`, `method` and `handler`
//! - Parse the method against the supported set and the route pattern
//! - Reject a (method, route) that the dispatch table already holds
//!
//! # Design Decisions
//! - Every missing field is listed in one error, not just the first
//! - An unrecognized `log_mode` is a warning and falls back to None; only
//!   the four mandatory fields decide validity

use crate::discovery::error::RegistrationError;
use crate::discovery::loader::Candidate;
use crate::routing::descriptor::{parse_method, LogMode, RouteDescriptor};
use crate::routing::matcher::PathPattern;
use crate::routing::table::{DispatchTableBuilder, DuplicateRoute};

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Check a loaded candidate against the descriptor contract.
pub fn validate(candidate: Candidate) -> Result<RouteDescriptor, RegistrationError> {
    let label = candidate.source.label.clone();
    let raw = &candidate.raw;
    let shape = |reason: String| RegistrationError::ModuleShape {
        label: label.clone(),
        reason,
    };

    let name = present(&raw.name);
    let route = present(&raw.route);
    let method = present(&raw.method);
    let handler_id = present(&raw.handler);

    let missing: Vec<&str> = [
        ("name", name.is_some()),
        ("route", route.is_some()),
        ("method", method.is_some()),
        ("handler", handler_id.is_some() && candidate.handler.is_some()),
    ]
    .into_iter()
    .filter(|(_, ok)| !ok)
    .map(|(field, _)| field)
    .collect();

    let (Some(name), Some(route), Some(method), Some(handler_id), Some(handler)) =
        (name, route, method, handler_id, candidate.handler.clone())
    else {
        return Err(shape(format!("missing required field(s): {}", missing.join(", "))));
    };

    let method = parse_method(method)
        .ok_or_else(|| shape(format!("unsupported method '{method}'")))?;
    let pattern = PathPattern::parse(route).map_err(|e| shape(format!("route '{route}': {e}")))?;

    let log_mode = match present(&raw.log_mode) {
        None => LogMode::None,
        Some(value) => LogMode::parse(value).unwrap_or_else(|| {
            tracing::warn!(candidate = %label, log_mode = %value, "Unknown log mode, logging disabled for route");
            LogMode::None
        }),
    };

    Ok(RouteDescriptor {
        name: name.to_string(),
        route: pattern,
        method,
        log_mode,
        storage_file: present(&raw.storage_file).map(str::to_string),
        handler_id: handler_id.to_string(),
        handler,
    })
}

/// Reject `descriptor` if its (method, route) is already registered.
pub fn ensure_unique(
    label: &str,
    descriptor: &RouteDescriptor,
    table: &DispatchTableBuilder,
) -> Result<(), RegistrationError> {
    match table.existing(&descriptor.method, descriptor.route.key()) {
        None => Ok(()),
        Some(existing) => Err(RegistrationError::DuplicateRoute {
            label: label.to_string(),
            source: DuplicateRoute {
                method: descriptor.method.clone(),
                route: descriptor.route.raw().to_string(),
                existing: existing.to_string(),
            },
        }),
    }
}
