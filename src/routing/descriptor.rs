//! Validated route descriptors.

use std::sync::Arc;

use axum::http::Method;

use crate::handlers::Handler;
use crate::routing::matcher::PathPattern;

/// Per-route access logging, as declared by `log_mode` in a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    #[default]
    None,
    /// One event per request to the console sink.
    Console,
    /// One event per request appended to the access log file.
    File,
}

impl LogMode {
    /// Parse a manifest value. `None` for unrecognized spellings.
    ///
    /// `"Null"` and `"None"` are accepted as explicit opt-outs.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "null" | "off" => Some(LogMode::None),
            "console" => Some(LogMode::Console),
            "file" => Some(LogMode::File),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogMode::None => "None",
            LogMode::Console => "Console",
            LogMode::File => "File",
        };
        f.write_str(s)
    }
}

/// Methods a manifest may declare.
pub const SUPPORTED_METHODS: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::HEAD,
    Method::OPTIONS,
];

/// Parse a manifest method, case-insensitively, against [`SUPPORTED_METHODS`].
pub fn parse_method(value: &str) -> Option<Method> {
    let upper = value.trim().to_ascii_uppercase();
    SUPPORTED_METHODS
        .iter()
        .find(|m| m.as_str() == upper)
        .cloned()
}

/// A route unit that passed validation.
///
/// Read-only once built; the dispatch table shares it behind an `Arc`.
#[derive(Clone)]
pub struct RouteDescriptor {
    /// Used for reporting only.
    pub name: String,
    pub route: PathPattern,
    pub method: Method,
    pub log_mode: LogMode,
    /// Store name; `None` means no handle is injected.
    pub storage_file: Option<String>,
    /// Registry identifier the manifest named.
    pub handler_id: String,
    pub handler: Arc<dyn Handler>,
}

impl std::fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("name", &self.name)
            .field("route", &self.route.raw())
            .field("method", &self.method)
            .field("log_mode", &self.log_mode)
            .field("storage_file", &self.storage_file)
            .field("handler", &self.handler_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_mode_spellings() {
        assert_eq!(LogMode::parse("File"), Some(LogMode::File));
        assert_eq!(LogMode::parse("console"), Some(LogMode::Console));
        assert_eq!(LogMode::parse("Null"), Some(LogMode::None));
        assert_eq!(LogMode::parse("syslog"), None);
    }

    #[test]
    fn test_method_parsing_is_case_insensitive() {
        assert_eq!(parse_method("post"), Some(Method::POST));
        assert_eq!(parse_method(" Patch "), Some(Method::PATCH));
        assert_eq!(parse_method("BREW"), None);
    }
}
