//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber once, at startup
//! - Honor `RUST_LOG`, falling back to the configured level
//! - Append error-level events to the error log as well as the console
//!
//! # Design Decisions
//! - Console output is human readable; the error log has no ANSI codes
//! - An empty `error_log` path disables the file layer

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::ObservabilityConfig;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot open error log {path}: {source}")]
    ErrorLog {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("logging already initialized: {0}")]
    Init(#[from] TryInitError),
}

/// Default filter when `RUST_LOG` is unset.
fn default_directives(level: &str) -> String {
    format!("autoroute={level},tower_http={level},{level}")
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(level)))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Open the error log for appending, or `None` if disabled.
pub fn open_error_log(path: &Path) -> Result<Option<File>, LoggingError> {
    if path.as_os_str().is_empty() {
        return Ok(None);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| LoggingError::ErrorLog {
            path: path.display().to_string(),
            source,
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(Some)
        .map_err(|source| LoggingError::ErrorLog {
            path: path.display().to_string(),
            source,
        })
}

/// Install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), LoggingError> {
    let error_layer = open_error_log(&config.error_log)?.map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .with_filter(LevelFilter::ERROR)
    });

    tracing_subscriber::registry()
        .with(build_filter(&config.log_level))
        .with(fmt::layer())
        .with(error_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives_cover_crate_and_http() {
        let d = default_directives("debug");
        assert!(d.starts_with("autoroute=debug"));
        assert!(d.contains("tower_http=debug"));
        assert!(EnvFilter::try_new(d).is_ok());
    }

    #[test]
    fn test_empty_error_log_is_disabled() {
        assert!(open_error_log(Path::new("")).unwrap().is_none());
    }

    #[test]
    fn test_error_log_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/error.log");
        assert!(open_error_log(&path).unwrap().is_some());
        assert!(path.exists());
    }
}
