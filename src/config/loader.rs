//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Where a loaded configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    File,
    Defaults,
}

/// Load the file at `path` if it exists, otherwise fall back to defaults.
///
/// Defaults are validated too, so a bad `Default` impl still fails loudly.
/// Nothing is logged here; this runs before the subscriber is installed.
pub fn load_or_default(path: &Path) -> Result<(AppConfig, ConfigSource), ConfigError> {
    if path.exists() {
        return Ok((load_config(path)?, ConfigSource::File));
    }
    let config = AppConfig::default();
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok((config, ConfigSource::Defaults))
}
