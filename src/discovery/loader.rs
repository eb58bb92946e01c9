//! Descriptor loader: one candidate file → raw candidate value.

use std::fs;
use std::sync::Arc;

use serde::Deserialize;

use crate::discovery::error::RegistrationError;
use crate::discovery::walker::CandidatePath;
use crate::handlers::{Handler, HandlerRegistry};

/// Manifest fields exactly as written; nothing is checked yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawDescriptor {
    #[serde(default, alias = "Name")]
    pub name: Option<String>,

    #[serde(default, alias = "Route")]
    pub route: Option<String>,

    #[serde(default, alias = "Method")]
    pub method: Option<String>,

    #[serde(default, alias = "log", alias = "Log", alias = "logMode")]
    pub log_mode: Option<String>,

    #[serde(default, alias = "storage", alias = "Sqlite", alias = "storageFile")]
    pub storage_file: Option<String>,

    #[serde(default, alias = "handle")]
    pub handler: Option<String>,
}

/// A loaded candidate waiting for validation.
pub struct Candidate {
    pub source: CandidatePath,
    pub raw: RawDescriptor,
    /// Resolved from `raw.handler`; `None` only when the field is absent.
    pub handler: Option<Arc<dyn Handler>>,
}

impl std::fmt::Debug for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidate")
            .field("source", &self.source)
            .field("raw", &self.raw)
            .field("handler_resolved", &self.handler.is_some())
            .finish()
    }
}

/// Reads manifests and resolves their handler against the registry.
#[derive(Debug, Clone, Copy)]
pub struct DescriptorLoader<'a> {
    registry: &'a HandlerRegistry,
}

impl<'a> DescriptorLoader<'a> {
    pub fn new(registry: &'a HandlerRegistry) -> Self {
        Self { registry }
    }

    pub fn load(&self, source: CandidatePath) -> Result<Candidate, RegistrationError> {
        let fail = |reason: String| RegistrationError::ModuleLoad {
            label: source.label.clone(),
            reason,
        };

        let content = fs::read_to_string(&source.path).map_err(|e| fail(e.to_string()))?;

        let extension = source
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let raw: RawDescriptor = match extension.as_deref() {
            Some("toml") => toml::from_str(&content).map_err(|e| fail(e.to_string()))?,
            Some("json") => serde_json::from_str(&content).map_err(|e| fail(e.to_string()))?,
            _ => return Err(fail("unsupported manifest type (expected .toml or .json)".to_string())),
        };

        let handler = match raw.handler.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(id) => match self.registry.get(id) {
                Some(handler) => Some(handler),
                None => return Err(fail(format!("handler '{id}' is not registered"))),
            },
        };

        Ok(Candidate {
            source,
            raw,
            handler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::handlers::builtin_registry;
    use std::path::Path;

    fn candidate(dir: &Path, file: &str, content: &str) -> CandidatePath {
        let path = dir.join(file);
        fs::write(&path, content).unwrap();
        CandidatePath {
            path,
            label: file.to_string(),
            namespace: String::new(),
        }
    }

    #[test]
    fn test_loads_toml_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let registry = builtin_registry(&AppConfig::default());
        let source = candidate(
            dir.path(),
            "signup.toml",
            r#"
            name = "Signup"
            route = "/auth/signup"
            method = "POST"
            log = "File"
            storage = "users.store"
            handler = "signup"
            "#,
        );

        let loaded = DescriptorLoader::new(&registry).load(source).unwrap();
        assert_eq!(loaded.raw.name.as_deref(), Some("Signup"));
        assert_eq!(loaded.raw.log_mode.as_deref(), Some("File"));
        assert_eq!(loaded.raw.storage_file.as_deref(), Some("users.store"));
        assert!(loaded.handler.is_some());
    }

    #[test]
    fn test_loads_json_manifest_with_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let registry = builtin_registry(&AppConfig::default());
        let source = candidate(
            dir.path(),
            "main.json",
            r#"{"Name":"Main","Route":"/","Method":"GET","Log":null,"Sqlite":null,"handle":"main"}"#,
        );

        let loaded = DescriptorLoader::new(&registry).load(source).unwrap();
        assert_eq!(loaded.raw.route.as_deref(), Some("/"));
        assert_eq!(loaded.raw.log_mode, None);
        assert_eq!(loaded.raw.storage_file, None);
    }

    #[test]
    fn test_missing_handler_field_still_loads() {
        let dir = tempfile::tempdir().unwrap();
        let registry = HandlerRegistry::new();
        let source = candidate(dir.path(), "partial.toml", "name = \"Partial\"\n");

        let loaded = DescriptorLoader::new(&registry).load(source).unwrap();
        assert!(loaded.handler.is_none());
    }

    #[test]
    fn test_load_failures() {
        let dir = tempfile::tempdir().unwrap();
        let registry = HandlerRegistry::new();
        let loader = DescriptorLoader::new(&registry);

        let cases = [
            candidate(dir.path(), "broken.toml", "name = "),
            candidate(dir.path(), "notes.txt", "hello"),
            candidate(dir.path(), "ghost.toml", "handler = \"ghost\"\n"),
        ];
        for source in cases {
            let label = source.label.clone();
            match loader.load(source) {
                Err(RegistrationError::ModuleLoad { label: l, .. }) => assert_eq!(l, label),
                other => panic!("{label}: expected ModuleLoad, got {other:?}"),
            }
        }
    }
}
