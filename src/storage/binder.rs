//! Resource binder: store name → shared handle.
//!
//! # Responsibilities
//! - Open a store the first time a route names it
//! - Hand every later route naming the same store the same `Arc`
//! - Flush all handles at shutdown
//!
//! # Design Decisions
//! - One handle per name for the whole process; reuse is required for
//!   correctness since several manifests usually share a store
//! - A store that cannot be opened fails only the route that named it

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::storage::store::{Store, StoreError};

/// Shared store handle injected into handlers.
pub type StoreHandle = Arc<Store>;

/// Lazily opens and caches stores rooted under one directory.
#[derive(Debug)]
pub struct ResourceBinder {
    root: PathBuf,
    handles: DashMap<String, StoreHandle>,
}

impl ResourceBinder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            handles: DashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a route's optional store name to a handle.
    pub fn bind(&self, storage_file: Option<&str>) -> Result<Option<StoreHandle>, StoreError> {
        let Some(name) = storage_file else {
            return Ok(None);
        };

        if let Some(handle) = self.handles.get(name) {
            return Ok(Some(handle.value().clone()));
        }

        match self.handles.entry(name.to_string()) {
            Entry::Occupied(existing) => Ok(Some(existing.get().clone())),
            Entry::Vacant(slot) => {
                let handle = Arc::new(Store::open(&self.root, name)?);
                slot.insert(handle.clone());
                Ok(Some(handle))
            }
        }
    }

    /// Number of distinct stores opened so far.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Persist every open store. Errors are logged and the rest still flush.
    pub async fn flush_all(&self) {
        let handles: Vec<StoreHandle> = self.handles.iter().map(|r| r.value().clone()).collect();
        for handle in handles {
            match handle.flush().await {
                Ok(()) => tracing::info!(store = %handle.name(), "Store flushed"),
                Err(e) => tracing::error!(store = %handle.name(), error = %e, "Failed to flush store"),
            }
        }
    }
}
