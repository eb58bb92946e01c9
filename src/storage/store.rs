//! File-backed key/value store handed to route handlers.

use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors raised while opening or persisting a store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid store name '{0}': must be a plain file name")]
    InvalidName(String),

    #[error("store IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store file {} is not valid JSON: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode store contents: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A named store. Shared across routes and requests as `Arc<Store>`.
///
/// Entries live in a `DashMap` so concurrent handlers never block each other
/// on reads. Every mutation is written through to disk; writes are serialized
/// by an async mutex and always snapshot the latest state.
#[derive(Debug)]
pub struct Store {
    name: String,
    path: PathBuf,
    entries: DashMap<String, Value>,
    persist_lock: Mutex<()>,
}

impl Store {
    /// Open the store called `name` under `dir`, loading existing contents.
    pub fn open(dir: &Path, name: &str) -> Result<Self, StoreError> {
        validate_name(name)?;

        fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(name);
        let entries = DashMap::new();

        if path.exists() {
            let content = fs::read(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            if !content.iter().all(u8::is_ascii_whitespace) {
                let map: HashMap<String, Value> =
                    serde_json::from_slice(&content).map_err(|source| StoreError::Corrupt {
                        path: path.clone(),
                        source,
                    })?;
                for (k, v) in map {
                    entries.insert(k, v);
                }
            }
        }

        tracing::info!(store = %name, path = %path.display(), entries = entries.len(), "Store opened");

        Ok(Self {
            name: name.to_string(),
            path,
            entries,
            persist_lock: Mutex::new(()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|r| r.value().clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert only if `key` is absent. Returns false when it already existed.
    ///
    /// If the write to disk fails the entry is removed again, so memory never
    /// holds a record the file does not.
    pub async fn insert_new(&self, key: impl Into<String>, value: Value) -> Result<bool, StoreError> {
        let key = key.into();
        let inserted = match self.entries.entry(key.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        };
        if inserted {
            if let Err(e) = self.flush().await {
                self.entries.remove(&key);
                return Err(e);
            }
        }
        Ok(inserted)
    }

    /// Insert or replace, returning the previous value. Rolled back if the
    /// write fails.
    pub async fn put(&self, key: impl Into<String>, value: Value) -> Result<Option<Value>, StoreError> {
        let key = key.into();
        let previous = self.entries.insert(key.clone(), value);
        if let Err(e) = self.flush().await {
            match previous {
                Some(previous) => {
                    self.entries.insert(key, previous);
                }
                None => {
                    self.entries.remove(&key);
                }
            }
            return Err(e);
        }
        Ok(previous)
    }

    /// Remove `key`. Restored if the write fails.
    pub async fn remove(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let removed = self.entries.remove(key).map(|(_, v)| v);
        if let Some(value) = &removed {
            if let Err(e) = self.flush().await {
                self.entries.insert(key.to_string(), value.clone());
                return Err(e);
            }
        }
        Ok(removed)
    }

    /// Write the current contents to disk atomically (temp file + rename).
    pub async fn flush(&self) -> Result<(), StoreError> {
        let _guard = self.persist_lock.lock().await;

        let snapshot: BTreeMap<String, Value> = self
            .entries
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();
        let bytes = serde_json::to_vec_pretty(&snapshot)?;

        let mut tmp: OsString = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(store = %self.name, entries = snapshot.len(), "Store persisted");
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), StoreError> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0']);
    if plain {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}
