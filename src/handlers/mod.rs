//! Route handlers and the registry manifests refer to.
//!
//! # Data Flow
//! ```text
//! startup:
//!     builtin_registry() / HandlerRegistry::register
//!     → manifest `handler = "signup"` resolved by the descriptor loader
//!
//! per request:
//!     executor → Handler::handle(ctx, sink, store)
//!     → Ok(Some(body)) | Ok(None) | Err(HandlerError)
//! ```
//!
//! # Design Decisions
//! - Handler code is compiled in; discovery only reads declarative
//!   manifests, so nothing executes while the tree is being scanned
//! - Handlers receive the store handle at call time instead of capturing it

pub mod error;
pub mod landing;
pub mod signup;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::AppConfig;
use crate::http::{RequestContext, ResponseSink};
use crate::storage::StoreHandle;

pub use error::HandlerError;
pub use landing::LandingPage;
pub use signup::Signup;

/// What a handler resolves to.
///
/// `Some(body)` asks the executor to send `body` unless the handler already
/// wrote the response itself.
pub type HandlerResult = Result<Option<Value>, HandlerError>;

/// A route's request handler.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(
        &self,
        ctx: &RequestContext,
        res: &mut ResponseSink,
        store: Option<StoreHandle>,
    ) -> HandlerResult;
}

/// Handler identifiers available to manifests.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `id`, replacing any previous entry.
    pub fn register(&mut self, id: impl Into<String>, handler: impl Handler) -> &mut Self {
        let id = id.into();
        if self.handlers.insert(id.clone(), Arc::new(handler)).is_some() {
            tracing::warn!(handler = %id, "Handler registered twice, keeping the latest");
        }
        self
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Handler>> {
        self.handlers.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.ids())
            .finish()
    }
}

/// Registry with the handlers shipped in this crate.
pub fn builtin_registry(config: &AppConfig) -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry
        .register("main", LandingPage::new(&config.assets.public_dir))
        .register("signup", Signup);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids() {
        let registry = builtin_registry(&AppConfig::default());
        assert_eq!(registry.ids(), vec!["main", "signup"]);
        assert!(registry.get("main").is_some());
        assert!(registry.get("missing").is_none());
    }
}
