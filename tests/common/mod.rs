//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt;

use autoroute::config::AppConfig;
use autoroute::handlers::{builtin_registry, Handler, HandlerError, HandlerRegistry, HandlerResult};
use autoroute::http::{HttpServer, RequestContext, ResponseSink};
use autoroute::lifecycle::{register_routes, Registered};
use autoroute::storage::StoreHandle;

/// A scratch project: routes, public assets, stores and logs under one
/// temporary directory.
pub struct Fixture {
    pub dir: TempDir,
    pub config: AppConfig,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("routes")).unwrap();
        std::fs::create_dir_all(root.join("public")).unwrap();

        let mut config = AppConfig::default();
        config.listener.bind_address = "127.0.0.1:0".to_string();
        config.discovery.routes_dir = root.join("routes");
        config.storage.dir = root.join("database");
        config.assets.public_dir = root.join("public");
        config.observability.access_log = root.join("combined.log");
        config.observability.error_log = PathBuf::new();

        Self { dir, config }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `contents` to `routes/<rel>`, creating directories.
    pub fn manifest(&self, rel: &str, contents: &str) -> &Self {
        let path = self.config.discovery.routes_dir.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
        self
    }

    /// Write a TOML manifest from its fields.
    pub fn route(&self, rel: &str, name: &str, method: &str, route: &str, handler: &str) -> &Self {
        self.manifest(
            rel,
            &format!("name = \"{name}\"\nroute = \"{route}\"\nmethod = \"{method}\"\nhandler = \"{handler}\"\n"),
        )
    }

    pub fn public(&self, file: &str, contents: &str) -> &Self {
        std::fs::write(self.config.assets.public_dir.join(file), contents).unwrap();
        self
    }

    pub fn register(&self) -> Registered {
        register_routes(&self.config, &test_registry(&self.config))
    }

    /// Register and build the in-process router.
    pub fn app(&self) -> Router {
        let registered = self.register();
        HttpServer::new(&self.config, registered.table).router()
    }

    /// Lines of the access log, parsed.
    pub fn access_events(&self) -> Vec<serde_json::Value> {
        match std::fs::read_to_string(&self.config.observability.access_log) {
            Ok(content) => content
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// Send one request through the router.
pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn status_and_body(response: Response) -> (StatusCode, String) {
    let status = response.status();
    (status, body_string(response).await)
}

/// Built-in handlers plus the test handlers below.
pub fn test_registry(config: &AppConfig) -> HandlerRegistry {
    let mut registry = builtin_registry(config);
    registry
        .register("echo", EchoParams)
        .register("fail_now", FailsImmediately)
        .register("fail_later", FailsAfterAwait)
        .register("panics", Panics)
        .register("direct", WritesDirectly)
        .register("store_name", StoreName);
    registry
}

/// Returns the route, path params and query as JSON.
pub struct EchoParams;

#[async_trait]
impl Handler for EchoParams {
    async fn handle(&self, ctx: &RequestContext, _res: &mut ResponseSink, _store: Option<StoreHandle>) -> HandlerResult {
        Ok(Some(json!({
            "route": ctx.route(),
            "params": ctx.params(),
            "q": ctx.query("q"),
        })))
    }
}

pub struct FailsImmediately;

#[async_trait]
impl Handler for FailsImmediately {
    async fn handle(&self, _ctx: &RequestContext, _res: &mut ResponseSink, _store: Option<StoreHandle>) -> HandlerResult {
        Err(HandlerError::msg("secret detail: failed before any await"))
    }
}

pub struct FailsAfterAwait;

#[async_trait]
impl Handler for FailsAfterAwait {
    async fn handle(&self, _ctx: &RequestContext, _res: &mut ResponseSink, _store: Option<StoreHandle>) -> HandlerResult {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Err(HandlerError::msg("secret detail: failed after an await"))
    }
}

pub struct Panics;

#[async_trait]
impl Handler for Panics {
    async fn handle(&self, _ctx: &RequestContext, _res: &mut ResponseSink, _store: Option<StoreHandle>) -> HandlerResult {
        tokio::task::yield_now().await;
        panic!("secret detail: handler panicked");
    }
}

/// Writes the response itself and returns nothing.
pub struct WritesDirectly;

#[async_trait]
impl Handler for WritesDirectly {
    async fn handle(&self, _ctx: &RequestContext, res: &mut ResponseSink, _store: Option<StoreHandle>) -> HandlerResult {
        res.status(StatusCode::CREATED).json(&json!({ "written": true }))?;
        Ok(None)
    }
}

/// Reports which store, if any, was injected.
pub struct StoreName;

#[async_trait]
impl Handler for StoreName {
    async fn handle(&self, _ctx: &RequestContext, _res: &mut ResponseSink, store: Option<StoreHandle>) -> HandlerResult {
        Ok(Some(json!({
            "store": store.as_ref().map(|s| s.name().to_string()),
            "addr": store.as_ref().map(|s| Arc::as_ptr(s) as usize),
        })))
    }
}
