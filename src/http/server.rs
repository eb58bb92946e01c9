//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the Axum router around one fallback dispatch handler
//! - Serve `/favicon.ico` from the public directory when present
//! - Wire up middleware (request ID, tracing, CORS)
//! - Bind server to listener and stop on the shutdown broadcast

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeFile,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::executor::execute;
use crate::http::fallback::NotFoundPage;
use crate::routing::DispatchTable;

const FAVICON: &str = "/favicon.ico";

/// Application state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<DispatchTable>,
    pub not_found: NotFoundPage,
    pub max_body_bytes: usize,
}

/// HTTP server for the discovered routes.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server dispatching into the frozen `table`.
    pub fn new(config: &AppConfig, table: DispatchTable) -> Self {
        let state = AppState {
            table: Arc::new(table),
            not_found: NotFoundPage::load(&config.assets.public_dir),
            max_body_bytes: config.limits.max_body_bytes,
        };
        let router = Self::build_router(config, state);
        Self { router }
    }

    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let mut router = Router::new();

        let favicon = config.assets.public_dir.join("favicon.ico");
        if serves_favicon(&favicon, &state.table) {
            tracing::debug!(path = %favicon.display(), "Serving favicon");
            router = router.route_service(FAVICON, ServeFile::new(favicon));
        }

        let mut router = router
            .fallback(dispatch)
            .with_state(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

        if config.http.cors {
            router = router.layer(CorsLayer::permissive());
        }
        router
    }

    /// The fully layered router, for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// A registered `GET /favicon.ico` route takes precedence over the file.
fn serves_favicon(path: &Path, table: &DispatchTable) -> bool {
    path.is_file() && table.count(&Method::GET, FAVICON) == 0
}

/// Fallback handler: every request goes through the dispatch table.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let started = Instant::now();
    let method = request.method().clone();

    match state.table.lookup(&method, request.uri().path()) {
        Some(matched) => execute(matched, request, state.max_body_bytes, started).await,
        None => {
            tracing::debug!(method = %method, path = %request.uri().path(), "No route matched");
            state.not_found.response()
        }
    }
}
