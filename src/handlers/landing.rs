//! Landing page handler.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use axum::http::StatusCode;

use crate::handlers::{Handler, HandlerResult};
use crate::http::{RequestContext, ResponseSink};
use crate::storage::StoreHandle;

const DEFAULT_PAGE: &str = "<!DOCTYPE html>\n<html><head><title>autoroute</title></head>\
<body><h1>It works</h1><p>Routes are loaded from the routes directory.</p></body></html>\n";

/// Serves `200.html` from the public directory.
#[derive(Debug, Clone)]
pub struct LandingPage {
    page: PathBuf,
}

impl LandingPage {
    pub fn new(public_dir: &Path) -> Self {
        Self {
            page: public_dir.join("200.html"),
        }
    }
}

#[async_trait]
impl Handler for LandingPage {
    async fn handle(
        &self,
        _ctx: &RequestContext,
        res: &mut ResponseSink,
        _store: Option<StoreHandle>,
    ) -> HandlerResult {
        let body = match tokio::fs::read_to_string(&self.page).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => DEFAULT_PAGE.to_string(),
            Err(e) => return Err(e.into()),
        };
        res.status(StatusCode::OK).html(body);
        Ok(None)
    }
}
