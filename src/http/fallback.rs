//! Fixed fallback responses: not-found and generic failure.

use std::path::Path;
use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub const GENERIC_FAILURE_MESSAGE: &str = "Something broke!";

const DEFAULT_NOT_FOUND: &str = "<!DOCTYPE html>\n<html><head><title>404 Not Found</title></head>\
<body><h1>404</h1><p>The page you requested does not exist.</p></body></html>\n";

/// The 404 document, read once at startup.
#[derive(Debug, Clone)]
pub struct NotFoundPage {
    body: Arc<str>,
}

impl NotFoundPage {
    /// Load `404.html` from the public directory, or use the built-in page.
    pub fn load(public_dir: &Path) -> Self {
        let path = public_dir.join("404.html");
        match std::fs::read_to_string(&path) {
            Ok(body) => Self { body: body.into() },
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "Cannot read 404 page, using built-in");
                }
                Self::default()
            }
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn response(&self) -> Response {
        (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            self.body.to_string(),
        )
            .into_response()
    }
}

impl Default for NotFoundPage {
    fn default() -> Self {
        Self {
            body: DEFAULT_NOT_FOUND.into(),
        }
    }
}

/// The only failure response a client ever sees for a handler error.
pub fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": GENERIC_FAILURE_MESSAGE })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_page_is_used() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("404.html"), "<p>gone</p>").unwrap();
        assert_eq!(NotFoundPage::load(dir.path()).body(), "<p>gone</p>");
    }

    #[test]
    fn test_missing_page_uses_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let page = NotFoundPage::load(dir.path());
        assert!(page.body().contains("404"));
        assert_eq!(page.response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_error_shape() {
        assert_eq!(internal_error().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
