//! Account signup handler.
//!
//! Expects `username` and `password` as JSON or form fields and a store
//! handle (`storage_file` in the manifest). Usernames are the store keys;
//! passwords are kept only as SHA-256 digests.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::handlers::{Handler, HandlerError, HandlerResult};
use crate::http::{RequestContext, ResponseSink};
use crate::storage::StoreHandle;

#[derive(Debug, Clone, Copy, Default)]
pub struct Signup;

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

#[async_trait]
impl Handler for Signup {
    async fn handle(
        &self,
        ctx: &RequestContext,
        res: &mut ResponseSink,
        store: Option<StoreHandle>,
    ) -> HandlerResult {
        let store = store.ok_or(HandlerError::MissingStore)?;
        let fields = ctx.fields()?;

        let (Some(username), Some(password)) = (
            non_empty(fields.get("username")),
            fields.get("password").map(String::as_str).filter(|p| !p.is_empty()),
        ) else {
            res.status(StatusCode::BAD_REQUEST)
                .json(&json!({ "message": "username and password are required" }))?;
            return Ok(None);
        };

        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let record = json!({
            "password_sha256": format!("{:x}", Sha256::digest(password.as_bytes())),
            "created_at": created_at,
        });

        if store.insert_new(username, record).await? {
            tracing::info!(request_id = %ctx.request_id(), username = %username, "User created");
            res.cookie("username", username)
                .status(StatusCode::OK)
                .json(&json!({ "message": "User created" }))?;
        } else {
            res.status(StatusCode::INTERNAL_SERVER_ERROR)
                .json(&json!({ "message": "User already exists" }))?;
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::matcher::PathParams;
    use crate::storage::Store;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;

    async fn post(body: &str) -> RequestContext {
        RequestContext::from_request(
            Request::builder()
                .method("POST")
                .uri("/auth/signup")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            "/auth/signup",
            PathParams::new(),
            1024,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_creates_then_rejects_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(dir.path(), "users.store").unwrap());
        let ctx = post(r#"{"username":"ada","password":"secret"}"#).await;

        let mut first = ResponseSink::new();
        Signup.handle(&ctx, &mut first, Some(store.clone())).await.unwrap();
        assert_eq!(first.current_status(), StatusCode::OK);

        let record = store.get("ada").unwrap();
        assert_ne!(record["password_sha256"], "secret");
        assert_eq!(record["password_sha256"].as_str().unwrap().len(), 64);

        let mut second = ResponseSink::new();
        Signup.handle(&ctx, &mut second, Some(store)).await.unwrap();
        assert_eq!(second.current_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_missing_fields_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Store::open(dir.path(), "users.store").unwrap());
        let ctx = post(r#"{"username":"ada"}"#).await;

        let mut sink = ResponseSink::new();
        Signup.handle(&ctx, &mut sink, Some(store.clone())).await.unwrap();
        assert_eq!(sink.current_status(), StatusCode::BAD_REQUEST);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_without_store_fails() {
        let ctx = post(r#"{"username":"ada","password":"x"}"#).await;
        let mut sink = ResponseSink::new();
        let result = Signup.handle(&ctx, &mut sink, None).await;
        assert!(matches!(result, Err(HandlerError::MissingStore)));
        assert!(!sink.is_sent());
    }
}
