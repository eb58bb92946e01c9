//! Request handling and transformation.
//!
//! # Responsibilities
//! - Carry the request id assigned by the request-id layer
//! - Buffer the body up to the configured limit
//! - Expose path params, query params, cookies and decoded body fields

use std::collections::HashMap;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::form_urlencoded;
use uuid::Uuid;

use crate::handlers::HandlerError;
use crate::routing::matcher::PathParams;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Everything a handler may read about the incoming request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: String,
    method: Method,
    url: String,
    path: String,
    route: String,
    params: PathParams,
    query: HashMap<String, String>,
    headers: HeaderMap,
    body: Bytes,
}

impl RequestContext {
    /// Buffer `request` and capture the matched route's parameters.
    pub async fn from_request(
        request: Request<Body>,
        route: &str,
        params: PathParams,
        max_body_bytes: usize,
    ) -> Result<Self, HandlerError> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, max_body_bytes)
            .await
            .map_err(|e| HandlerError::Body(e.to_string()))?;

        let request_id = parts
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let url = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        let query = parts
            .uri
            .query()
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        Ok(Self {
            request_id,
            method: parts.method,
            url,
            path: parts.uri.path().to_string(),
            route: route.to_string(),
            params,
            query,
            headers: parts.headers,
            body,
        })
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Original URL including the query string.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The route pattern this request matched.
    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Value of a cookie sent by the client.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| {
                form_urlencoded::parse(format!("v={v}").as_bytes())
                    .next()
                    .map(|(_, decoded)| decoded.into_owned())
                    .unwrap_or_else(|| v.to_string())
            })
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        serde_json::from_slice(&self.body).map_err(|e| HandlerError::Body(e.to_string()))
    }

    /// Flat string fields from a JSON object or a urlencoded form body.
    ///
    /// Non-string JSON values are rendered as JSON text. An empty body
    /// yields no fields.
    pub fn fields(&self) -> Result<HashMap<String, String>, HandlerError> {
        if self.body.is_empty() {
            return Ok(HashMap::new());
        }

        let content_type = self.header(header::CONTENT_TYPE.as_str()).unwrap_or("");
        if content_type.starts_with("application/json") || content_type.ends_with("+json") {
            return match self.json::<Value>()? {
                Value::Object(map) => Ok(map
                    .into_iter()
                    .map(|(k, v)| match v {
                        Value::String(s) => (k, s),
                        other => (k, other.to_string()),
                    })
                    .collect()),
                _ => Err(HandlerError::Body("expected a JSON object".to_string())),
            };
        }

        if content_type.is_empty() || content_type.starts_with("application/x-www-form-urlencoded") {
            return Ok(form_urlencoded::parse(&self.body).into_owned().collect());
        }

        Err(HandlerError::Body(format!("unsupported content type '{content_type}'")))
    }

    /// Shortcut for a single field from [`fields`](Self::fields).
    pub fn field(&self, name: &str) -> Result<Option<String>, HandlerError> {
        Ok(self.fields()?.remove(name))
    }
}
