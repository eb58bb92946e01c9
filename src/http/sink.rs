//! Response sink handed to handlers.
//!
//! A handler may write the response itself through the sink, or return a
//! body and let the executor send it. Once something has been sent, later
//! sends are ignored with a warning.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;
use url::form_urlencoded;

use crate::handlers::HandlerError;

#[derive(Debug)]
pub struct ResponseSink {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    sent: bool,
}

impl Default for ResponseSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseSink {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
            sent: false,
        }
    }

    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        if self.sent {
            tracing::warn!(status = %status, "Status set after response was sent, ignoring");
        } else {
            self.status = status;
        }
        self
    }

    pub fn current_status(&self) -> StatusCode {
        self.status
    }

    /// Set a header. Invalid values are dropped with a warning.
    pub fn header(&mut self, name: HeaderName, value: &str) -> &mut Self {
        match HeaderValue::from_str(value) {
            Ok(v) => {
                self.headers.insert(name, v);
            }
            Err(_) => tracing::warn!(header = %name, "Invalid header value, ignoring"),
        }
        self
    }

    /// Append a `Set-Cookie` header; the value is percent-encoded.
    pub fn cookie(&mut self, name: &str, value: &str) -> &mut Self {
        let encoded: String = form_urlencoded::byte_serialize(value.as_bytes()).collect();
        match HeaderValue::from_str(&format!("{name}={encoded}; Path=/")) {
            Ok(v) => {
                self.headers.append(header::SET_COOKIE, v);
            }
            Err(_) => tracing::warn!(cookie = %name, "Invalid cookie name, ignoring"),
        }
        self
    }

    pub fn is_sent(&self) -> bool {
        self.sent
    }

    /// Send `value` serialized as JSON.
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), HandlerError> {
        let body = serde_json::to_vec(value)?;
        self.send(body, "application/json");
        Ok(())
    }

    pub fn text(&mut self, body: impl Into<String>) {
        self.send(body.into().into_bytes(), "text/plain; charset=utf-8");
    }

    pub fn html(&mut self, body: impl Into<String>) {
        self.send(body.into().into_bytes(), "text/html; charset=utf-8");
    }

    /// Send a handler's return value: strings as HTML, anything else as JSON.
    pub fn send_value(&mut self, value: Value) {
        match value {
            Value::String(s) => self.html(s),
            other => self.send(other.to_string().into_bytes(), "application/json"),
        }
    }

    fn send(&mut self, body: Vec<u8>, content_type: &'static str) {
        if self.sent {
            tracing::warn!("Response already sent, ignoring second send");
            return;
        }
        self.headers
            .entry(header::CONTENT_TYPE)
            .or_insert(HeaderValue::from_static(content_type));
        self.body = body;
        self.sent = true;
    }
}

impl IntoResponse for ResponseSink {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_to_unsent_ok() {
        let sink = ResponseSink::new();
        assert!(!sink.is_sent());
        assert_eq!(sink.current_status(), StatusCode::OK);
    }

    #[test]
    fn test_json_sets_content_type() {
        let mut sink = ResponseSink::new();
        sink.status(StatusCode::CREATED).json(&json!({"ok": true})).unwrap();
        assert!(sink.is_sent());

        let response = sink.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_second_send_is_ignored() {
        let mut sink = ResponseSink::new();
        sink.text("first");
        sink.status(StatusCode::IM_A_TEAPOT);
        sink.text("second");
        assert_eq!(sink.current_status(), StatusCode::OK);
        assert_eq!(sink.body, b"first");
    }

    #[test]
    fn test_send_value_picks_content_type() {
        let mut sink = ResponseSink::new();
        sink.send_value(json!("<p>hi</p>"));
        assert_eq!(sink.headers[header::CONTENT_TYPE], "text/html; charset=utf-8");

        let mut sink = ResponseSink::new();
        sink.send_value(json!([1, 2]));
        assert_eq!(sink.headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(sink.body, b"[1,2]");
    }

    #[test]
    fn test_cookies_are_appended_and_encoded() {
        let mut sink = ResponseSink::new();
        sink.cookie("username", "ada l").cookie("theme", "dark");
        let cookies: Vec<_> = sink.headers.get_all(header::SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0], "username=ada+l; Path=/");
    }
}
