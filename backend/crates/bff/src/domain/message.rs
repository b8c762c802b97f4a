//! Backend request/response model
//!
//! Buffered HTTP messages exchanged with the backend API. Bodies are
//! kept as raw bytes so multipart and JSON payloads forward unchanged.

use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use bytes::Bytes;
use serde_json::{Value, json};

/// Longest raw snippet kept when a body is not JSON
const RAW_SNIPPET_CHARS: usize = 500;

/// Request sent to the backend
#[derive(Debug, Clone)]
pub struct BackendRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl BackendRequest {
    /// `POST` with a JSON body
    pub fn post_json(url: impl Into<String>, body: &Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Self {
            method: Method::POST,
            url: url.into(),
            headers,
            body: Some(Bytes::from(body.to_string())),
        }
    }

    /// `POST` without a body
    pub fn post_empty(url: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Parsed JSON body, if the request has one
    pub fn json_body(&self) -> Option<Value> {
        self.body
            .as_ref()
            .and_then(|body| serde_json::from_slice(body).ok())
    }
}

/// Buffered backend response
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl BackendResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// JSON response with the matching content type
    pub fn json(status: StatusCode, body: &Value) -> Self {
        Self::new(status, body.to_string()).with_header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )
    }

    pub fn with_header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON
    pub fn parse_json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }

    /// Body parsed as JSON, or `{"_raw": "<first 500 chars>"}`.
    pub fn json_or_raw(&self) -> Value {
        self.parse_json().unwrap_or_else(|| {
            let snippet: String = self.text().chars().take(RAW_SNIPPET_CHARS).collect();
            json!({ "_raw": snippet })
        })
    }

    /// Body parsed as JSON, or `{"_raw": "<whole text>"}`.
    pub fn json_or_full_raw(&self) -> Value {
        self.parse_json()
            .unwrap_or_else(|| json!({ "_raw": self.text() }))
    }
}

/// Failure to get any response from the backend
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    #[error("backend request timed out")]
    Timeout,
    #[error("backend unreachable: {0}")]
    Connect(String),
    #[error("backend request failed: {0}")]
    Request(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_json_sets_content_type() {
        let request = BackendRequest::post_json("http://b/api/token/", &json!({"a": 1}));
        assert_eq!(request.method, Method::POST);
        assert_eq!(
            request.headers.get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(request.json_body(), Some(json!({"a": 1})));
    }

    #[test]
    fn test_json_or_raw_truncates() {
        let long = "x".repeat(800);
        let response = BackendResponse::new(StatusCode::BAD_GATEWAY, long);
        let value = response.json_or_raw();
        assert_eq!(value["_raw"].as_str().unwrap().len(), RAW_SNIPPET_CHARS);
    }

    #[test]
    fn test_json_or_raw_parses_json() {
        let response = BackendResponse::json(StatusCode::OK, &json!({"access": "t"}));
        assert_eq!(response.json_or_raw(), json!({"access": "t"}));
    }
}
