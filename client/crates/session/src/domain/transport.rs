//! HTTP transport trait and messages
//!
//! Buffered requests and responses exchanged with the web server.
//! Implementation is in the infrastructure layer; tests substitute
//! scripted fakes.

use bytes::Bytes;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::TransportError;

/// Outgoing request
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    /// Already resent once after a refresh
    pub(crate) retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            retried: false,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    /// Serialize `body` as the JSON payload
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(Bytes::from(serde_json::to_vec(body)?));
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Ok(self)
    }

    /// Set `Authorization: Bearer <token>`.
    ///
    /// A token that cannot be a header value is left off; the server
    /// then answers 401 and the refresh flow takes over.
    pub fn with_bearer(mut self, token: &str) -> Self {
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(value) => {
                self.headers.insert(header::AUTHORIZATION, value);
            }
            Err(_) => {
                tracing::warn!("Stored access token is not a valid header value");
            }
        }
        self
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }
}

/// Buffered response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body; an empty body decodes as JSON `null`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        if self.body.is_empty() {
            serde_json::from_slice(b"null")
        } else {
            serde_json::from_slice(&self.body)
        }
    }

    /// Body as JSON, `Null` when it is not JSON
    pub fn json_value(&self) -> serde_json::Value {
        self.json().unwrap_or(serde_json::Value::Null)
    }
}

/// Sends one buffered request. Any HTTP status is a response; only
/// network failures are errors.
#[trait_variant::make(HttpTransport: Send)]
pub trait LocalHttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}
