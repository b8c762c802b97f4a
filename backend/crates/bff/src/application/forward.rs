//! Forward Use Case
//!
//! The catch-all proxy: one forwarding function parameterized by
//! method, path, query, headers and body.

use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use bytes::Bytes;
use platform::forward::{forwardable_headers, is_json, join_url, with_query};
use serde_json::Value;

use crate::application::config::BffConfig;
use crate::domain::gateway::BackendGateway;
use crate::domain::message::BackendRequest;
use crate::error::{BffError, BffResult};

/// Forward input
#[derive(Debug, Clone)]
pub struct ForwardInput {
    pub method: Method,
    /// Path below the proxy prefix, without a leading slash (`courses/1/`)
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Response body relayed to the browser
#[derive(Debug, Clone, PartialEq)]
pub enum ForwardBody {
    /// Upstream announced JSON; unparseable bodies become `{"_raw": text}`
    Json(Value),
    /// Anything else, sent back as text with the upstream content type
    Text {
        content_type: Option<HeaderValue>,
        text: String,
    },
}

/// Forward output
#[derive(Debug, Clone)]
pub struct ForwardOutput {
    pub status: StatusCode,
    pub body: ForwardBody,
}

/// Forward use case
pub struct ForwardUseCase<G>
where
    G: BackendGateway,
{
    gateway: Arc<G>,
    config: Arc<BffConfig>,
}

impl<G> ForwardUseCase<G>
where
    G: BackendGateway,
{
    pub fn new(gateway: Arc<G>, config: Arc<BffConfig>) -> Self {
        Self { gateway, config }
    }

    /// Backend URL for a proxied path
    pub fn target_url(&self, base: &str, method: &Method, path: &str, query: Option<&str>) -> String {
        let mut path = path.trim_start_matches('/').to_string();
        if *method == Method::POST && self.config.needs_trailing_slash(&path) {
            path.push('/');
        }

        let prefixed = join_url(base, &self.config.api_prefix);
        with_query(join_url(&prefixed, &path), query)
    }

    pub async fn execute(&self, input: ForwardInput) -> BffResult<ForwardOutput> {
        let base = self.config.backend_base()?;
        let url = self.target_url(&base, &input.method, &input.path, input.query.as_deref());

        let body = match input.method {
            Method::GET | Method::HEAD => None,
            _ => Some(input.body),
        };

        let request = BackendRequest {
            method: input.method.clone(),
            url,
            headers: forwardable_headers(&input.headers),
            body,
        };

        let response = self
            .gateway
            .send(request)
            .await
            .map_err(|e| BffError::backend("Proxy server crashed", e))?;

        tracing::debug!(
            method = %input.method,
            path = %input.path,
            status = %response.status,
            "Proxied request"
        );

        let body = if is_json(&response.headers) {
            ForwardBody::Json(response.json_or_full_raw())
        } else {
            ForwardBody::Text {
                content_type: response.headers.get(header::CONTENT_TYPE).cloned(),
                text: response.text(),
            }
        };

        Ok(ForwardOutput {
            status: response.status,
            body,
        })
    }
}
