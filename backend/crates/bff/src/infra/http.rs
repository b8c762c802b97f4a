//! reqwest Backend Gateway

use std::time::Duration;

use crate::domain::gateway::BackendGateway;
use crate::domain::message::{BackendError, BackendRequest, BackendResponse};

/// Backend gateway backed by a pooled `reqwest::Client`
#[derive(Clone)]
pub struct ReqwestGateway {
    client: reqwest::Client,
}

impl ReqwestGateway {
    /// Build a client with a per-request timeout
    pub fn new(timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl BackendGateway for ReqwestGateway {
    async fn send(&self, request: BackendRequest) -> Result<BackendResponse, BackendError> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(BackendResponse {
            status,
            headers,
            body,
        })
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else if err.is_connect() {
            BackendError::Connect(err.to_string())
        } else {
            BackendError::Request(err.to_string())
        }
    }
}
