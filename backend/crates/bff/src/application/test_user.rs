//! Create Test User Use Case
//!
//! Development helper that registers a fixed account on the backend.

use std::sync::Arc;

use axum::http::StatusCode;
use kernel::error::app_error::ResultExt;
use kernel::error::kind::ErrorKind;
use platform::forward::join_url;
use serde_json::{Value, json};

use crate::application::config::BffConfig;
use crate::domain::gateway::BackendGateway;
use crate::domain::message::BackendRequest;
use crate::error::{BffError, BffResult};

/// Create test user output
#[derive(Debug)]
pub enum CreateTestUserOutput {
    Created { username: String, password: String },
    /// Backend refused the registration; status and body pass through
    Rejected { status: StatusCode, body: Value },
}

/// Create test user use case
pub struct CreateTestUserUseCase<G>
where
    G: BackendGateway,
{
    gateway: Arc<G>,
    config: Arc<BffConfig>,
}

impl<G> CreateTestUserUseCase<G>
where
    G: BackendGateway,
{
    pub fn new(gateway: Arc<G>, config: Arc<BffConfig>) -> Self {
        Self { gateway, config }
    }

    pub async fn execute(&self) -> BffResult<CreateTestUserOutput> {
        let base = self.config.backend_base()?;
        let user = &self.config.test_user;
        let body = json!({
            "username": user.username,
            "password": user.password,
            "email": user.email,
        });

        let url = join_url(&base, &self.config.register_endpoint);
        let response = self
            .gateway
            .send(BackendRequest::post_json(url, &body))
            .await
            .map_err(|e| BffError::backend("Test user creation failed", e))?;

        let data: Value = serde_json::from_slice(&response.body)
            .map_app_err(ErrorKind::BadGateway, "Backend returned invalid JSON")?;

        if !response.is_success() {
            return Ok(CreateTestUserOutput::Rejected {
                status: response.status,
                body: data,
            });
        }

        tracing::info!(username = %user.username, "Test user created");
        Ok(CreateTestUserOutput::Created {
            username: user.username.clone(),
            password: user.password.clone(),
        })
    }
}
