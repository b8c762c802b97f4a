//! Refresh Use Case
//!
//! Mints a new access token from the refresh token held in the
//! HTTP-only cookie.

use std::sync::Arc;

use axum::http::StatusCode;
use platform::forward::join_url;
use serde_json::{Value, json};

use crate::application::config::BffConfig;
use crate::domain::credentials::access_token;
use crate::domain::gateway::BackendGateway;
use crate::domain::message::{BackendError, BackendRequest, BackendResponse};
use crate::error::{BffError, BffResult};

/// Refresh output
#[derive(Debug)]
pub enum RefreshOutput {
    /// Backend accepted the refresh token. `access` is `None` when the
    /// backend answered OK without any recognizable token field.
    Refreshed { access: Option<String> },
    /// Backend rejected the refresh token; status and body pass through.
    Rejected { status: StatusCode, body: Value },
}

/// Exchange a refresh token against the configured endpoints.
///
/// The next endpoint is only tried when the previous one answered 404.
/// `on_attempt` sees every backend answer, for diagnostics.
pub(crate) async fn exchange_refresh<G, F>(
    gateway: &G,
    base: &str,
    endpoints: &[String],
    refresh: &str,
    mut on_attempt: F,
) -> Result<Option<BackendResponse>, BackendError>
where
    G: BackendGateway,
    F: FnMut(&str, &BackendResponse),
{
    let body = json!({ "refresh": refresh });
    let mut last = None;

    for endpoint in endpoints {
        let response = gateway
            .send(BackendRequest::post_json(join_url(base, endpoint), &body))
            .await?;
        on_attempt(endpoint, &response);

        let fall_through = response.status == StatusCode::NOT_FOUND;
        last = Some(response);
        if !fall_through {
            break;
        }
    }

    Ok(last)
}

/// Refresh use case
pub struct RefreshUseCase<G>
where
    G: BackendGateway,
{
    gateway: Arc<G>,
    config: Arc<BffConfig>,
}

impl<G> RefreshUseCase<G>
where
    G: BackendGateway,
{
    pub fn new(gateway: Arc<G>, config: Arc<BffConfig>) -> Self {
        Self { gateway, config }
    }

    pub async fn execute(&self, refresh_cookie: Option<String>) -> BffResult<RefreshOutput> {
        let base = self.config.backend_base()?;
        let refresh = refresh_cookie.ok_or(BffError::MissingRefreshCookie)?;

        let response = exchange_refresh(
            self.gateway.as_ref(),
            &base,
            &self.config.refresh_endpoints,
            &refresh,
            |endpoint, response| {
                tracing::debug!(endpoint, status = %response.status, "Refresh attempt");
            },
        )
        .await
        .map_err(|e| BffError::backend("Refresh proxy error", e))?;

        let Some(response) = response else {
            return Ok(RefreshOutput::Rejected {
                status: StatusCode::NOT_FOUND,
                body: json!({ "error": "Refresh failed" }),
            });
        };

        // Non-JSON bodies read as an empty object
        let body = response.parse_json().unwrap_or_else(|| json!({}));
        if !response.is_success() {
            tracing::info!(status = %response.status, "Refresh rejected by backend");
            return Ok(RefreshOutput::Rejected {
                status: response.status,
                body,
            });
        }

        Ok(RefreshOutput::Refreshed {
            access: access_token(&body),
        })
    }
}
