//! Login Use Case
//!
//! Exchanges credentials with the backend for an access token and
//! captures the refresh token for the HTTP-only cookie.
//!
//! The backend's login endpoint and body shape are not known up front,
//! so every configured endpoint is tried with every credential shape
//! until one answers OK.

use std::sync::Arc;

use axum::http::StatusCode;
use platform::cookie::find_backend_refresh_cookie;
use platform::forward::join_url;
use serde_json::{Value, json};

use crate::application::config::BffConfig;
use crate::application::refresh::exchange_refresh;
use crate::domain::credentials::{
    access_token, credential_candidates, find_jwt_like, object_keys, refresh_token,
};
use crate::domain::gateway::BackendGateway;
use crate::domain::message::{BackendError, BackendRequest, BackendResponse};
use crate::error::{BffError, BffResult};

/// Login input
#[derive(Debug, Clone, Default)]
pub struct LoginInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login output
#[derive(Debug)]
pub enum LoginOutput {
    /// Access token for the browser, refresh token for the cookie
    Authenticated {
        access: String,
        refresh: Option<String>,
    },
    /// Every attempt failed; the last backend answer passes through.
    /// A refresh token mirrored from the backend's cookies is still set.
    Rejected {
        status: StatusCode,
        body: Value,
        refresh: Option<String>,
    },
}

/// Last backend answer seen while trying endpoints
struct Attempt {
    endpoint: String,
    status: StatusCode,
    data: Value,
}

/// Login use case
pub struct LoginUseCase<G>
where
    G: BackendGateway,
{
    gateway: Arc<G>,
    config: Arc<BffConfig>,
}

impl<G> LoginUseCase<G>
where
    G: BackendGateway,
{
    pub fn new(gateway: Arc<G>, config: Arc<BffConfig>) -> Self {
        Self { gateway, config }
    }

    pub async fn execute(&self, input: LoginInput) -> BffResult<LoginOutput> {
        let base = self.config.backend_base()?;
        let candidates = credential_candidates(
            input.username.as_deref(),
            input.email.as_deref(),
            input.password.as_deref(),
        );

        let mut debug: Vec<Value> = Vec::new();
        let mut last: Option<Attempt> = None;
        let mut last_error: Option<BackendError> = None;
        let mut mirrored: Option<String> = None;

        'endpoints: for endpoint in &self.config.login_endpoints {
            for body in &candidates {
                let request = BackendRequest::post_json(join_url(&base, endpoint), body);
                let response = match self.gateway.send(request).await {
                    Ok(response) => response,
                    Err(e) => {
                        tracing::debug!(endpoint = %endpoint, error = %e, "Login attempt failed");
                        debug.push(json!({ "endpoint": endpoint, "error": e.to_string() }));
                        last_error = Some(e);
                        continue;
                    }
                };

                let attempt = self.record_attempt(endpoint, body, &response, &mut debug);
                if let Some(token) = &attempt.mirrored {
                    mirrored = Some(token.clone());
                }
                let ok = response.is_success();
                last = Some(attempt.last);
                if ok {
                    break 'endpoints;
                }
            }
        }

        let attempt = match last {
            Some(attempt) if attempt.status.is_success() => attempt,
            Some(attempt) => {
                tracing::info!(status = %attempt.status, endpoint = %attempt.endpoint, "Login rejected by backend");
                return Ok(LoginOutput::Rejected {
                    status: attempt.status,
                    body: attempt.data,
                    refresh: mirrored,
                });
            }
            None => {
                if let Some(e) = last_error {
                    return Err(BffError::backend("Login proxy error", e));
                }
                return Ok(LoginOutput::Rejected {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: json!({ "error": "Login failed" }),
                    refresh: mirrored,
                });
            }
        };

        let refresh = refresh_token(&attempt.data);
        let mut access = access_token(&attempt.data);

        if access.is_none()
            && let Some(refresh) = &refresh
        {
            access = self.exchange(&base, refresh, &mut debug).await?;
        }

        let access = access.or_else(|| find_jwt_like(&attempt.data));
        let Some(access) = access else {
            return Err(BffError::NoAccessToken {
                endpoint: attempt.endpoint,
                debug,
                response: attempt.data,
            });
        };

        tracing::info!(endpoint = %attempt.endpoint, "User logged in");
        Ok(LoginOutput::Authenticated { access, refresh })
    }

    /// Parse one backend answer and note it in the diagnostics
    fn record_attempt(
        &self,
        endpoint: &str,
        body: &Value,
        response: &BackendResponse,
        debug: &mut Vec<Value>,
    ) -> RecordedAttempt {
        let mut data = response.json_or_raw();
        debug.push(json!({
            "endpoint": endpoint,
            "status": response.status.as_u16(),
            "keys": object_keys(&data),
            "rawLength": data.to_string().len(),
            "credentialKeys": object_keys(body),
            "hasRaw": data.get("_raw").is_some(),
        }));

        let mirrored = find_backend_refresh_cookie(&response.headers);
        if let Some(token) = &mirrored
            && refresh_token(&data).is_none()
            && let Some(map) = data.as_object_mut()
        {
            map.insert("refresh".to_string(), Value::String(token.clone()));
        }

        RecordedAttempt {
            mirrored,
            last: Attempt {
                endpoint: endpoint.to_string(),
                status: response.status,
                data,
            },
        }
    }

    /// Trade a refresh token for an access token right after login
    async fn exchange(
        &self,
        base: &str,
        refresh: &str,
        debug: &mut Vec<Value>,
    ) -> BffResult<Option<String>> {
        let response = exchange_refresh(
            self.gateway.as_ref(),
            base,
            &self.config.exchange_endpoints,
            refresh,
            |endpoint, response| {
                let data = response.json_or_raw();
                debug.push(json!({
                    "refreshAttempt": endpoint,
                    "status": response.status.as_u16(),
                    "keys": object_keys(&data),
                    "hasRaw": data.get("_raw").is_some(),
                }));
            },
        )
        .await
        .map_err(|e| BffError::backend("Login proxy error", e))?;

        Ok(response
            .filter(BackendResponse::is_success)
            .and_then(|response| access_token(&response.json_or_raw())))
    }
}

struct RecordedAttempt {
    mirrored: Option<String>,
    last: Attempt,
}
