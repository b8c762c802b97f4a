//! HTTP Handlers

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use std::sync::Arc;

use platform::cookie::{delete_cookie_header, extract_cookie, set_cookie_header};

use crate::application::config::BffConfig;
use crate::application::{
    CreateTestUserOutput, CreateTestUserUseCase, ForwardBody, ForwardInput, ForwardUseCase,
    LoginInput, LoginOutput, LoginUseCase, LogoutUseCase, RefreshOutput, RefreshUseCase,
};
use crate::domain::gateway::BackendGateway;
use crate::error::BffResult;
use crate::presentation::dto::{AccessResponse, LoginRequest, LogoutResponse, TestUserResponse};

/// Shared state for BFF handlers
pub struct BffAppState<G>
where
    G: BackendGateway + Send + Sync + 'static,
{
    pub gateway: Arc<G>,
    pub config: Arc<BffConfig>,
}

// Manual impl: the gateway sits behind an `Arc`, so `G` need not be `Clone`
impl<G> Clone for BffAppState<G>
where
    G: BackendGateway + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            config: self.config.clone(),
        }
    }
}

/// Attach the refresh cookie when there is a token to store
fn with_refresh_cookie(
    config: &BffConfig,
    refresh: Option<&str>,
    response: impl IntoResponse,
) -> BffResult<Response> {
    let mut response = response.into_response();
    if let Some(refresh) = refresh {
        let cookie = set_cookie_header(&config.refresh_cookie, refresh)?;
        response.headers_mut().append(header::SET_COOKIE, cookie);
    }
    Ok(response)
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<G>(
    State(state): State<BffAppState<G>>,
    Json(req): Json<LoginRequest>,
) -> BffResult<Response>
where
    G: BackendGateway + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(state.gateway.clone(), state.config.clone());

    let input = LoginInput {
        username: req.username,
        email: req.email,
        password: req.password,
    };

    match use_case.execute(input).await? {
        LoginOutput::Authenticated { access, refresh } => with_refresh_cookie(
            &state.config,
            refresh.as_deref(),
            (
                StatusCode::OK,
                Json(AccessResponse {
                    access: Some(access),
                }),
            ),
        ),
        LoginOutput::Rejected {
            status,
            body,
            refresh,
        } => with_refresh_cookie(&state.config, refresh.as_deref(), (status, Json(body))),
    }
}

// ============================================================================
// Refresh
// ============================================================================

/// POST /api/auth/refresh
pub async fn refresh<G>(
    State(state): State<BffAppState<G>>,
    headers: HeaderMap,
) -> BffResult<Response>
where
    G: BackendGateway + Send + Sync + 'static,
{
    let cookie = extract_cookie(&headers, &state.config.refresh_cookie.name);
    let use_case = RefreshUseCase::new(state.gateway.clone(), state.config.clone());

    let response = match use_case.execute(cookie).await? {
        RefreshOutput::Refreshed { access } => {
            (StatusCode::OK, Json(AccessResponse { access })).into_response()
        }
        RefreshOutput::Rejected { status, body } => (status, Json(body)).into_response(),
    };
    Ok(response)
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/auth/logout
///
/// Always succeeds and always expires the refresh cookie.
pub async fn logout<G>(State(state): State<BffAppState<G>>) -> BffResult<impl IntoResponse>
where
    G: BackendGateway + Send + Sync + 'static,
{
    let use_case = LogoutUseCase::new(state.gateway.clone(), state.config.clone());
    use_case.execute().await;

    let cookie = delete_cookie_header(&state.config.refresh_cookie)?;
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LogoutResponse { ok: true }),
    ))
}

// ============================================================================
// Proxy
// ============================================================================

/// ANY /api/proxy/{*path}
///
/// The path is read from the (prefix-stripped) URI so percent-encoding
/// and trailing slashes reach the backend untouched.
pub async fn proxy<G>(
    State(state): State<BffAppState<G>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> BffResult<Response>
where
    G: BackendGateway + Send + Sync + 'static,
{
    let use_case = ForwardUseCase::new(state.gateway.clone(), state.config.clone());

    let input = ForwardInput {
        method,
        path: uri.path().trim_start_matches('/').to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body,
    };

    let output = use_case.execute(input).await?;

    let response = match output.body {
        ForwardBody::Json(value) => (output.status, Json(value)).into_response(),
        ForwardBody::Text { content_type, text } => {
            let content_type = content_type
                .unwrap_or_else(|| HeaderValue::from_static("text/plain; charset=utf-8"));
            let mut response = Response::new(Body::from(text));
            *response.status_mut() = output.status;
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, content_type);
            response
        }
    };
    Ok(response)
}

// ============================================================================
// Setup
// ============================================================================

/// GET /api/setup/create-test-user
pub async fn create_test_user<G>(State(state): State<BffAppState<G>>) -> BffResult<Response>
where
    G: BackendGateway + Send + Sync + 'static,
{
    let use_case = CreateTestUserUseCase::new(state.gateway.clone(), state.config.clone());

    let response = match use_case.execute().await? {
        CreateTestUserOutput::Created { username, password } => (
            StatusCode::CREATED,
            Json(TestUserResponse {
                username,
                password,
                message: "Test user created (or already exists)".to_string(),
            }),
        )
            .into_response(),
        CreateTestUserOutput::Rejected { status, body } => (status, Json(body)).into_response(),
    };
    Ok(response)
}
