//! BFF Error Types
//!
//! This module provides BFF-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::cookie::CookieError;
use platform::forward::BaseUrlError;
use serde_json::Value;
use thiserror::Error;

use crate::domain::message::BackendError;

/// BFF-specific result type alias
pub type BffResult<T> = Result<T, BffError>;

/// BFF-specific error variants
#[derive(Debug, Error)]
pub enum BffError {
    /// `LMS_API_BASE_URL` missing or unusable
    #[error("Backend URL not configured. Set LMS_API_BASE_URL in .env")]
    BackendNotConfigured(#[source] BaseUrlError),

    /// Refresh called without the HTTP-only cookie
    #[error("No refresh token")]
    MissingRefreshCookie,

    /// Backend accepted the login but no access token could be found
    #[error("No access token from backend")]
    NoAccessToken {
        endpoint: String,
        debug: Vec<Value>,
        response: Value,
    },

    /// Backend could not be reached at all
    #[error("{context}")]
    Backend {
        context: &'static str,
        #[source]
        source: BackendError,
    },

    /// Refresh cookie could not be encoded
    #[error("Invalid refresh token value")]
    Cookie(#[from] CookieError),

    /// Request body rejected before reaching the backend
    #[error("{0}")]
    InvalidRequest(String),

    /// Already shaped application error
    #[error(transparent)]
    App(#[from] AppError),
}

impl BffError {
    pub fn backend(context: &'static str, source: BackendError) -> Self {
        BffError::Backend { context, source }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            BffError::BackendNotConfigured(_) => ErrorKind::InternalServerError,
            BffError::MissingRefreshCookie => ErrorKind::Unauthorized,
            BffError::NoAccessToken { .. } | BffError::InvalidRequest(_) => ErrorKind::BadRequest,
            BffError::Backend { .. } | BffError::Cookie(_) => ErrorKind::InternalServerError,
            BffError::App(err) => err.kind(),
        }
    }

    /// Convert to AppError
    ///
    /// Extra diagnostics are flattened next to `error` in the body.
    pub fn to_app_error(&self) -> AppError {
        match self {
            BffError::NoAccessToken {
                endpoint,
                debug,
                response,
            } => AppError::new(self.kind(), self.to_string())
                .with_field("endpoint", endpoint.clone())
                .with_field("debug", debug.clone())
                .with_field("response", response.clone()),
            BffError::Backend { context, source } => {
                AppError::new(self.kind(), *context).with_field("details", source.to_string())
            }
            BffError::App(err) => {
                let mut app = AppError::new(err.kind(), err.message().to_string());
                if let Value::Object(body) = err.to_body() {
                    for (key, value) in body {
                        app = app.with_field(key, value);
                    }
                }
                app
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            BffError::BackendNotConfigured(e) => {
                tracing::error!(error = %e, "Backend base URL not configured");
            }
            BffError::Backend { context, source } => {
                tracing::error!(error = %source, context, "Backend request failed");
            }
            BffError::Cookie(e) => {
                tracing::error!(error = %e, "Refresh cookie encoding failed");
            }
            BffError::NoAccessToken { endpoint, .. } => {
                tracing::warn!(endpoint = %endpoint, "Login succeeded without an access token");
            }
            _ => {
                tracing::debug!(error = %self, "BFF error");
            }
        }
    }
}

impl IntoResponse for BffError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<BaseUrlError> for BffError {
    fn from(err: BaseUrlError) -> Self {
        BffError::BackendNotConfigured(err)
    }
}
