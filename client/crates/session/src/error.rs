//! Session Error Types
//!
//! Client-side error variants. They map onto the shared
//! `kernel::error::ErrorKind` so callers can branch on the same
//! categories the BFF uses.

use kernel::error::{app_error::AppError, kind::ErrorKind};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Client result type alias
pub type ClientResult<T> = Result<T, ClientError>;

/// No response came back from the server
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("server unreachable: {0}")]
    Connect(String),
    #[error("request failed: {0}")]
    Request(String),
}

/// Key-value storage failure
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Why a refresh cycle ended without a new access token.
///
/// Every request queued behind the cycle observes the same value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshFailure {
    #[error("refresh rejected with status {0}")]
    Rejected(StatusCode),
    #[error("refresh response carried no access token")]
    MissingToken,
    #[error("refresh request failed: {0}")]
    Transport(String),
    #[error("refresh abandoned before completion")]
    Abandoned,
}

/// Client error variants
#[derive(Debug, Error)]
pub enum ClientError {
    /// 401 after the one allowed refresh-and-resend
    #[error("Not authenticated")]
    Unauthenticated,

    /// Refresh cycle failed; stored credentials were cleared
    #[error("Session refresh failed: {0}")]
    RefreshFailed(#[from] RefreshFailure),

    /// Login rejected, with a message for the user
    #[error("{0}")]
    Login(String),

    /// Non-2xx answer other than an authentication failure
    #[error("Request failed with status {status}")]
    Status { status: StatusCode, body: Value },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Invalid response body: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Whether the caller should treat the user as signed out
    pub fn is_auth_error(&self) -> bool {
        match self {
            ClientError::Unauthenticated | ClientError::RefreshFailed(_) => true,
            ClientError::Status { status, .. } => *status == StatusCode::UNAUTHORIZED,
            _ => false,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Unauthenticated | ClientError::RefreshFailed(_) => ErrorKind::Unauthorized,
            ClientError::Login(_) => ErrorKind::Unauthorized,
            ClientError::Status { status, .. } => ErrorKind::from_status_code(status.as_u16())
                .unwrap_or(ErrorKind::InternalServerError),
            ClientError::Transport(TransportError::Timeout) => ErrorKind::GatewayTimeout,
            ClientError::Transport(_) => ErrorKind::ServiceUnavailable,
            ClientError::Serialization(_) => ErrorKind::BadGateway,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.to_string());
        match self {
            ClientError::Status { body, .. } => err.with_field("response", body.clone()),
            _ => err,
        }
    }
}
