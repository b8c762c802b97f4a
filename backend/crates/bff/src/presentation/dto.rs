//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

// ============================================================================
// Login
// ============================================================================

/// Login request; `username` or `email` identifies the account
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Login and refresh response
#[derive(Debug, Clone, Serialize)]
pub struct AccessResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
}

// ============================================================================
// Logout
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct LogoutResponse {
    pub ok: bool,
}

// ============================================================================
// Setup
// ============================================================================

/// Test user creation response
#[derive(Debug, Clone, Serialize)]
pub struct TestUserResponse {
    pub username: String,
    pub password: String,
    pub message: String,
}
