//! Application Configuration
//!
//! Configuration for the BFF application layer.

use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::forward::normalize_base_url;

use crate::error::BffResult;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Development account created by the setup route
#[derive(Debug, Clone)]
pub struct TestUser {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            username: "testuser".to_string(),
            password: "Testpass123!".to_string(),
            email: "testuser@example.com".to_string(),
        }
    }
}

/// BFF application configuration
#[derive(Debug, Clone)]
pub struct BffConfig {
    /// Backend REST API origin (`LMS_API_BASE_URL`), e.g. `http://localhost:8000`
    pub backend_base_url: Option<String>,
    /// Refresh cookie attributes
    pub refresh_cookie: CookieConfig,
    /// Backend login endpoints, tried in order
    pub login_endpoints: Vec<String>,
    /// Backend refresh endpoints for `/api/auth/refresh`, next one tried only on 404
    pub refresh_endpoints: Vec<String>,
    /// Backend refresh endpoints for the exchange right after login
    pub exchange_endpoints: Vec<String>,
    /// Backend logout endpoint (best effort)
    pub logout_endpoint: String,
    /// Backend registration endpoint
    pub register_endpoint: String,
    /// Prefix the proxy puts in front of forwarded paths
    pub api_prefix: String,
    /// Proxied `POST` paths that the backend only accepts with a trailing slash
    pub trailing_slash_paths: Vec<String>,
    /// Timeout for each backend call
    pub backend_timeout: Duration,
    /// Mount `/api/setup/*`
    pub enable_setup_routes: bool,
    /// Account created by `/api/setup/create-test-user`
    pub test_user: TestUser,
}

impl Default for BffConfig {
    fn default() -> Self {
        Self {
            backend_base_url: None,
            refresh_cookie: CookieConfig::default(),
            login_endpoints: vec![
                "/api/auth/login/".to_string(),
                "/api/token/".to_string(),
                "/api/token/obtain/".to_string(),
                "/auth/jwt/create/".to_string(),
            ],
            refresh_endpoints: vec![
                "/api/token/refresh/".to_string(),
                "/api/auth/refresh/".to_string(),
            ],
            exchange_endpoints: vec![
                "/api/token/refresh/".to_string(),
                "/api/auth/refresh/".to_string(),
                "/auth/jwt/refresh/".to_string(),
            ],
            logout_endpoint: "/api/auth/logout/".to_string(),
            register_endpoint: "/api/auth/register/".to_string(),
            api_prefix: "/api".to_string(),
            trailing_slash_paths: vec!["auth/register".to_string(), "auth/login".to_string()],
            backend_timeout: Duration::from_secs(30),
            enable_setup_routes: false,
            test_user: TestUser::default(),
        }
    }
}

impl BffConfig {
    /// Config pointing at a backend, otherwise defaults
    pub fn with_backend(base_url: impl Into<String>) -> Self {
        Self {
            backend_base_url: Some(base_url.into()),
            ..Default::default()
        }
    }

    /// Create config for development (setup routes on)
    pub fn development(base_url: impl Into<String>) -> Self {
        Self {
            enable_setup_routes: true,
            ..Self::with_backend(base_url)
        }
    }

    /// Normalized backend origin, or an error naming the missing variable
    pub fn backend_base(&self) -> BffResult<String> {
        let raw = self.backend_base_url.as_deref().unwrap_or_default();
        Ok(normalize_base_url(raw)?)
    }

    /// Whether a proxied `POST` path needs a trailing slash appended
    pub fn needs_trailing_slash(&self, path: &str) -> bool {
        self.trailing_slash_paths.iter().any(|p| p == path)
    }
}
