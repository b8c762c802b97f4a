//! Application Configuration
//!
//! Where the web server lives and how the client talks to it.

use std::time::Duration;

/// Storage keys for persisted tokens
#[derive(Debug, Clone)]
pub struct StorageKeys {
    /// Access token
    pub access: String,
    /// Refresh token written by older builds; only ever cleared
    pub legacy_refresh: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            access: "lms_access_token".to_string(),
            legacy_refresh: "lms_refresh_token".to_string(),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Web server origin (`LMS_WEB_ORIGIN`)
    pub origin: String,
    /// Catch-all proxy prefix (`LMS_PROXY_PATH`)
    pub proxy_path: String,
    pub login_path: String,
    pub refresh_path: String,
    pub logout_path: String,
    /// Profile endpoint, relative to the proxy
    pub profile_path: String,
    pub storage_keys: StorageKeys,
    /// Silent refresh period while a session context is mounted
    pub refresh_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:3000".to_string(),
            proxy_path: "/api/proxy".to_string(),
            login_path: "/api/auth/login".to_string(),
            refresh_path: "/api/auth/refresh".to_string(),
            logout_path: "/api/auth/logout".to_string(),
            profile_path: "users/me/".to_string(),
            storage_keys: StorageKeys::default(),
            refresh_interval: Duration::from_secs(30 * 60), // 30 minutes
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `LMS_WEB_ORIGIN` and `LMS_PROXY_PATH`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            origin: std::env::var("LMS_WEB_ORIGIN").unwrap_or(defaults.origin.clone()),
            proxy_path: std::env::var("LMS_PROXY_PATH").unwrap_or(defaults.proxy_path.clone()),
            ..defaults
        }
    }

    pub fn with_origin(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            ..Default::default()
        }
    }

    fn origin(&self) -> &str {
        self.origin.trim_end_matches('/')
    }

    /// Absolute URL of a web-server route (`/api/auth/refresh`)
    pub fn session_url(&self, path: &str) -> String {
        format!("{}/{}", self.origin(), path.trim_start_matches('/'))
    }

    /// Absolute URL of a backend path behind the proxy (`courses/3/`)
    pub fn proxy_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.origin(),
            self.proxy_path.trim_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
