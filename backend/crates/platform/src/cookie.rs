//! Cookie Management Infrastructure
//!
//! The refresh token never reaches browser scripts: it only travels in
//! an HTTP-only cookie set and cleared by the BFF. This module builds
//! that cookie, reads it back from requests, and picks refresh tokens
//! out of the backend's own `Set-Cookie` headers.

use axum::http::{HeaderMap, HeaderValue, header};

/// Name of the HTTP-only refresh cookie
pub const REFRESH_COOKIE_NAME: &str = "ccgd_refresh";

/// 30 days
pub const REFRESH_COOKIE_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 30;

/// Cookie names the backend may use for its refresh token
const BACKEND_REFRESH_COOKIE_NAMES: [&str; 3] = ["refresh_token", "refresh", "ccgd_refresh"];

/// SameSite policy for cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Error building a `Set-Cookie` header
#[derive(Debug, Clone, thiserror::Error)]
pub enum CookieError {
    #[error("cookie value contains characters not allowed in a header")]
    InvalidValue,
}

/// Cookie configuration
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub path: String,
    pub max_age_secs: Option<i64>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: REFRESH_COOKIE_NAME.to_string(),
            secure: false,
            http_only: true,
            same_site: SameSite::Lax,
            path: "/".to_string(),
            max_age_secs: Some(REFRESH_COOKIE_MAX_AGE_SECS),
        }
    }
}

impl CookieConfig {
    /// Build Set-Cookie header value
    ///
    /// With the defaults this yields
    /// `ccgd_refresh=<value>; HttpOnly; Path=/; Max-Age=2592000; SameSite=Lax`.
    pub fn build_set_cookie(&self, value: &str) -> String {
        let mut parts = vec![format!("{}={}", self.name, value)];

        if self.http_only {
            parts.push("HttpOnly".to_string());
        }
        parts.push(format!("Path={}", self.path));
        if let Some(max_age) = self.max_age_secs {
            parts.push(format!("Max-Age={}", max_age));
        }
        parts.push(format!("SameSite={}", self.same_site.as_str()));
        if self.secure {
            parts.push("Secure".to_string());
        }

        parts.join("; ")
    }

    /// Build Set-Cookie header for deletion (expired)
    pub fn build_delete_cookie(&self) -> String {
        let mut cookie = format!(
            "{}=; HttpOnly; Path={}; Max-Age=0; SameSite={}",
            self.name,
            self.path,
            self.same_site.as_str()
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Extract a cookie value from request headers
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;

            if key == name && !value.is_empty() {
                Some(value.to_string())
            } else {
                None
            }
        })
}

/// Find a refresh token in the backend's `Set-Cookie` response headers.
///
/// Looks at every `name=value` segment of every header, so a token
/// placed after other attributes is still found. Name matching ignores
/// ASCII case.
pub fn find_backend_refresh_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|segment| {
            let (key, value) = segment.trim().split_once('=')?;
            let known = BACKEND_REFRESH_COOKIE_NAMES
                .iter()
                .any(|name| key.eq_ignore_ascii_case(name));

            if known && !value.is_empty() {
                Some(value.to_string())
            } else {
                None
            }
        })
}

/// Create a Set-Cookie header value
pub fn set_cookie_header(config: &CookieConfig, value: &str) -> Result<HeaderValue, CookieError> {
    HeaderValue::from_str(&config.build_set_cookie(value)).map_err(|_| CookieError::InvalidValue)
}

/// Create the Set-Cookie header value that expires the cookie
pub fn delete_cookie_header(config: &CookieConfig) -> Result<HeaderValue, CookieError> {
    HeaderValue::from_str(&config.build_delete_cookie()).map_err(|_| CookieError::InvalidValue)
}
