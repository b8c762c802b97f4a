//! Request forwarding utilities
//!
//! Helpers shared by every BFF route that talks to the backend API:
//! normalizing the configured base URL, joining paths, and deciding
//! which incoming headers may be replayed upstream.

use axum::http::{HeaderMap, HeaderName, header};

/// Headers that describe the client connection rather than the request.
/// `host` is the important one: the backend must see its own host.
static CONNECTION_HEADERS: [HeaderName; 8] = [
    header::HOST,
    header::CONNECTION,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::TE,
    header::TRAILER,
    header::PROXY_AUTHORIZATION,
];

/// Error when the configured backend base URL is unusable
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BaseUrlError {
    #[error("backend base URL is empty")]
    Empty,
    #[error("backend base URL must start with http:// or https://: {0}")]
    MissingScheme(String),
}

/// Trim whitespace and trailing slashes from a configured base URL.
///
/// ## Returns
/// * `Ok(String)` - e.g. `http://localhost:8000`
/// * `Err(BaseUrlError)` - empty, or not an http(s) URL
pub fn normalize_base_url(raw: &str) -> Result<String, BaseUrlError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(BaseUrlError::Empty);
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(BaseUrlError::MissingScheme(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Join a normalized base URL and an absolute path (`/api/token/`).
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Append a raw query string, if any.
pub fn with_query(url: String, query: Option<&str>) -> String {
    match query {
        Some(query) if !query.is_empty() => format!("{url}?{query}"),
        _ => url,
    }
}

/// Copy the headers that may be replayed to the backend.
///
/// Drops `host` and the per-connection headers; the HTTP client sets
/// its own `content-length` for the forwarded body.
pub fn forwardable_headers(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if CONNECTION_HEADERS.contains(name) || name.as_str() == "keep-alive" {
            continue;
        }
        forwarded.append(name.clone(), value.clone());
    }
    forwarded
}

/// True when the `content-type` header announces JSON.
pub fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("http://localhost:8000/"),
            Ok("http://localhost:8000".to_string())
        );
        assert_eq!(normalize_base_url("  "), Err(BaseUrlError::Empty));
        assert!(matches!(
            normalize_base_url("localhost:8000"),
            Err(BaseUrlError::MissingScheme(_))
        ));
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://b:8000", "/api/token/"),
            "http://b:8000/api/token/"
        );
        assert_eq!(
            join_url("http://b:8000/", "api/courses/"),
            "http://b:8000/api/courses/"
        );
    }

    #[test]
    fn test_with_query() {
        assert_eq!(with_query("http://b/x".into(), Some("page=2")), "http://b/x?page=2");
        assert_eq!(with_query("http://b/x".into(), Some("")), "http://b/x");
        assert_eq!(with_query("http://b/x".into(), None), "http://b/x");
    }

    #[test]
    fn test_forwardable_headers_drop_host() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost:3000"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("12"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer t"));
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let forwarded = forwardable_headers(&headers);
        assert!(forwarded.get(header::HOST).is_none());
        assert!(forwarded.get(header::CONNECTION).is_none());
        assert!(forwarded.get(header::CONTENT_LENGTH).is_none());
        assert_eq!(forwarded.get(header::AUTHORIZATION).unwrap(), "Bearer t");
        assert_eq!(forwarded.get(header::CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_is_json() {
        let mut headers = HeaderMap::new();
        assert!(!is_json(&headers));

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        assert!(is_json(&headers));

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/html"));
        assert!(!is_json(&headers));
    }
}
