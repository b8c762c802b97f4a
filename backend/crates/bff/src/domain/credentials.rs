//! Credential shapes and token discovery
//!
//! Backends disagree on both what a login body looks like and where the
//! tokens come back. The login flow tries every known shape and reads
//! every known field name.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

/// Field names that may hold an access token, in priority order
const ACCESS_FIELDS: [&str; 3] = ["access", "access_token", "token"];

/// Field names that may hold a refresh token, in priority order
const REFRESH_FIELDS: [&str; 2] = ["refresh", "refresh_token"];

/// Three base64url segments separated by dots
static JWT_LIKE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+").ok());

/// Non-empty value or nothing
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Build the login bodies to try, in order:
/// `{username}`, `{email: username || email}`, `{email}`,
/// `{identifier: username || email}`, each with the password.
///
/// Shapes without a password or without an identifier are skipped, so
/// an empty result means the request cannot be sent anywhere.
pub fn credential_candidates(
    username: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
) -> Vec<Value> {
    let Some(password) = present(password) else {
        return Vec::new();
    };
    let username = present(username);
    let email = present(email);
    let username_or_email = username.or(email);

    [
        ("username", username),
        ("email", username_or_email),
        ("email", email),
        ("identifier", username_or_email),
    ]
    .into_iter()
    .filter_map(|(field, value)| {
        let mut body = Map::with_capacity(2);
        body.insert(field.to_string(), Value::String(value?.to_string()));
        body.insert("password".to_string(), Value::String(password.to_string()));
        Some(Value::Object(body))
    })
    .collect()
}

fn first_string(body: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| {
        body.get(*field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// Access token under `access`, `access_token` or `token`
pub fn access_token(body: &Value) -> Option<String> {
    first_string(body, &ACCESS_FIELDS)
}

/// Refresh token under `refresh` or `refresh_token`
pub fn refresh_token(body: &Value) -> Option<String> {
    first_string(body, &REFRESH_FIELDS)
}

/// First JWT-looking string anywhere in the serialized body
pub fn find_jwt_like(body: &Value) -> Option<String> {
    let re = JWT_LIKE.as_ref()?;
    let flat = body.to_string();
    re.find(&flat).map(|m| m.as_str().to_string())
}

/// Top-level keys of a JSON object, for login diagnostics
pub fn object_keys(body: &Value) -> Vec<Value> {
    body.as_object()
        .map(|map| map.keys().map(|k| Value::String(k.clone())).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_candidates_with_username() {
        let candidates = credential_candidates(Some("alice"), None, Some("pw"));
        assert_eq!(
            candidates,
            vec![
                json!({"username": "alice", "password": "pw"}),
                json!({"email": "alice", "password": "pw"}),
                json!({"identifier": "alice", "password": "pw"}),
            ]
        );
    }

    #[test]
    fn test_candidates_with_email_only() {
        let candidates = credential_candidates(None, Some("a@x.io"), Some("pw"));
        assert_eq!(
            candidates,
            vec![
                json!({"email": "a@x.io", "password": "pw"}),
                json!({"email": "a@x.io", "password": "pw"}),
                json!({"identifier": "a@x.io", "password": "pw"}),
            ]
        );
    }

    #[test]
    fn test_candidates_require_password() {
        assert!(credential_candidates(Some("alice"), None, None).is_empty());
        assert!(credential_candidates(Some("alice"), None, Some("")).is_empty());
        assert!(credential_candidates(None, None, Some("pw")).is_empty());
    }

    #[test]
    fn test_token_field_names() {
        assert_eq!(access_token(&json!({"token": "t"})), Some("t".into()));
        assert_eq!(
            access_token(&json!({"access_token": "a", "token": "t"})),
            Some("a".into())
        );
        assert_eq!(refresh_token(&json!({"refresh_token": "r"})), Some("r".into()));
        assert_eq!(access_token(&json!({"access": ""})), None);
    }

    #[test]
    fn test_find_jwt_like() {
        let body = json!({"data": {"jwt": "aaa.bbb-1.c_c"}, "detail": "welcome back"});
        assert_eq!(find_jwt_like(&body), Some("aaa.bbb-1.c_c".into()));
        assert_eq!(find_jwt_like(&json!({"detail": "no token"})), None);
    }
}
