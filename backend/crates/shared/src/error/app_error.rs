//! Application Error - Unified error type for the web tier
//!
//! Defines [`AppError`] struct and [`AppResult<T>`] type alias.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use serde_json::{Map, Value};

use super::kind::ErrorKind;

/// アプリケーション統一エラー型
///
/// BFF とクライアントライブラリで共有する標準エラー型です。
/// ビルダーパターンで診断用フィールドを追加できます。
///
/// ## Fields
/// * `kind` - エラーの分類（HTTP ステータスコードにマッピング）
/// * `message` - ユーザー向けのエラーメッセージ
/// * `fields` - `error` と並べて JSON に展開される診断情報
/// * `source` - 元のエラー（オプション、ログ用）
///
/// ## Examples
/// ```rust
/// use kernel::error::app_error::AppError;
///
/// let err = AppError::internal("Proxy server crashed")
///     .with_field("details", "connection refused");
/// assert_eq!(err.status_code(), 500);
/// assert_eq!(err.to_body()["details"], "connection refused");
/// ```
pub struct AppError {
    kind: ErrorKind,
    message: Cow<'static, str>,
    fields: Map<String, Value>,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

/// アプリケーション結果型エイリアス
///
/// `Result<T, AppError>` の省略形です。
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// 新しいエラーを作成
    ///
    /// ## Arguments
    /// * `kind` - エラー種別
    /// * `message` - ユーザー向けメッセージ
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            fields: Map::new(),
            source: None,
        }
    }

    /// 400 Bad Request エラー
    #[inline]
    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    /// 401 Unauthorized エラー
    #[inline]
    pub fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// 404 Not Found エラー
    #[inline]
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// 500 Internal Server Error
    #[inline]
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
    }

    /// 502 Bad Gateway
    #[inline]
    pub fn bad_gateway(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::BadGateway, message)
    }

    /// 503 Service Unavailable
    #[inline]
    pub fn service_unavailable(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// レスポンスボディに診断用フィールドを追加
    ///
    /// ## Notes
    /// * キー `error` はメッセージ用に予約されているため無視される
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key != "error" {
            self.fields.insert(key, value.into());
        }
        self
    }

    /// 元のエラーを設定（ログ用、ボディには含まれない）
    #[inline]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    #[inline]
    pub fn is_server_error(&self) -> bool {
        self.kind.is_server_error()
    }

    /// JSON body sent to the browser: `{"error": message, ...fields}`
    pub fn to_body(&self) -> Value {
        let mut body = Map::with_capacity(self.fields.len() + 1);
        body.insert("error".to_string(), Value::String(self.message.to_string()));
        for (key, value) in &self.fields {
            body.insert(key.clone(), value.clone());
        }
        Value::Object(body)
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("AppError");
        builder.field("kind", &self.kind);
        builder.field("message", &self.message);
        if !self.fields.is_empty() {
            builder.field("fields", &self.fields);
        }
        if let Some(source) = &self.source {
            builder.field("source", source);
        }
        builder.finish()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

// ============================================================================
// Result extension traits
// ============================================================================

/// Wrap a foreign error into an [`AppError`] of the given kind.
pub trait ResultExt<T, E> {
    fn map_app_err(self, kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> AppResult<T>
    where
        E: Error + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn map_app_err(self, kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> AppResult<T>
    where
        E: Error + Send + Sync + 'static,
    {
        self.map_err(|e| AppError::new(kind, message).with_source(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_error() {
        let err = AppError::new(ErrorKind::Unauthorized, "No refresh token");
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.message(), "No refresh token");
        assert!(err.field("details").is_none());
    }

    #[test]
    fn test_convenience_constructors() {
        assert_eq!(AppError::bad_request("test").status_code(), 400);
        assert_eq!(AppError::unauthorized("test").status_code(), 401);
        assert_eq!(AppError::not_found("test").status_code(), 404);
        assert_eq!(AppError::internal("test").status_code(), 500);
        assert_eq!(AppError::bad_gateway("test").status_code(), 502);
        assert_eq!(AppError::service_unavailable("test").status_code(), 503);
    }

    #[test]
    fn test_body_flattens_fields() {
        let err = AppError::bad_request("No access token from backend")
            .with_field("endpoint", "/api/token/")
            .with_field("debug", json!([{"status": 200}]));

        assert_eq!(
            err.to_body(),
            json!({
                "error": "No access token from backend",
                "endpoint": "/api/token/",
                "debug": [{"status": 200}],
            })
        );
    }

    #[test]
    fn test_error_field_is_reserved() {
        let err = AppError::internal("Proxy server crashed").with_field("error", "overwritten");
        assert_eq!(err.to_body()["error"], "Proxy server crashed");
    }

    #[test]
    fn test_with_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = AppError::internal("Proxy server crashed").with_source(io_err);
        assert!(err.source().is_some());
        assert!(!err.to_body().to_string().contains("refused"));
    }

    #[test]
    fn test_display() {
        let err = AppError::not_found("Course not found");
        assert_eq!(err.to_string(), "[Not Found] Course not found");
    }

    #[test]
    fn test_result_ext() {
        let result: Result<i32, std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            "boom",
        ));
        let app_result = result.map_app_err(ErrorKind::BadGateway, "Backend unreachable");
        assert_eq!(app_result.unwrap_err().status_code(), 502);
    }
}
