//! Error Kind - Classification of errors
//!
//! Defines the [`ErrorKind`] enum that maps to HTTP status codes.

use serde::Serialize;

/// エラー種別の列挙体
///
/// HTTP ステータスコードに対応するエラー分類を定義します。
/// BFF ハンドラはレスポンスのステータス決定に、クライアントライブラリは
/// ログイン画面へ戻すべきかの判定に使用します。
///
/// ## Notes
/// * 各バリアントはちょうど 1 つのステータスコードに対応する
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// let kind = ErrorKind::Unauthorized;
/// assert_eq!(kind.status_code(), 401);
/// assert!(kind.is_auth_failure());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 400 - Bad Request: リクエストまたはバックエンド応答が不正
    BadRequest,
    /// 401 - Unauthorized: 認証情報がない、または拒否された
    Unauthorized,
    /// 403 - Forbidden: アクセス権限なし
    Forbidden,
    /// 404 - Not Found: リソースが見つからない
    NotFound,
    /// 405 - Method Not Allowed: メソッドが許可されていない
    MethodNotAllowed,
    /// 408 - Request Timeout: リクエストタイムアウト
    RequestTimeout,
    /// 422 - Unprocessable Entity: 処理不可能なエンティティ
    UnprocessableEntity,
    /// 429 - Too Many Requests: レート制限超過
    TooManyRequests,
    /// 500 - Internal Server Error: プロキシ自身の失敗
    InternalServerError,
    /// 502 - Bad Gateway: バックエンド応答が解釈できない
    BadGateway,
    /// 503 - Service Unavailable: バックエンドに到達できない、または未設定
    ServiceUnavailable,
    /// 504 - Gateway Timeout: バックエンドが時間内に応答しない
    GatewayTimeout,
}

impl ErrorKind {
    /// HTTP ステータスコードを取得
    ///
    /// ## Returns
    /// RFC 9110 に準拠した HTTP ステータスコード
    ///
    /// ## Examples
    /// ```rust
    /// use kernel::error::kind::ErrorKind;
    /// assert_eq!(ErrorKind::BadRequest.status_code(), 400);
    /// assert_eq!(ErrorKind::BadGateway.status_code(), 502);
    /// ```
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::MethodNotAllowed => 405,
            ErrorKind::RequestTimeout => 408,
            ErrorKind::UnprocessableEntity => 422,
            ErrorKind::TooManyRequests => 429,
            ErrorKind::InternalServerError => 500,
            ErrorKind::BadGateway => 502,
            ErrorKind::ServiceUnavailable => 503,
            ErrorKind::GatewayTimeout => 504,
        }
    }

    /// Standard reason phrase
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::MethodNotAllowed => "Method Not Allowed",
            ErrorKind::RequestTimeout => "Request Timeout",
            ErrorKind::UnprocessableEntity => "Unprocessable Entity",
            ErrorKind::TooManyRequests => "Too Many Requests",
            ErrorKind::InternalServerError => "Internal Server Error",
            ErrorKind::BadGateway => "Bad Gateway",
            ErrorKind::ServiceUnavailable => "Service Unavailable",
            ErrorKind::GatewayTimeout => "Gateway Timeout",
        }
    }

    /// ステータスコードからエラー種別を逆引き
    ///
    /// ## Notes
    /// * 未知の 4xx は `BadRequest`、未知の 5xx は `InternalServerError` に畳み込む
    /// * それ以外はエラーではないため `None`
    pub const fn from_status_code(code: u16) -> Option<Self> {
        match code {
            400 => Some(ErrorKind::BadRequest),
            401 => Some(ErrorKind::Unauthorized),
            403 => Some(ErrorKind::Forbidden),
            404 => Some(ErrorKind::NotFound),
            405 => Some(ErrorKind::MethodNotAllowed),
            408 => Some(ErrorKind::RequestTimeout),
            422 => Some(ErrorKind::UnprocessableEntity),
            429 => Some(ErrorKind::TooManyRequests),
            502 => Some(ErrorKind::BadGateway),
            503 => Some(ErrorKind::ServiceUnavailable),
            504 => Some(ErrorKind::GatewayTimeout),
            400..=499 => Some(ErrorKind::BadRequest),
            500..=599 => Some(ErrorKind::InternalServerError),
            _ => None,
        }
    }

    /// 5xx kinds. These get logged at error level.
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// 4xx kinds.
    #[inline]
    pub const fn is_client_error(&self) -> bool {
        let code = self.status_code();
        code >= 400 && code < 500
    }

    /// True for the kind that sends the user back to the login view.
    #[inline]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, ErrorKind::Unauthorized)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
