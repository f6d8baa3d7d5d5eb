/*
 * Responsibility
 * - 分類済みエラーの閉じた集合 (ErrorKind) と HTTP status の対応表
 * - handler が投げ、client が受け取る業務エラー (DomainError)
 */
use http::StatusCode;
use thiserror::Error;

/// Classified failure kinds.
///
/// `status()` and `from_status()` are inverses over {400, 401, 404}.
/// `Internal` maps to 500, which a client never classifies back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    NotFound,
    Internal,
}

impl ErrorKind {
    pub const CLASSIFIED: [ErrorKind; 3] = [
        ErrorKind::BadRequest,
        ErrorKind::Unauthorized,
        ErrorKind::NotFound,
    ];

    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn from_status(status: StatusCode) -> Option<Self> {
        match status {
            StatusCode::BAD_REQUEST => Some(ErrorKind::BadRequest),
            StatusCode::UNAUTHORIZED => Some(ErrorKind::Unauthorized),
            StatusCode::NOT_FOUND => Some(ErrorKind::NotFound),
            _ => None,
        }
    }
}

/// Expected, caller-recoverable failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
}

impl DomainError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Returns `None` for [`ErrorKind::Internal`], which is not a business error.
    pub fn from_kind(kind: ErrorKind, message: impl Into<String>) -> Option<Self> {
        match kind {
            ErrorKind::BadRequest => Some(Self::bad_request(message)),
            ErrorKind::Unauthorized => Some(Self::unauthorized(message)),
            ErrorKind::NotFound => Some(Self::not_found(message)),
            ErrorKind::Internal => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequest(_) => ErrorKind::BadRequest,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::NotFound(_) => ErrorKind::NotFound,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.kind().status()
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(m) | Self::Unauthorized(m) | Self::NotFound(m) => m,
        }
    }
}
