/*
 * Responsibility
 * - アプリ共通の AppError 定義 (業務エラー + 想定外エラー)
 * - (envelope, status) への変換: not found → 404 / unauthorized → 401 / その他業務エラー → 400 / 想定外 → 500
 * - IntoResponse 実装 (HTTP status / JSON envelope)
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use halifax_core::{ApiResponse, DomainError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Domain(DomainError::bad_request(message))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Domain(DomainError::unauthorized(message))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Domain(DomainError::not_found(message))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Domain(DomainError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Domain(DomainError::Unauthorized(_)) => StatusCode::UNAUTHORIZED,
            AppError::Domain(_) => StatusCode::BAD_REQUEST,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Envelope and status for this error. Never fails.
    pub fn to_response(&self) -> (ApiResponse<()>, StatusCode) {
        (ApiResponse::failure(self.to_string()), self.status())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Unexpected(err) = &self {
            tracing::error!(error = ?err, "unhandled error while processing request");
        }

        let (body, status) = self.to_response();
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    use super::*;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn classification_order() {
        assert_eq!(AppError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::unauthorized("x").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::from(anyhow::anyhow!("db down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn envelope_carries_message_and_no_data() {
        let (body, status) = AppError::not_found("order 9 not found").to_response();

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.data.is_none());
        assert_eq!(body.error_message(), Some("order 9 not found"));
    }

    #[tokio::test]
    async fn renders_json_envelope() {
        let (status, body) = render(AppError::bad_request("quantity must be positive")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": {"message": "quantity must be positive"}}));
    }

    #[tokio::test]
    async fn unexpected_errors_become_500() {
        let err = anyhow::anyhow!("connection reset").context("loading orders");
        let (status, body) = render(err.into()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": {"message": "loading orders"}}));
    }
}
