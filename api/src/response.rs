use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use halifax_core::ApiResponse;
use serde::Serialize;

/// Handler payload wrapped in the success envelope: `{"data": ...}`.
#[derive(Debug, Clone)]
pub struct ApiJson<T> {
    status: StatusCode,
    data: T,
}

impl<T> ApiJson<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            data,
        }
    }

    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::with(self.data))).into_response()
    }
}
