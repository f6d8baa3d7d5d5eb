//! HTTP-level middleware (cross-cutting concerns).
//!
//! Responsibility:
//! - Request-Id generation + propagation (X-Request-Id)
//! - Access logging / request tracing (TraceLayer)
//! - Body size limits
//! - Global timeout (408 envelope)
//! - Panics inside handlers become a 500 envelope instead of a dropped connection
//! - Framework rejections (bad JSON, body too large, wrong method) become envelopes

use std::any::Any;
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::body::to_bytes;
use axum::error_handling::HandleErrorLayer;
use axum::http::{
    StatusCode,
    header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderName},
};
use axum::middleware::map_response;
use axum::response::{IntoResponse, Response};
use halifax_core::ApiResponse;
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

const BODY_LIMIT_BYTES: usize = 1024 * 1024;
// Rejection bodies are short plain-text reasons; anything longer is dropped.
const REJECTION_BODY_LIMIT: usize = 4096;

/// Apply HTTP-level middleware to the given Router.
pub fn apply(router: Router, timeout: Duration) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");

    let layers = ServiceBuilder::new()
        // Make the service error `Infallible` by converting errors into responses.
        .layer(HandleErrorLayer::new(handle_layer_error))
        // Generate a request id if missing, then propagate it to the response.
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(TimeoutLayer::new(timeout))
        .layer(CatchPanicLayer::custom(handle_panic));

    router
        .layer(layers)
        .layer(map_response(envelope_rejections))
}

/// Rewrite error responses that are not JSON (axum extractor rejections,
/// 405s, the body limit's 413) into the failure envelope, keeping the status
/// and the other headers.
async fn envelope_rejections(response: Response) -> Response {
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) || is_json(&response) {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, REJECTION_BODY_LIMIT)
        .await
        .unwrap_or_default();
    let reason = String::from_utf8_lossy(&bytes).trim().to_string();
    let message = if reason.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    } else {
        reason
    };

    tracing::debug!(status = status.as_u16(), %message, "enveloping rejection");

    let mut rewritten = (status, Json(ApiResponse::<()>::failure(message))).into_response();
    for (name, value) in &parts.headers {
        if name != CONTENT_TYPE && name != CONTENT_LENGTH {
            rewritten.headers_mut().append(name, value.clone());
        }
    }
    rewritten
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

async fn handle_layer_error(err: BoxError) -> Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(ApiResponse::<()>::failure("Request timed out")),
        )
            .into_response()
    } else {
        tracing::error!(error = %err, "unhandled middleware error");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::failure("Internal server error")),
        )
            .into_response()
    }
}

fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");

    tracing::error!(panic = %detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::failure("Internal server error")),
    )
        .into_response()
}
