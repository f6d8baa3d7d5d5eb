//! Bearer token (JWT) 検証 → Principal を extensions に入れる
//!
//! - `Authorization` ヘッダが無い / Bearer 以外: 匿名のまま通す (保護は `Principal` extractor 側)
//! - Bearer token の検証失敗: Unauthorized envelope (401) で即座に拒否する
//! - 検証成功: `Principal` を request extensions に格納する

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::services::auth::JwtAuthenticator;

pub const CHALLENGE_MESSAGE: &str = "Request is not authorized";

/// Apply bearer authentication to every route of the given Router.
pub fn apply(router: Router, authenticator: Arc<JwtAuthenticator>) -> Router {
    router.layer(middleware::from_fn_with_state(authenticator, authenticate))
}

async fn authenticate(
    State(authenticator): State<Arc<JwtAuthenticator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(req.headers()) else {
        return Ok(next.run(req).await);
    };

    let principal = token
        .ok_or_else(|| AppError::unauthorized(CHALLENGE_MESSAGE))
        .and_then(|token| {
            authenticator.verify(token).map_err(|err| {
                tracing::warn!(error = %err, "bearer token verification failed");
                AppError::unauthorized(CHALLENGE_MESSAGE)
            })
        })?;

    tracing::debug!(subject = %principal.subject, "authenticated request");

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

// None: no bearer credentials. Some(None): bearer scheme with an unusable token.
fn bearer_token(headers: &HeaderMap) -> Option<Option<&str>> {
    let value = headers.get(header::AUTHORIZATION)?;
    let Ok(value) = value.to_str() else {
        return Some(None);
    };
    let (scheme, token) = value.split_once(' ').unwrap_or((value, ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    Some((!token.is_empty()).then_some(token))
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::StatusCode, routing::get};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::extractors::Principal;
    use crate::services::auth::tests::{auth_config, valid_token};

    async fn whoami(principal: Principal) -> String {
        principal.subject
    }

    async fn open() -> &'static str {
        "open"
    }

    fn router() -> Router {
        let authenticator = Arc::new(JwtAuthenticator::new(&auth_config()).unwrap());
        let routes = Router::new()
            .route("/me", get(whoami))
            .route("/open", get(open));
        apply(routes, authenticator)
    }

    async fn call(uri: &str, authorization: Option<&str>) -> (StatusCode, Vec<u8>) {
        let mut req = axum::http::Request::builder().uri(uri);
        if let Some(value) = authorization {
            req = req.header(header::AUTHORIZATION, value);
        }
        let res = router()
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    fn challenge() -> Value {
        json!({"error": {"message": CHALLENGE_MESSAGE}})
    }

    #[tokio::test]
    async fn valid_token_reaches_handler() {
        let token = valid_token("user-7");
        let (status, body) = call("/me", Some(&format!("Bearer {token}"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"user-7");
    }

    #[tokio::test]
    async fn invalid_token_is_rejected_with_envelope() {
        let (status, body) = call("/open", Some("Bearer not-a-jwt")).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), challenge());
    }

    #[tokio::test]
    async fn empty_bearer_is_rejected() {
        let (status, _) = call("/open", Some("Bearer   ")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn anonymous_requests_pass_until_a_principal_is_required() {
        let (status, body) = call("/open", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"open");

        let (status, body) = call("/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), challenge());
    }

    #[tokio::test]
    async fn other_schemes_are_ignored() {
        let (status, _) = call("/open", Some("Basic dXNlcjpwYXNz")).await;
        assert_eq!(status, StatusCode::OK);
    }
}
