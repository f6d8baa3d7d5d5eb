/*
 * Responsibility
 * - 設定から依存 (JWT 検証器, OpenAPI 文書) を一度だけ組み立てる
 * - Router 組み立て: root greeting, user routes, Swagger, fallback 404
 * - Middleware の適用 (auth → CORS → HTTP layers)
 * - axum::serve() で起動 (Ctrl-C で graceful shutdown)
 */
use std::{fmt, panic, sync::Arc};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::openapi::OpenApi;

use crate::config::HalifaxConfig;
use crate::docs;
use crate::error::AppError;
use crate::middleware;
use crate::services::auth::{AuthError, JwtAuthenticator};

/// Server-side setup built once at startup and shared by reference.
#[derive(Clone)]
pub struct Halifax {
    config: Arc<HalifaxConfig>,
    authenticator: Option<Arc<JwtAuthenticator>>,
    openapi: OpenApi,
}

impl fmt::Debug for Halifax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Halifax")
            .field("config", &self.config)
            .field("authenticator", &self.authenticator)
            .field("openapi_title", &self.openapi.info.title)
            .finish()
    }
}

impl Halifax {
    pub fn new(config: HalifaxConfig) -> Result<Self, AuthError> {
        let authenticator = config
            .auth
            .as_ref()
            .map(JwtAuthenticator::new)
            .transpose()?
            .map(Arc::new);
        let openapi = docs::default_document(&config.name);

        Ok(Self {
            config: Arc::new(config),
            authenticator,
            openapi,
        })
    }

    /// Serve this document on Swagger instead of the empty default.
    pub fn with_openapi(mut self, openapi: OpenApi) -> Self {
        self.openapi = openapi;
        self
    }

    pub fn config(&self) -> &HalifaxConfig {
        &self.config
    }

    /// Wrap application routes with the Halifax stack.
    ///
    /// `routes` must not define `/` (the greeting) or the Swagger paths; any
    /// fallback it sets is replaced by the 404 envelope.
    pub fn router(&self, routes: Router) -> Router {
        let greeting = format!("Hello {}!", self.config.name);

        let router = Router::new()
            .route(
                "/",
                get(move || {
                    let greeting = greeting.clone();
                    async move { greeting }
                }),
            )
            .merge(routes)
            .fallback(not_found);

        let router = docs::apply(router, &self.config.name, self.openapi.clone());

        let router = match &self.authenticator {
            Some(authenticator) => middleware::auth::apply(router, authenticator.clone()),
            None => router,
        };

        let router = middleware::cors::apply(router, &self.config);
        middleware::http::apply(router, self.config.request_timeout)
    }
}

async fn not_found() -> AppError {
    AppError::not_found("Resource not found")
}

pub fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,halifax_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub fn init_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Surface panics via tracing so they don't get lost when stderr is hidden.
        // The request itself is answered by the catch-panic layer.
        tracing::error!(%info, "panic");
        default_hook(info);
    }))
}

pub async fn serve(halifax: Halifax, routes: Router) -> Result<()> {
    let config = halifax.config.clone();
    let app = halifax.router(routes);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    tracing::info!(
        name = %config.name,
        env = ?config.app_env,
        addr = %config.addr,
        auth = config.auth.is_some(),
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        extract::Path,
        http::{Request, StatusCode, header},
    };
    use halifax_core::DomainError;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::extractors::Principal;
    use crate::response::ApiJson;
    use crate::services::auth::tests::{auth_config, valid_token};

    async fn order(Path(id): Path<u32>) -> Result<ApiJson<Value>, AppError> {
        match id {
            1 => Ok(ApiJson::ok(json!({"id": 1}))),
            2 => Err(DomainError::bad_request("order 2 is closed").into()),
            3 => Err(anyhow::anyhow!("storage unavailable").into()),
            _ => Err(AppError::not_found(format!("order {id} not found"))),
        }
    }

    async fn me(principal: Principal) -> ApiJson<String> {
        ApiJson::ok(principal.subject)
    }

    fn routes() -> Router {
        Router::new()
            .route("/orders/{id}", get(order))
            .route("/me", get(me))
    }

    async fn call(router: Router, uri: &str, token: Option<String>) -> (StatusCode, Vec<u8>) {
        let mut req = Request::builder().uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let res = router
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    fn json_body(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn root_greets_with_display_name() {
        let halifax = Halifax::new(HalifaxConfig::default().with_name("Orders")).unwrap();
        let (status, body) = call(halifax.router(routes()), "/", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"Hello Orders!");
    }

    #[tokio::test]
    async fn handler_results_are_enveloped() {
        let halifax = Halifax::new(HalifaxConfig::default()).unwrap();
        let cases = [
            ("/orders/1", StatusCode::OK, json!({"data": {"id": 1}})),
            (
                "/orders/2",
                StatusCode::BAD_REQUEST,
                json!({"error": {"message": "order 2 is closed"}}),
            ),
            (
                "/orders/3",
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": {"message": "storage unavailable"}}),
            ),
            (
                "/orders/9",
                StatusCode::NOT_FOUND,
                json!({"error": {"message": "order 9 not found"}}),
            ),
        ];

        for (uri, expected_status, expected_body) in cases {
            let (status, body) = call(halifax.router(routes()), uri, None).await;
            assert_eq!(status, expected_status, "{uri}");
            assert_eq!(json_body(&body), expected_body, "{uri}");
        }
    }

    #[tokio::test]
    async fn unknown_routes_get_404_envelope() {
        let halifax = Halifax::new(HalifaxConfig::default()).unwrap();
        let (status, body) = call(halifax.router(routes()), "/nope", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json_body(&body), json!({"error": {"message": "Resource not found"}}));
    }

    #[tokio::test]
    async fn principal_routes_without_auth_configured_are_unauthorized() {
        let halifax = Halifax::new(HalifaxConfig::default()).unwrap();
        let (status, _) = call(halifax.router(routes()), "/me", None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn bearer_auth_is_wired_when_configured() {
        let halifax = Halifax::new(HalifaxConfig::default().with_auth(auth_config())).unwrap();

        let (status, body) = call(halifax.router(routes()), "/me", Some(valid_token("u-1"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body), json!({"data": "u-1"}));

        let (status, body) = call(halifax.router(routes()), "/me", Some("junk".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(&body),
            json!({"error": {"message": "Request is not authorized"}})
        );
    }

    #[tokio::test]
    async fn swagger_document_is_served() {
        let halifax = Halifax::new(HalifaxConfig::default().with_name("Orders")).unwrap();
        let (status, body) = call(
            halifax.router(routes()),
            crate::docs::OPENAPI_JSON_PATH,
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body)["info"]["title"], "Orders");
    }

    #[tokio::test]
    async fn extractor_rejections_are_enveloped() {
        let halifax = Halifax::new(HalifaxConfig::default()).unwrap();
        let (status, body) = call(halifax.router(routes()), "/orders/abc", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = json_body(&body)["error"]["message"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(message.contains("Cannot parse"), "{message}");
    }

    #[test]
    fn debug_names_the_document_without_key_material() {
        let halifax = Halifax::new(
            HalifaxConfig::default()
                .with_name("Orders")
                .with_auth(auth_config()),
        )
        .unwrap();
        let debug = format!("{halifax:?}");

        assert!(debug.contains("openapi_title: \"Orders\""), "{debug}");
        assert!(!debug.contains(crate::services::auth::tests::SECRET));
    }
}
