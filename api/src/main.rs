/*
 * Responsibility
 * - tokio runtime 起動
 * - 設定読み込み → Halifax 組み立て → serve (ロジックは置かない)
 * - デモ用の /api/v1 routes
 */
use anyhow::Result;
use axum::{Router, routing::get};
use serde::Serialize;

use halifax_api::{ApiJson, Halifax, HalifaxConfig, Principal};

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct Me {
    subject: String,
    scopes: Vec<String>,
    roles: Vec<String>,
    admin: bool,
}

async fn health() -> ApiJson<Health> {
    ApiJson::ok(Health { status: "ok" })
}

async fn me(principal: Principal) -> ApiJson<Me> {
    let admin = principal.has_role("admin");
    ApiJson::ok(Me {
        subject: principal.subject,
        scopes: principal.scopes,
        roles: principal.roles,
        admin,
    })
}

fn routes() -> Router {
    Router::new().nest(
        "/api/v1",
        Router::new()
            .route("/health", get(health))
            .route("/me", get(me)),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    halifax_api::init_tracing();
    halifax_api::init_panic_hook();

    let config = HalifaxConfig::from_env()?;
    let halifax = Halifax::new(config)?;

    halifax_api::serve(halifax, routes()).await
}
