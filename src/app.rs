/*
 * Responsibility
 * - Config読み込み → AuthPipeline 生成 → Router 組み立て
 * - Middleware の適用 (HTTP 層 / Bearer guard)
 * - axum::serve() で起動
 */
use std::{panic, process};

use anyhow::Result;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{api, config::Config, middleware, services::auth::build_auth_pipeline, state::AppState};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,sealed_bearer=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr が見えない起動方法でも panic を tracing に残す
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();

    // 設定不備はここで起動失敗にする
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = AppState::new(build_auth_pipeline(&config)?);
    let app = middleware::http::apply(build_router(state), config.request_timeout);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    async fn index() -> Json<Value> {
        Json(json!({ "ok": true }))
    }

    Router::new()
        .route("/", get(index))
        .nest("/api/v1", api::v1::routes(state.clone()))
        .with_state(state)
}
