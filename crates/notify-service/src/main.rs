mod chaos;
mod config;
mod handlers;
mod state;
mod stream;

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use canteen_common::logging;
use canteen_common::redis_client::RedisHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env();
    logging::init_tracing(&settings.service_name);

    let redis = RedisHandle::connect(&settings.redis.url()).await?;
    let state = Arc::new(AppState {
        redis,
        settings: settings.clone(),
    });

    let app = Router::new()
        .route("/health", get(health))
        .route("/notifications/publish", post(handlers::publish))
        .route("/notifications/stream/{order_id}", get(handlers::stream))
        .route("/notifications/chaos/enable", post(handlers::enable_chaos))
        .route("/notifications/chaos/disable", post(handlers::disable_chaos))
        .route("/notifications/chaos", get(handlers::chaos_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", settings.port);
    tracing::info!(%addr, "notify-service listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> StatusCode {
    StatusCode::OK
}
