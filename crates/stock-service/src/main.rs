mod cache;
mod config;
mod db;
mod deduction;
mod handlers;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use canteen_common::logging;
use canteen_common::redis_client::RedisHandle;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::cache::StockCache;
use crate::config::Settings;
use crate::deduction::DeductionEngine;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env();
    logging::init_tracing(&settings.service_name);

    let db_pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&settings.postgres.url())
        .await?;
    db::migrate(&db_pool).await?;

    let redis = RedisHandle::connect(&settings.redis.url()).await?;
    let cache = StockCache::new(redis);
    let engine = Arc::new(DeductionEngine::new(db_pool.clone(), cache.clone()));

    let state = Arc::new(AppState {
        db: db_pool,
        cache,
        engine,
    });

    let app = Router::new()
        .route("/health", get(health))
        .route("/stock/deduct", post(handlers::deduct))
        .route("/stock/{menu_item_id}", get(handlers::get_item))
        .route("/stock", get(handlers::list_items))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", settings.port);
    tracing::info!(%addr, "stock-service listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> StatusCode {
    StatusCode::OK
}
