mod auth_middleware;
mod config;
mod handlers;
mod idempotency;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use canteen_common::TokenAuthority;
use canteen_common::logging;
use canteen_common::redis_client::RedisHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::idempotency::{IdempotencyCache, idempotency_replay};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env();
    logging::init_tracing(&settings.service_name);

    let redis = RedisHandle::connect(&settings.redis.url()).await?;
    let idempotency = IdempotencyCache::new(redis.clone(), settings.idempotency_ttl_secs);
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.upstream_timeout_secs))
        .build()?;

    let state = Arc::new(AppState {
        tokens: Arc::new(TokenAuthority::new(&settings.jwt_secret)),
        redis,
        idempotency,
        http,
        stock_service_url: settings.stock_service_url.clone(),
        kitchen_service_url: settings.kitchen_service_url.clone(),
        upstream_timeout: Duration::from_secs(settings.upstream_timeout_secs),
    });

    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/orders", post(handlers::create_order))
        .route("/orders/{id}", get(handlers::get_order))
        .layer(from_fn_with_state(state.clone(), auth_middleware::require_bearer_auth))
        // Applied after (so it wraps) the auth layer: idempotency must run
        // before auth, so a cached replay never needs a valid token
        // (spec.md §4.E, §4.F).
        .layer(from_fn_with_state(state.clone(), idempotency_replay))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", settings.port);
    tracing::info!(%addr, "gateway-service listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
