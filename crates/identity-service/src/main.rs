mod config;
mod db;
mod handlers;
mod middleware;
mod rate_limit;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use canteen_common::redis_client::RedisHandle;
use canteen_common::{TokenAuthority, logging};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::rate_limit::RateLimiter;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env();
    logging::init_tracing(&settings.service_name);

    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&settings.postgres.url())
        .await?;
    db::migrate(&db_pool).await?;

    let redis = RedisHandle::connect(&settings.redis.url()).await?;
    let rate_limiter = Arc::new(RateLimiter::new(
        redis,
        settings.rate_limit_window_secs,
        settings.rate_limit_max_attempts,
    ));

    let state = Arc::new(AppState {
        db: db_pool,
        tokens: Arc::new(TokenAuthority::new(&settings.jwt_secret)),
        rate_limiter,
    });

    let login_route = Router::new()
        .route("/auth/login", post(handlers::login))
        .route_layer(from_fn_with_state(state.clone(), middleware::login_rate_limit));

    let app = Router::new()
        .route("/health", get(health))
        .route("/auth/refresh", post(handlers::refresh))
        .route("/auth/register", post(handlers::register))
        .route("/auth/change-password", post(handlers::change_password))
        .merge(login_route)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", settings.port);
    tracing::info!(%addr, "identity-service listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn health() -> StatusCode {
    StatusCode::OK
}
