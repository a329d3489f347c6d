use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use canteen_common::logging;
use kitchen_service::config::Settings;
use kitchen_service::state::AppState;
use kitchen_service::{db, handlers};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

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

    let state = Arc::new(AppState { db: db_pool });

    let app = Router::new()
        .route("/health", get(health))
        .route("/kitchen/orders", post(handlers::enqueue_order))
        .route("/kitchen/orders/{order_id}", get(handlers::get_order))
        .route("/kitchen/orders/{order_id}/advance", post(handlers::advance_order))
        .route("/kitchen/orders/{order_id}/revert", post(handlers::revert_order))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", settings.port);
    tracing::info!(%addr, "kitchen-api listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> StatusCode {
    StatusCode::OK
}
