//! Publish, stream and chaos-toggle handlers (spec.md §4.I, §6).

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::response::sse::Sse;
use canteen_common::{ApiError, ApiResult, OrderStatusEvent};
use serde::Deserialize;

use crate::chaos;
use crate::state::AppState;
use crate::stream::build_stream;

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub order_id: String,
    pub status: canteen_common::OrderStatus,
    pub principal_id: String,
}

pub async fn publish(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PublishRequest>,
) -> ApiResult<StatusCode> {
    let event = OrderStatusEvent {
        order_id: req.order_id.clone(),
        status: req.status,
        principal_id: req.principal_id,
    };
    let payload = serde_json::to_string(&event)
        .map_err(|err| ApiError::Validation(format!("malformed publish payload: {err}")))?;
    let channel = format!("order:{}", req.order_id);

    state
        .redis
        .publish(&channel, &payload)
        .await
        .map_err(ApiError::Internal)?;

    Ok(StatusCode::OK)
}

pub async fn stream(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> ApiResult<axum::response::Response> {
    if chaos::is_enabled(&state.redis).await.map_err(ApiError::Internal)? {
        return Err(ApiError::UpstreamUnavailable);
    }

    let body = build_stream(state.redis.clone(), order_id, &state.settings)
        .await
        .map_err(ApiError::Internal)?;

    // Keepalive framing is handled explicitly inside `build_stream` per the
    // stream protocol's own cadence; axum's automatic ping would double up.
    let mut response = Sse::new(body).into_response();
    response
        .headers_mut()
        .insert("Cache-Control", HeaderValue::from_static("no-cache"));
    Ok(response)
}

pub async fn enable_chaos(State(state): State<Arc<AppState>>) -> ApiResult<StatusCode> {
    chaos::enable(&state.redis).await.map_err(ApiError::Internal)?;
    Ok(StatusCode::OK)
}

pub async fn disable_chaos(State(state): State<Arc<AppState>>) -> ApiResult<StatusCode> {
    chaos::disable(&state.redis).await.map_err(ApiError::Internal)?;
    Ok(StatusCode::OK)
}

pub async fn chaos_status(State(state): State<Arc<AppState>>) -> ApiResult<Json<serde_json::Value>> {
    let enabled = chaos::is_enabled(&state.redis).await.map_err(ApiError::Internal)?;
    Ok(Json(serde_json::json!({ "chaos_enabled": enabled })))
}
