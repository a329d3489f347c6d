//! `/orders` handlers — the Ingress Gateway pipeline (spec.md §4.F).

use std::sync::Arc;

use axum::Extension;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use canteen_common::redis_client::RedisHandle;
use canteen_common::{ApiError, ApiResult};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth_middleware::AuthenticatedPrincipal;
use crate::idempotency::Fingerprint;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub menu_item_id: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub order_id: Option<Uuid>,
    pub items: Vec<OrderItemRequest>,
    pub special_notes: Option<String>,
}

const DEFAULT_ESTIMATED_WAIT_SECONDS: u32 = 300;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let redis_ok = state.redis.ping().await.is_ok();
    Json(json!({
        "status": if redis_ok { "ok" } else { "degraded" },
        "service": "gateway-service",
        "dependencies": { "redis": redis_ok },
    }))
}

pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
    Extension(Fingerprint(fingerprint)): Extension<Fingerprint>,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<Response> {
    if req.items.is_empty() {
        return Err(ApiError::Validation("order must contain at least one item".to_string()));
    }

    let order_id = req.order_id.unwrap_or_else(Uuid::new_v4);

    // Step 1: cache-only admission check (spec.md §4.F.1).
    for item in &req.items {
        if let Some(cached_stock) = get_cached_stock(&state.redis, &item.menu_item_id).await? {
            if cached_stock <= 0 {
                let body = json!({ "detail": format!("{} is out of stock", item.menu_item_id) });
                return finish(&state, &fingerprint, StatusCode::BAD_REQUEST, body).await;
            }
        }
    }

    // Step 2-3: deduct from the system of record via stock-service.
    for item in &req.items {
        let outcome = call_stock_deduct(&state, order_id, &principal.principal_id, item).await?;
        if let Err(response) = outcome {
            return finish(&state, &fingerprint, response.0, response.1).await;
        }
    }

    // Step 4: dispatch to kitchen (best-effort; dispatch failure is
    // non-fatal, spec.md §4.F.4).
    if let Err(err) = dispatch_to_kitchen(&state, order_id, &principal, &req).await {
        tracing::warn!(%order_id, error = %err, "kitchen dispatch failed, order acknowledged anyway");
    }

    // Step 5: best-effort cache decrement.
    for item in &req.items {
        let _ = decrement_cached_stock(&state.redis, &item.menu_item_id, item.quantity).await;
    }

    let body = json!({
        "order_id": order_id.to_string(),
        "status": "queued",
        "estimated_wait_seconds": DEFAULT_ESTIMATED_WAIT_SECONDS,
    });
    finish(&state, &fingerprint, StatusCode::ACCEPTED, body).await
}

pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let url = format!("{}/kitchen/orders/{}", state.kitchen_service_url, order_id);
    let response = state
        .http
        .get(&url)
        .timeout(state.upstream_timeout)
        .send()
        .await
        .map_err(|err| {
            if err.is_timeout() {
                ApiError::UpstreamTimeout
            } else {
                ApiError::UpstreamUnavailable
            }
        })?;

    if response.status() == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound(format!("no such order {order_id}")));
    }
    if !response.status().is_success() {
        return Err(ApiError::UpstreamUnavailable);
    }

    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|err| ApiError::Internal(anyhow::anyhow!("malformed kitchen-service response: {err}")))?;
    Ok(Json(body))
}

/// Captures the response into the idempotency cache (only for status <
/// 500, spec.md §4.E) and returns it to the client.
async fn finish(
    state: &AppState,
    fingerprint: &str,
    status: StatusCode,
    body: serde_json::Value,
) -> ApiResult<Response> {
    if status.as_u16() < 500 {
        if let Err(err) = state.idempotency.store(fingerprint, status.as_u16(), body.clone()).await {
            tracing::warn!(error = %err, "failed to persist idempotency entry");
        }
    }
    Ok((status, Json(body)).into_response())
}

async fn get_cached_stock(redis: &RedisHandle, menu_item_id: &str) -> ApiResult<Option<i32>> {
    let key = format!("stock:{menu_item_id}");
    let value = redis.get_string(&key).await.map_err(ApiError::Internal)?;
    Ok(value.and_then(|v| v.parse::<i32>().ok()))
}

async fn decrement_cached_stock(redis: &RedisHandle, menu_item_id: &str, quantity: i32) -> anyhow::Result<()> {
    if let Some(current) = get_cached_stock(redis, menu_item_id).await.unwrap_or(None) {
        let floored = (current - quantity).max(0);
        let key = format!("stock:{menu_item_id}");
        redis.set_ex(&key, &floored.to_string(), 10).await?;
    }
    Ok(())
}

async fn call_stock_deduct(
    state: &AppState,
    order_id: Uuid,
    principal_id: &str,
    item: &OrderItemRequest,
) -> ApiResult<Result<(), (StatusCode, serde_json::Value)>> {
    let url = format!("{}/stock/deduct", state.stock_service_url);
    let payload = json!({
        "order_id": order_id,
        "principal_id": principal_id,
        "menu_item_id": item.menu_item_id,
        "quantity": item.quantity,
    });

    let response = state
        .http
        .post(&url)
        .timeout(state.upstream_timeout)
        .json(&payload)
        .send()
        .await
        .map_err(|err| {
            if err.is_timeout() {
                ApiError::UpstreamTimeout
            } else {
                ApiError::UpstreamUnavailable
            }
        })?;

    let status = response.status();
    if status.is_success() {
        return Ok(Ok(()));
    }

    let detail: serde_json::Value = response
        .json()
        .await
        .unwrap_or_else(|_| json!({ "detail": "stock service error" }));

    let mapped_status = if status == StatusCode::CONFLICT {
        StatusCode::CONFLICT
    } else if status == StatusCode::NOT_FOUND {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    Ok(Err((mapped_status, detail)))
}

async fn dispatch_to_kitchen(
    state: &AppState,
    order_id: Uuid,
    principal: &AuthenticatedPrincipal,
    req: &CreateOrderRequest,
) -> anyhow::Result<()> {
    let url = format!("{}/kitchen/orders", state.kitchen_service_url);
    let payload = json!({
        "order_id": order_id,
        "principal_id": principal.principal_id,
        "special_notes": req.special_notes,
        "items": req.items.iter().map(|i| json!({
            "menu_item_id": i.menu_item_id,
            "quantity": i.quantity,
        })).collect::<Vec<_>>(),
    });

    let response = state
        .http
        .post(&url)
        .timeout(state.upstream_timeout)
        .json(&payload)
        .send()
        .await?;

    if !response.status().is_success() {
        anyhow::bail!("kitchen-service returned {}", response.status());
    }
    Ok(())
}
