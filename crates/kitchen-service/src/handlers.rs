//! `/kitchen/orders/*` HTTP surface — enqueue, query, manual override
//! (spec.md §4.F dispatch target, §4.G manual-override interface).

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use canteen_common::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db;
use crate::state::AppState;
use crate::state_machine::{ManualDirection, manual_transition};

#[derive(Debug, Deserialize)]
pub struct EnqueueItem {
    pub menu_item_id: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    pub order_id: Uuid,
    pub principal_id: String,
    pub special_notes: Option<String>,
    pub items: Vec<EnqueueItem>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order_id: String,
    pub status: String,
    pub principal_id: String,
}

impl From<db::OrderRow> for OrderResponse {
    fn from(row: db::OrderRow) -> Self {
        Self {
            order_id: row.order_id.to_string(),
            status: row.status,
            principal_id: row.principal_id,
        }
    }
}

pub async fn enqueue_order(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EnqueueRequest>,
) -> ApiResult<Json<OrderResponse>> {
    if req.items.is_empty() {
        return Err(ApiError::Validation("order must contain at least one item".to_string()));
    }

    let items: Vec<(String, i32)> = req
        .items
        .into_iter()
        .map(|i| (i.menu_item_id, i.quantity))
        .collect();

    db::enqueue_order(
        &state.db,
        req.order_id,
        &req.principal_id,
        req.special_notes.as_deref(),
        &items,
    )
    .await
    .map_err(ApiError::Internal)?;

    let order = db::find_order(&state.db, req.order_id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("order vanished immediately after insert")))?;
    Ok(Json(order.into()))
}

pub async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
) -> ApiResult<Json<OrderResponse>> {
    let order = db::find_order(&state.db, order_id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound(format!("no such order {order_id}")))?;
    Ok(Json(order.into()))
}

pub async fn advance_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
) -> ApiResult<Json<OrderResponse>> {
    manual_move(&state, order_id, ManualDirection::Advance).await
}

pub async fn revert_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
) -> ApiResult<Json<OrderResponse>> {
    manual_move(&state, order_id, ManualDirection::Revert).await
}

async fn manual_move(
    state: &AppState,
    order_id: Uuid,
    direction: ManualDirection,
) -> ApiResult<Json<OrderResponse>> {
    let result = manual_transition(&state.db, order_id, direction)
        .await
        .map_err(ApiError::Internal)?;

    if result.is_none() {
        return Err(ApiError::Validation(
            "transition would advance past READY, revert before PENDING, or touch FAILED".to_string(),
        ));
    }

    let order = db::find_order(&state.db, order_id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound(format!("no such order {order_id}")))?;
    Ok(Json(order.into()))
}
