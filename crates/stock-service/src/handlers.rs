//! `/stock/*` HTTP surface (spec.md §4.A-C, §6).

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use canteen_common::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db;
use crate::deduction::DeductOutcome;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DeductRequest {
    pub order_id: Uuid,
    pub principal_id: String,
    pub menu_item_id: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct DeductResponse {
    pub menu_item_id: String,
    pub new_stock: i32,
}

#[derive(Debug, Serialize)]
pub struct InventoryResponse {
    pub menu_item_id: String,
    pub current_stock: i32,
    pub initial_stock: i32,
    pub version: i64,
}

impl From<db::InventoryRow> for InventoryResponse {
    fn from(row: db::InventoryRow) -> Self {
        Self {
            menu_item_id: row.menu_item_id,
            current_stock: row.current_stock,
            initial_stock: row.initial_stock,
            version: row.version,
        }
    }
}

pub async fn deduct(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeductRequest>,
) -> ApiResult<Json<DeductResponse>> {
    if req.quantity < 1 {
        return Err(ApiError::Validation("quantity must be >= 1".to_string()));
    }

    let outcome = state
        .engine
        .deduct(req.order_id, &req.principal_id, &req.menu_item_id, req.quantity)
        .await
        .map_err(ApiError::Internal)?;

    match outcome {
        DeductOutcome::Deducted { new_stock } => Ok(Json(DeductResponse {
            menu_item_id: req.menu_item_id,
            new_stock,
        })),
        DeductOutcome::InsufficientStock => {
            Err(ApiError::Conflict("insufficient stock".to_string()))
        }
        DeductOutcome::NotFound => {
            Err(ApiError::NotFound(format!("unknown menu item {}", req.menu_item_id)))
        }
        DeductOutcome::Conflict => Err(ApiError::Conflict(
            "exhausted retries contending on this item".to_string(),
        )),
    }
}

pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(menu_item_id): Path<String>,
) -> ApiResult<Json<InventoryResponse>> {
    let row = db::find_by_menu_item(&state.db, &menu_item_id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound(format!("unknown menu item {menu_item_id}")))?;
    Ok(Json(row.into()))
}

pub async fn list_items(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<InventoryResponse>>> {
    let rows = db::list_all(&state.db).await.map_err(ApiError::Internal)?;
    Ok(Json(rows.into_iter().map(InventoryResponse::from).collect()))
}
