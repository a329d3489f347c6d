//! Inventory Store (spec.md §4.A) — versioned rows, append-only audit log.
//! The store is the only component permitted to change `version`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct InventoryRow {
    pub menu_item_id: String,
    pub current_stock: i32,
    pub initial_stock: i32,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("stock-service migration failed")
}

pub async fn find_by_menu_item(pool: &PgPool, menu_item_id: &str) -> Result<Option<InventoryRow>> {
    let row = sqlx::query_as::<_, InventoryRow>(
        r#"
        select menu_item_id, current_stock, initial_stock, version, updated_at
        from inventory
        where menu_item_id = $1
        "#,
    )
    .bind(menu_item_id)
    .fetch_optional(pool)
    .await
    .context("find_by_menu_item failed")?;
    Ok(row)
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<InventoryRow>> {
    let rows = sqlx::query_as::<_, InventoryRow>(
        "select menu_item_id, current_stock, initial_stock, version, updated_at from inventory order by menu_item_id",
    )
    .fetch_all(pool)
    .await
    .context("list_all failed")?;
    Ok(rows)
}

/// Conditional update predicated on `expected_version`, followed by the
/// audit log append, both in a single transaction (spec.md §4.B step 4:
/// "append audit entry in the same transaction, commit"). Returns the
/// number of rows the CAS update affected — 0 means another writer's CAS
/// won first (spec.md §4.B step 3, "stale-version signal") and the
/// transaction is rolled back without touching the audit log.
pub async fn cas_deduct_with_audit(
    pool: &PgPool,
    order_id: Uuid,
    menu_item_id: &str,
    expected_version: i64,
    new_stock: i32,
    quantity: i32,
    principal_id: &str,
) -> Result<u64> {
    let mut tx = pool.begin().await.context("begin cas_deduct_with_audit tx failed")?;

    let result = sqlx::query(
        r#"
        update inventory
        set current_stock = $1, version = version + 1, updated_at = now()
        where menu_item_id = $2 and version = $3
        "#,
    )
    .bind(new_stock)
    .bind(menu_item_id)
    .bind(expected_version)
    .execute(&mut *tx)
    .await
    .context("cas_deduct failed")?;

    let affected = result.rows_affected();
    if affected == 0 {
        tx.rollback().await.context("rollback stale cas_deduct tx failed")?;
        return Ok(0);
    }

    sqlx::query(
        r#"
        insert into stock_deduction_log (order_id, menu_item_id, quantity, principal_id)
        values ($1, $2, $3, $4)
        "#,
    )
    .bind(order_id)
    .bind(menu_item_id)
    .bind(quantity)
    .bind(principal_id)
    .execute(&mut *tx)
    .await
    .context("append_audit_entry failed")?;

    tx.commit().await.context("commit cas_deduct_with_audit tx failed")?;
    Ok(affected)
}
