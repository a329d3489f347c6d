//! Order store (spec.md §3 "Order", §4.G) plus the `kitchen_outbox` durable
//! task queue grounding the Worker Pool (spec.md §4.H).

use anyhow::{Context, Result};
use canteen_common::OrderStatus;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub order_id: Uuid,
    pub principal_id: String,
    pub status: String,
    pub special_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRow {
    pub fn parsed_status(&self) -> OrderStatus {
        self.status.parse().unwrap_or(OrderStatus::Pending)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct OrderItemRow {
    pub menu_item_id: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, FromRow)]
pub struct OutboxRow {
    pub outbox_id: i64,
    pub order_id: Uuid,
    pub status: String,
    pub attempts: i32,
}

pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("kitchen-service migration failed")
}

pub async fn enqueue_order(
    pool: &PgPool,
    order_id: Uuid,
    principal_id: &str,
    special_notes: Option<&str>,
    items: &[(String, i32)],
) -> Result<()> {
    let mut tx = pool.begin().await.context("begin enqueue_order tx failed")?;

    sqlx::query(
        r#"
        insert into orders (order_id, principal_id, status, special_notes)
        values ($1, $2, 'PENDING', $3)
        "#,
    )
    .bind(order_id)
    .bind(principal_id)
    .bind(special_notes)
    .execute(&mut *tx)
    .await
    .context("insert order failed")?;

    for (menu_item_id, quantity) in items {
        sqlx::query(
            "insert into order_items (order_id, menu_item_id, quantity) values ($1, $2, $3)",
        )
        .bind(order_id)
        .bind(menu_item_id)
        .bind(quantity)
        .execute(&mut *tx)
        .await
        .context("insert order_item failed")?;
    }

    sqlx::query("insert into kitchen_outbox (order_id, status) values ($1, 'PENDING')")
        .bind(order_id)
        .execute(&mut *tx)
        .await
        .context("insert outbox row failed")?;

    tx.commit().await.context("commit enqueue_order tx failed")?;
    Ok(())
}

pub async fn find_order(pool: &PgPool, order_id: Uuid) -> Result<Option<OrderRow>> {
    let row = sqlx::query_as::<_, OrderRow>(
        r#"
        select order_id, principal_id, status, special_notes, created_at, updated_at
        from orders
        where order_id = $1
        "#,
    )
    .bind(order_id)
    .fetch_optional(pool)
    .await
    .context("find_order failed")?;
    Ok(row)
}

pub async fn find_order_items(pool: &PgPool, order_id: Uuid) -> Result<Vec<OrderItemRow>> {
    let rows = sqlx::query_as::<_, OrderItemRow>(
        "select menu_item_id, quantity from order_items where order_id = $1",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await
    .context("find_order_items failed")?;
    Ok(rows)
}

pub async fn set_status(pool: &PgPool, order_id: Uuid, status: OrderStatus) -> Result<()> {
    sqlx::query("update orders set status = $1, updated_at = now() where order_id = $2")
        .bind(status.to_string())
        .bind(order_id)
        .execute(pool)
        .await
        .context("set_status failed")?;
    Ok(())
}

/// Claim up to `batch_size` PENDING outbox rows for exclusive processing.
/// Uses `FOR UPDATE SKIP LOCKED` so concurrent kitchen workers never claim
/// the same order (spec.md §4.H prefetch=1 is enforced by the caller
/// passing `batch_size = 1`).
pub async fn outbox_claim_batch(pool: &PgPool, batch_size: i64, worker_id: &str) -> Result<Vec<OutboxRow>> {
    let rows = sqlx::query_as::<_, OutboxRow>(
        r#"
        with to_claim as (
            select outbox_id
            from kitchen_outbox
            where status = 'PENDING'
            order by outbox_id asc
            limit $1
            for update skip locked
        )
        update kitchen_outbox
           set status = 'CLAIMED',
               claimed_at = now(),
               claimed_by = $2
         where outbox_id in (select outbox_id from to_claim)
        returning outbox_id, order_id, status, attempts
        "#,
    )
    .bind(batch_size)
    .bind(worker_id)
    .fetch_all(pool)
    .await
    .context("outbox_claim_batch failed")?;
    Ok(rows)
}

pub async fn outbox_mark_done(pool: &PgPool, outbox_id: i64) -> Result<()> {
    sqlx::query("update kitchen_outbox set status = 'DONE' where outbox_id = $1")
        .bind(outbox_id)
        .execute(pool)
        .await
        .context("outbox_mark_done failed")?;
    Ok(())
}

/// Release a CLAIMED row back to PENDING after a retryable failure,
/// incrementing the attempt counter.
pub async fn outbox_release_for_retry(pool: &PgPool, outbox_id: i64, error: &str) -> Result<()> {
    sqlx::query(
        r#"
        update kitchen_outbox
           set status = 'PENDING',
               attempts = attempts + 1,
               last_error = $2,
               claimed_at = null,
               claimed_by = null
         where outbox_id = $1
        "#,
    )
    .bind(outbox_id)
    .bind(error)
    .execute(pool)
    .await
    .context("outbox_release_for_retry failed")?;
    Ok(())
}

pub async fn outbox_mark_failed(pool: &PgPool, outbox_id: i64, error: &str) -> Result<()> {
    sqlx::query("update kitchen_outbox set status = 'FAILED', last_error = $2 where outbox_id = $1")
        .bind(outbox_id)
        .bind(error)
        .execute(pool)
        .await
        .context("outbox_mark_failed failed")?;
    Ok(())
}
