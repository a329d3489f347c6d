//! Order State Machine (spec.md §4.G). G is the sole mutator of order
//! status; every forward transition persists then publishes.

use anyhow::{Context, Result};
use canteen_common::redis_client::RedisHandle;
use canteen_common::{OrderStatus, OrderStatusEvent};
use rand::Rng;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::db;

pub const PREP_MIN_SECS: u64 = 3;
pub const PREP_MAX_SECS: u64 = 7;

pub struct StateMachine {
    db: PgPool,
    redis: RedisHandle,
}

impl StateMachine {
    pub fn new(db: PgPool, redis: RedisHandle) -> Self {
        Self { db, redis }
    }

    /// Runs the full happy-path pipeline for one order, synchronously,
    /// start to finish (spec.md §4.H: "task body executes the full G
    /// pipeline synchronously").
    pub async fn run_to_completion(&self, order_id: Uuid) -> Result<()> {
        let order = db::find_order(&self.db, order_id)
            .await?
            .context("order vanished mid-processing")?;

        let mut status = order.parsed_status();
        if status.is_terminal() {
            return Ok(());
        }

        while let Some(next) = status.next_forward() {
            if next == OrderStatus::Ready && status == OrderStatus::InKitchen {
                let prep = rand::thread_rng().gen_range(PREP_MIN_SECS..=PREP_MAX_SECS);
                tokio::time::sleep(Duration::from_secs(prep)).await;
            }
            self.advance_and_publish(order_id, &order.principal_id, next).await?;
            status = next;
        }

        Ok(())
    }

    pub async fn fail(&self, order_id: Uuid, principal_id: &str) -> Result<()> {
        self.advance_and_publish(order_id, principal_id, OrderStatus::Failed).await
    }

    async fn advance_and_publish(&self, order_id: Uuid, principal_id: &str, status: OrderStatus) -> Result<()> {
        db::set_status(&self.db, order_id, status).await?;
        self.publish(order_id, principal_id, status).await
    }

    async fn publish(&self, order_id: Uuid, principal_id: &str, status: OrderStatus) -> Result<()> {
        let event = OrderStatusEvent {
            order_id: order_id.to_string(),
            status,
            principal_id: principal_id.to_string(),
        };
        let payload = serde_json::to_string(&event).context("failed to serialize order status event")?;
        let channel = format!("order:{order_id}");
        self.redis.publish(&channel, &payload).await
    }
}

/// Manual-override transition along the linear chain only (spec.md §4.G).
/// Does **not** publish — implemented literally per the spec's silence on
/// whether streams should reflect operator actions.
pub enum ManualDirection {
    Advance,
    Revert,
}

pub async fn manual_transition(
    db: &PgPool,
    order_id: Uuid,
    direction: ManualDirection,
) -> Result<Option<OrderStatus>> {
    let order = db::find_order(db, order_id).await?.context("order not found")?;
    let current = order.parsed_status();

    let next = match direction {
        ManualDirection::Advance => current.manual_advance(),
        ManualDirection::Revert => current.manual_revert(),
    };

    let Some(next) = next else {
        return Ok(None);
    };

    db::set_status(db, order_id, next).await?;
    Ok(Some(next))
}
