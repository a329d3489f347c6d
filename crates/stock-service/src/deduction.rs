//! Deduction Engine (spec.md §4.B) — CAS stock updates with bounded
//! exponential-backoff retry against a single hot row.

use anyhow::{Context, Result};
use rand::Rng;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::cache::StockCache;
use crate::db;

const MAX_ATTEMPTS: u32 = 5;
const BASE_DELAY_MS: u64 = 50;
const CAP_DELAY_MS: u64 = 1000;
const JITTER_MS: u64 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeductOutcome {
    Deducted { new_stock: i32 },
    InsufficientStock,
    NotFound,
    Conflict,
}

pub struct DeductionEngine {
    db: PgPool,
    cache: StockCache,
}

impl DeductionEngine {
    pub fn new(db: PgPool, cache: StockCache) -> Self {
        Self { db, cache }
    }

    pub async fn deduct(
        &self,
        order_id: Uuid,
        principal_id: &str,
        menu_item_id: &str,
        quantity: i32,
    ) -> Result<DeductOutcome> {
        for attempt in 1..=MAX_ATTEMPTS {
            if attempt > 1 {
                tokio::time::sleep(backoff_delay(attempt)).await;
            }

            let Some(row) = db::find_by_menu_item(&self.db, menu_item_id).await? else {
                return Ok(DeductOutcome::NotFound);
            };

            if row.current_stock < quantity {
                // Insufficient-stock is not retried (spec.md §4.B).
                return Ok(DeductOutcome::InsufficientStock);
            }

            let new_stock = row.current_stock - quantity;
            let affected = db::cas_deduct_with_audit(
                &self.db,
                order_id,
                menu_item_id,
                row.version,
                new_stock,
                quantity,
                principal_id,
            )
            .await
            .context("cas update with audit failed")?;

            if affected == 0 {
                // Another writer's CAS won; retry from a fresh read.
                continue;
            }

            self.cache
                .set_stock(menu_item_id, new_stock)
                .await
                .context("stock cache refresh failed")?;

            return Ok(DeductOutcome::Deducted { new_stock });
        }

        Ok(DeductOutcome::Conflict)
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    let exp = BASE_DELAY_MS.saturating_mul(1u64 << attempt).min(CAP_DELAY_MS);
    let jitter = rand::thread_rng().gen_range(0..=JITTER_MS);
    Duration::from_millis(exp + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_never_exceeds_cap_plus_jitter() {
        for attempt in 2..=MAX_ATTEMPTS {
            let delay = backoff_delay(attempt);
            assert!(delay.as_millis() <= (CAP_DELAY_MS + JITTER_MS) as u128);
        }
    }
}
