//! Stock Cache (spec.md §4.C) — advisory, short-TTL mirror of per-item
//! stock. Missing key means "unknown, fall through"; present key reflects
//! a recent writer's view.

use anyhow::Result;
use canteen_common::redis_client::RedisHandle;

const KEY_PREFIX: &str = "stock:";
const TTL_SECS: u64 = 10;

#[derive(Clone)]
pub struct StockCache {
    redis: RedisHandle,
}

impl StockCache {
    pub fn new(redis: RedisHandle) -> Self {
        Self { redis }
    }

    pub async fn get_stock(&self, menu_item_id: &str) -> Result<Option<i32>> {
        let key = format!("{KEY_PREFIX}{menu_item_id}");
        let value = self.redis.get_string(&key).await?;
        Ok(value.and_then(|v| v.parse::<i32>().ok()))
    }

    pub async fn set_stock(&self, menu_item_id: &str, stock: i32) -> Result<()> {
        let key = format!("{KEY_PREFIX}{menu_item_id}");
        self.redis.set_ex(&key, &stock.to_string(), TTL_SECS).await
    }
}
