//! Thin wrapper around the shared Redis instance (spec.md §2, §3).
//!
//! Every service dials the same Redis deployment for the stock cache,
//! idempotency cache, rate limiter, pub/sub channels and chaos flag. A
//! `ConnectionManager` gives us a cheap-to-clone, auto-reconnecting handle
//! that's safe to put in `AppState` and share across the Tokio runtime.

use anyhow::{Context, Result};
use redis::aio::{ConnectionManager, PubSub};
use redis::{AsyncCommands, Client};

#[derive(Clone)]
pub struct RedisHandle {
    manager: ConnectionManager,
    client: Client,
}

impl RedisHandle {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = Client::open(url).context("invalid redis url")?;
        let manager = client
            .get_connection_manager()
            .await
            .context("failed to connect to redis")?;
        Ok(Self { manager, client })
    }

    /// A dedicated (non-pooled) connection for pub/sub — each long-lived
    /// SSE stream in notify-service owns one of these.
    pub async fn pubsub(&self) -> Result<PubSub> {
        let conn = self
            .client
            .get_async_pubsub()
            .await
            .context("failed to open pubsub connection")?;
        Ok(conn)
    }

    pub async fn get_string(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(key).await.context("redis GET failed")?;
        Ok(value)
    }

    pub async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let mut conn = self.manager.clone();
        let _: () = conn
            .set_ex(key, value, ttl_secs)
            .await
            .context("redis SETEX failed")?;
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        let _: () = conn.del(key).await.context("redis DEL failed")?;
        Ok(())
    }

    pub async fn publish(&self, channel: &str, payload: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        let _: () = conn
            .publish(channel, payload)
            .await
            .context("redis PUBLISH failed")?;
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.manager.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .context("redis PING failed")?;
        Ok(())
    }

    /// Raw pipeline execution for the sliding-window rate limiter
    /// (ZREMRANGEBYSCORE + ZCARD + ZADD + EXPIRE, spec.md §4.D).
    pub fn manager(&self) -> ConnectionManager {
        self.manager.clone()
    }
}
