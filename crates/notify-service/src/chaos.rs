//! Chaos fault-injection flag (spec.md §4.I, §6). A single named key in
//! the shared cache; any truthy string simulates an outage for both new
//! and existing streams.

use anyhow::Result;
use canteen_common::redis_client::RedisHandle;

const CHAOS_KEY: &str = "notify:chaos";

pub async fn is_enabled(redis: &RedisHandle) -> Result<bool> {
    let value = redis.get_string(CHAOS_KEY).await?;
    Ok(value.map(|v| is_truthy(&v)).unwrap_or(false))
}

pub async fn enable(redis: &RedisHandle) -> Result<()> {
    redis.set_ex(CHAOS_KEY, "true", 365 * 24 * 60 * 60).await
}

pub async fn disable(redis: &RedisHandle) -> Result<()> {
    redis.delete(CHAOS_KEY).await
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "enabled")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_truthy_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("enabled"));
    }

    #[test]
    fn rejects_falsy_and_unknown_values() {
        assert!(!is_truthy("0"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy(""));
    }
}
