//! Sliding-window rate limiter (spec.md §4.D).
//!
//! Applied to `POST /auth/login`, keyed on the student id from the request
//! body (falling back to the peer address). One Redis sorted set per key;
//! the count is read *before* the current attempt is added, so the Mth
//! legitimate request is allowed and the (M+1)th is denied.

use anyhow::{Context, Result};
use canteen_common::redis_client::RedisHandle;
use std::time::{SystemTime, UNIX_EPOCH};

const KEY_PREFIX: &str = "ratelimit:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Denied { retry_after_secs: u64 },
}

pub struct RateLimiter {
    redis: RedisHandle,
    window_secs: f64,
    max_attempts: u64,
}

impl RateLimiter {
    pub fn new(redis: RedisHandle, window_secs: f64, max_attempts: u64) -> Self {
        Self {
            redis,
            window_secs,
            max_attempts,
        }
    }

    pub async fn check_and_record(&self, key: &str) -> Result<RateLimitDecision> {
        let now = now_secs_f64();
        let window_start = now - self.window_secs;
        let redis_key = format!("{KEY_PREFIX}{key}");
        let ttl = (self.window_secs + 1.0).ceil() as usize;

        let mut conn = self.redis.manager();
        // Pipelined, not atomic (spec.md §5: "must not assume atomicity
        // across pipeline boundaries unless using server-side scripting").
        let (_removed, count, _added, _expire): (i64, i64, i64, i64) = redis::pipe()
            .zrembyscore(&redis_key, "-inf", window_start)
            .zcard(&redis_key)
            .zadd(&redis_key, now.to_string(), now)
            .expire(&redis_key, ttl as i64)
            .query_async(&mut conn)
            .await
            .context("rate limiter pipeline failed")?;

        Ok(decide(count as u64, self.max_attempts, self.window_secs as u64))
    }
}

/// Pure decision rule, split out so it's testable without a Redis instance.
/// `count` is the number of attempts already in the window *before* this
/// one is recorded.
fn decide(count: u64, max_attempts: u64, window_secs: u64) -> RateLimitDecision {
    if count >= max_attempts {
        RateLimitDecision::Denied {
            retry_after_secs: window_secs,
        }
    } else {
        RateLimitDecision::Allowed
    }
}

fn now_secs_f64() -> f64 {
    let dur = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    dur.as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_m_attempts_then_denies() {
        // count is read BEFORE this attempt is inserted, so with M=3:
        // counts 0,1,2 (the 1st, 2nd, 3rd attempts) are allowed, count 3+
        // (the 4th attempt) is denied.
        assert_eq!(decide(0, 3, 60), RateLimitDecision::Allowed);
        assert_eq!(decide(1, 3, 60), RateLimitDecision::Allowed);
        assert_eq!(decide(2, 3, 60), RateLimitDecision::Allowed);
        assert_eq!(
            decide(3, 3, 60),
            RateLimitDecision::Denied {
                retry_after_secs: 60
            }
        );
    }
}
