use std::sync::Arc;
use std::time::Duration;

use canteen_common::TokenAuthority;
use canteen_common::redis_client::RedisHandle;

use crate::idempotency::IdempotencyCache;

#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenAuthority>,
    pub redis: RedisHandle,
    pub idempotency: IdempotencyCache,
    pub http: reqwest::Client,
    pub stock_service_url: String,
    pub kitchen_service_url: String,
    pub upstream_timeout: Duration,
}
