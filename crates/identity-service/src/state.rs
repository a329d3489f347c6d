use canteen_common::TokenAuthority;
use sqlx::PgPool;
use std::sync::Arc;

use crate::rate_limit::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub tokens: Arc<TokenAuthority>,
    pub rate_limiter: Arc<RateLimiter>,
}
