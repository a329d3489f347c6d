use canteen_common::config::{RedisSettings, env_or, env_parse_or};

#[derive(Debug, Clone)]
pub struct Settings {
    pub service_name: String,
    pub port: u16,
    pub jwt_secret: String,
    pub redis: RedisSettings,
    pub stock_service_url: String,
    pub kitchen_service_url: String,
    pub upstream_timeout_secs: u64,
    pub idempotency_ttl_secs: u64,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            service_name: "gateway-service".to_string(),
            port: env_parse_or("PORT", 8000),
            jwt_secret: env_or("JWT_SECRET_KEY", "CHANGE_ME_IN_PRODUCTION"),
            redis: RedisSettings::from_env(),
            stock_service_url: env_or("STOCK_SERVICE_URL", "http://localhost:8002"),
            kitchen_service_url: env_or("KITCHEN_SERVICE_URL", "http://localhost:8003"),
            upstream_timeout_secs: env_parse_or("UPSTREAM_TIMEOUT_SECONDS", 5),
            idempotency_ttl_secs: env_parse_or("IDEMPOTENCY_TTL_SECONDS", 24 * 60 * 60),
        }
    }
}
