use canteen_common::config::{RedisSettings, env_parse_or};

#[derive(Debug, Clone)]
pub struct Settings {
    pub service_name: String,
    pub port: u16,
    pub redis: RedisSettings,
    pub stream_retry_ms: u64,
    pub keepalive_secs: u64,
    pub poll_timeout_secs: u64,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            service_name: "notify-service".to_string(),
            port: env_parse_or("PORT", 8004),
            redis: RedisSettings::from_env(),
            stream_retry_ms: env_parse_or("STREAM_RETRY_MS", 3000),
            keepalive_secs: env_parse_or("STREAM_KEEPALIVE_SECONDS", 15),
            poll_timeout_secs: env_parse_or("STREAM_POLL_TIMEOUT_SECONDS", 1),
        }
    }
}
