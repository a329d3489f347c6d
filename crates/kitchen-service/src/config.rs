use canteen_common::config::{PostgresSettings, RedisSettings, env_parse_or};

#[derive(Debug, Clone)]
pub struct Settings {
    pub service_name: String,
    pub port: u16,
    pub postgres: PostgresSettings,
    pub redis: RedisSettings,
    /// Worker-pool retry policy (spec.md §4.H): 3 retries, 5s fixed delay.
    pub worker_max_retries: u32,
    pub worker_retry_delay_secs: u64,
    pub worker_poll_interval_secs: u64,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            service_name: "kitchen-service".to_string(),
            port: env_parse_or("PORT", 8003),
            postgres: PostgresSettings::from_env(
                "KITCHEN_POSTGRES",
                "kitchen_db",
                "kitchen_user",
                "kitchen_pass",
            ),
            redis: RedisSettings::from_env(),
            worker_max_retries: env_parse_or("WORKER_MAX_RETRIES", 3),
            worker_retry_delay_secs: env_parse_or("WORKER_RETRY_DELAY_SECONDS", 5),
            worker_poll_interval_secs: env_parse_or("WORKER_POLL_INTERVAL_SECONDS", 1),
        }
    }
}
