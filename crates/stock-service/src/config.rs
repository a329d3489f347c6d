use canteen_common::config::{PostgresSettings, RedisSettings, env_parse_or};

#[derive(Debug, Clone)]
pub struct Settings {
    pub service_name: String,
    pub port: u16,
    pub postgres: PostgresSettings,
    pub redis: RedisSettings,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            service_name: "stock-service".to_string(),
            port: env_parse_or("PORT", 8002),
            postgres: PostgresSettings::from_env(
                "STOCK_POSTGRES",
                "stock_db",
                "stock_user",
                "stock_pass",
            ),
            redis: RedisSettings::from_env(),
        }
    }
}
