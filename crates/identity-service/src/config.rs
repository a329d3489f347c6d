use canteen_common::config::{PostgresSettings, RedisSettings, env_or, env_parse_or};

#[derive(Debug, Clone)]
pub struct Settings {
    pub service_name: String,
    pub port: u16,

    pub jwt_secret: String,

    pub postgres: PostgresSettings,
    pub redis: RedisSettings,

    /// Sliding window size in seconds (spec.md §4.D: `W`).
    pub rate_limit_window_secs: f64,
    /// Max attempts allowed per window (spec.md §4.D: `M`).
    pub rate_limit_max_attempts: u64,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            service_name: "identity-service".to_string(),
            port: env_parse_or("PORT", 8001),
            jwt_secret: env_or("JWT_SECRET_KEY", "CHANGE_ME_IN_PRODUCTION"),
            postgres: PostgresSettings::from_env(
                "IDENTITY_POSTGRES",
                "identity_db",
                "identity_user",
                "identity_pass",
            ),
            redis: RedisSettings::from_env(),
            rate_limit_window_secs: env_parse_or("RATE_LIMIT_WINDOW_SECONDS", 60.0),
            rate_limit_max_attempts: env_parse_or("RATE_LIMIT_MAX_ATTEMPTS", 3),
        }
    }
}
