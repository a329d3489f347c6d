//! Environment-sourced configuration helpers shared by every service
//! (spec.md §6's "Configuration" table).

use std::env;
use std::fmt::Display;
use std::str::FromStr;

/// Read an environment variable, falling back to `default` if unset or empty.
pub fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Read and parse an environment variable, falling back to `default` on
/// absence or parse failure. Misconfiguration should never crash a service
/// at request time — only at startup, loudly, via `Settings::from_env`
/// callers choosing to validate further.
pub fn env_parse_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|err| {
            tracing::warn!(key, raw, %err, "failed to parse env var, using default");
            default
        }),
        Err(_) => default,
    }
}

/// Standard Redis settings shared across services.
#[derive(Debug, Clone)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
    pub db: u8,
    pub password: String,
}

impl RedisSettings {
    pub fn from_env() -> Self {
        Self {
            host: env_or("REDIS_HOST", "redis"),
            port: env_parse_or("REDIS_PORT", 6379),
            db: env_parse_or("REDIS_DB", 0),
            password: env_or("REDIS_PASSWORD", ""),
        }
    }

    pub fn url(&self) -> String {
        if self.password.is_empty() {
            format!("redis://{}:{}/{}", self.host, self.port, self.db)
        } else {
            format!(
                "redis://:{}@{}:{}/{}",
                self.password, self.host, self.port, self.db
            )
        }
    }
}

/// Standard Postgres settings shared across services (one DSN per service).
#[derive(Debug, Clone)]
pub struct PostgresSettings {
    pub host: String,
    pub port: u16,
    pub db: String,
    pub user: String,
    pub password: String,
}

impl PostgresSettings {
    pub fn from_env(db_prefix: &str, default_db: &str, default_user: &str, default_password: &str) -> Self {
        Self {
            host: env_or(&format!("{db_prefix}_HOST"), "localhost"),
            port: env_parse_or(&format!("{db_prefix}_PORT"), 5432),
            db: env_or(&format!("{db_prefix}_DB"), default_db),
            user: env_or(&format!("{db_prefix}_USER"), default_user),
            password: env_or(&format!("{db_prefix}_PASSWORD"), default_password),
        }
    }

    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.db
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redis_url_without_password() {
        let settings = RedisSettings {
            host: "redis".into(),
            port: 6379,
            db: 0,
            password: String::new(),
        };
        assert_eq!(settings.url(), "redis://redis:6379/0");
    }

    #[test]
    fn redis_url_with_password() {
        let settings = RedisSettings {
            host: "redis".into(),
            port: 6379,
            db: 0,
            password: "secret".into(),
        };
        assert_eq!(settings.url(), "redis://:secret@redis:6379/0");
    }
}
