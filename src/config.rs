use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub retry: RetryConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://hospital.db".into());
        let max_connections = env_parse("DB_MAX_CONNECTIONS").unwrap_or(5);
        let retry = RetryConfig {
            max_attempts: env_parse("DB_RETRY_ATTEMPTS").unwrap_or(5),
            delay_ms: env_parse("DB_RETRY_DELAY_MS").unwrap_or(1000),
        };
        let session = SessionConfig {
            cookie_name: std::env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "hospital_session".into()),
            secure_cookie: env_parse("SESSION_COOKIE_SECURE").unwrap_or(false),
        };
        anyhow::ensure!(retry.max_attempts > 0, "DB_RETRY_ATTEMPTS must be at least 1");
        Ok(Self {
            database_url,
            max_connections,
            retry,
            session,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}
