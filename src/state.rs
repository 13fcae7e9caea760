use std::sync::Arc;

use crate::auth::session::{MemorySessionStore, SessionStore};
use crate::config::AppConfig;
use crate::db::{Db, RetryPolicy};

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub config: Arc<AppConfig>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let retry = RetryPolicy::fixed(config.retry.max_attempts, config.retry.delay());
        let db = Db::connect(&config.database_url, config.max_connections, retry).await?;
        let sessions = Arc::new(MemorySessionStore::default()) as Arc<dyn SessionStore>;
        Ok(Self::from_parts(db, config, sessions))
    }

    pub fn from_parts(db: Db, config: Arc<AppConfig>, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            db,
            config,
            sessions,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State over a fresh migrated database; keep the `TempDir` alive.
    pub async fn fake() -> (Self, tempfile::TempDir) {
        use crate::config::{RetryConfig, SessionConfig};

        let (db, dir) = crate::db::test_db::fresh().await;
        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            max_connections: 4,
            retry: RetryConfig {
                max_attempts: 3,
                delay_ms: 1,
            },
            session: SessionConfig {
                cookie_name: "hospital_session".into(),
                secure_cookie: false,
            },
        });
        let sessions = Arc::new(MemorySessionStore::default()) as Arc<dyn SessionStore>;
        (Self::from_parts(db, config, sessions), dir)
    }
}
