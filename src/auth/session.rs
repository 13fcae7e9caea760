use std::{collections::HashMap, fmt, str::FromStr};

use axum::{
    async_trait,
    http::{header::COOKIE, HeaderMap},
};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::config::SessionConfig;

/// Opaque session token carried in the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.simple(), f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Maps session tokens to user ids.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, user_id: i64) -> SessionId;
    async fn resolve(&self, id: &SessionId) -> Option<i64>;
    async fn destroy(&self, id: &SessionId);
}

/// Process-local store; sessions do not survive a restart.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, i64>>,
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: i64) -> SessionId {
        let id = SessionId::generate();
        self.sessions.write().await.insert(id, user_id);
        debug!(user_id, "session created");
        id
    }

    async fn resolve(&self, id: &SessionId) -> Option<i64> {
        self.sessions.read().await.get(id).copied()
    }

    async fn destroy(&self, id: &SessionId) {
        if let Some(user_id) = self.sessions.write().await.remove(id) {
            debug!(user_id, "session destroyed");
        }
    }
}

/// Value of the named cookie from the request headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}

pub fn session_id_from_headers(headers: &HeaderMap, cfg: &SessionConfig) -> Option<SessionId> {
    cookie_value(headers, &cfg.cookie_name)?.parse().ok()
}

pub fn session_cookie(cfg: &SessionConfig, id: &SessionId) -> String {
    let mut cookie = format!("{}={}; HttpOnly; SameSite=Lax; Path=/", cfg.cookie_name, id);
    if cfg.secure_cookie {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn expired_cookie(cfg: &SessionConfig) -> String {
    format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
        cfg.cookie_name
    )
}
