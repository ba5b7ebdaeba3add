use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::Rng;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::error::AppResult;
use crate::state::DbPool;

/// Lifetime of a session that only carries flash messages.
pub const ANONYMOUS_TTL_MINUTES: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Warning => "warning",
            FlashLevel::Danger => "danger",
        }
    }
}

/// One-shot message shown on the next rendered admin page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub user: Option<SessionUser>,
    pub flashes: Vec<Flash>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: generate_token(),
            user: None,
            flashes: Vec::new(),
        }
    }

    /// Nothing worth persisting.
    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.flashes.is_empty()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Where session state lives between requests.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a live session. Unknown and expired ids yield `None`.
    async fn load(&self, id: &str) -> AppResult<Option<Session>>;

    /// Insert or replace the session and push its expiry forward. Sessions
    /// without a user live for [`ANONYMOUS_TTL_MINUTES`] only.
    async fn save(&self, session: &Session) -> AppResult<()>;

    async fn destroy(&self, id: &str) -> AppResult<()>;

    /// Remove expired sessions, returning how many were deleted.
    async fn purge_expired(&self) -> AppResult<usize>;
}

pub struct SqliteSessionStore {
    pool: DbPool,
    ttl_hours: u64,
}

impl SqliteSessionStore {
    pub fn new(pool: DbPool, ttl_hours: u64) -> Self {
        Self { pool, ttl_hours }
    }

    fn expires_at(&self, session: &Session) -> String {
        let ttl = match session.user {
            Some(_) => Duration::hours(self.ttl_hours as i64),
            None => Duration::minutes(ANONYMOUS_TTL_MINUTES),
        };
        (Utc::now() + ttl)
            .format("%Y-%m-%dT%H:%M:%S%.6f")
            .to_string()
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn load(&self, id: &str) -> AppResult<Option<Session>> {
        let conn = self.pool.get()?;
        let row = conn
            .query_row(
                "SELECT s.id, s.user_id, u.username, s.flashes FROM sessions s
                 LEFT JOIN users u ON u.id = s.user_id
                 WHERE s.id = ?1 AND s.expires_at > ?2",
                params![id, crate::db::utc_timestamp()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<i64>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, user_id, username, flashes)) = row else {
            return Ok(None);
        };

        let user = match (user_id, username) {
            (Some(id), Some(username)) => Some(SessionUser { id, username }),
            _ => None,
        };
        let flashes: Vec<Flash> = serde_json::from_str(&flashes)?;

        Ok(Some(Session { id, user, flashes }))
    }

    async fn save(&self, session: &Session) -> AppResult<()> {
        let conn = self.pool.get()?;
        let flashes = serde_json::to_string(&session.flashes)?;
        conn.execute(
            "INSERT INTO sessions (id, user_id, flashes, expires_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                user_id = excluded.user_id,
                flashes = excluded.flashes,
                expires_at = excluded.expires_at",
            params![
                session.id,
                session.user.as_ref().map(|u| u.id),
                flashes,
                self.expires_at(session),
            ],
        )?;
        Ok(())
    }

    async fn destroy(&self, id: &str) -> AppResult<()> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
        Ok(())
    }

    async fn purge_expired(&self) -> AppResult<usize> {
        let conn = self.pool.get()?;
        let deleted = conn.execute(
            "DELETE FROM sessions WHERE expires_at <= ?1",
            params![crate::db::utc_timestamp()],
        )?;
        Ok(deleted)
    }
}

/// Purge expired sessions every `every`, starting immediately.
pub fn spawn_purge_task(
    store: Arc<dyn SessionStore>,
    every: std::time::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            match store.purge_expired().await {
                Ok(0) => {}
                Ok(n) => tracing::info!("Purged {} expired sessions", n),
                Err(e) => tracing::warn!("Session purge failed: {}", e),
            }
        }
    })
}

/// Generate a cryptographically random 32-byte hex token.
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
