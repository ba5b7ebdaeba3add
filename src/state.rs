use std::sync::Arc;

use axum_extra::extract::cookie::Key;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::auth::{SessionStore, SqliteSessionStore};
use crate::config::Config;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub sessions: Arc<dyn SessionStore>,
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> anyhow::Result<Self> {
        let cookie_key = config.cookie_key()?;
        let sessions = Arc::new(SqliteSessionStore::new(
            db.clone(),
            config.auth.session_hours,
        ));
        Ok(Self {
            db,
            config,
            sessions,
            cookie_key,
        })
    }
}
