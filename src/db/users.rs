use rusqlite::{params, OptionalExtension};

use crate::db::models::User;
use crate::db::utc_timestamp;
use crate::error::AppResult;
use crate::state::DbPool;

pub fn count_users(pool: &DbPool) -> AppResult<i64> {
    let conn = pool.get()?;
    let count = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    Ok(count)
}

pub fn find_user_by_username(pool: &DbPool, username: &str) -> AppResult<Option<User>> {
    let conn = pool.get()?;
    let user = conn
        .query_row(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
            params![username],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    password_hash: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}

/// Insert a user whose password has already been hashed.
pub fn create_user(pool: &DbPool, username: &str, password_hash: &str) -> AppResult<i64> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
        params![username, password_hash, utc_timestamp()],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert the first account in one statement. `None` when any user already
/// exists, so concurrent first-run submissions create at most one admin.
pub fn create_first_user(
    pool: &DbPool,
    username: &str,
    password_hash: &str,
) -> AppResult<Option<i64>> {
    let conn = pool.get()?;
    let inserted = conn.execute(
        "INSERT INTO users (username, password_hash, created_at)
         SELECT ?1, ?2, ?3
         WHERE NOT EXISTS (SELECT 1 FROM users)",
        params![username, password_hash, utc_timestamp()],
    )?;
    Ok((inserted == 1).then(|| conn.last_insert_rowid()))
}

/// Returns the user when the password matches the stored bcrypt hash.
pub fn verify_credentials(pool: &DbPool, username: &str, password: &str) -> AppResult<Option<User>> {
    let Some(user) = find_user_by_username(pool, username)? else {
        return Ok(None);
    };
    // A malformed stored hash counts as a failed login rather than a server error
    let matches = bcrypt::verify(password, &user.password_hash).unwrap_or(false);
    Ok(matches.then_some(user))
}
