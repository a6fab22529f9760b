use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{format_timestamp, now_timestamp, DatabaseError};
use crate::models::User;

use super::user::{row_to_user, USER_COLUMNS};

/// Store a session keyed by the SHA-256 of its bearer token.
pub fn insert_session(
    conn: &Connection,
    token_hash: &[u8; 32],
    user_id: i64,
    expires_at: &NaiveDateTime,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            &token_hash[..],
            user_id,
            format_timestamp(&now_timestamp()),
            format_timestamp(expires_at),
        ],
    )?;
    Ok(())
}

/// Resolve an unexpired session to its user.
pub fn find_session_user(
    conn: &Connection,
    token_hash: &[u8; 32],
    now: &NaiveDateTime,
) -> Result<Option<User>, DatabaseError> {
    let sql = format!(
        "SELECT {USER_COLUMNS} FROM sessions s
         JOIN users u ON u.id = s.user_id
         WHERE s.token_hash = ?1 AND s.expires_at > ?2"
    );
    let user = conn
        .query_row(&sql, params![&token_hash[..], format_timestamp(now)], row_to_user)
        .optional()?;
    Ok(user)
}

pub fn delete_session(conn: &Connection, token_hash: &[u8; 32]) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM sessions WHERE token_hash = ?1",
        params![&token_hash[..]],
    )?;
    Ok(())
}

/// Remove sessions that expired before `now`.
pub fn prune_expired_sessions(
    conn: &Connection,
    now: &NaiveDateTime,
) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM sessions WHERE expires_at <= ?1",
        params![format_timestamp(now)],
    )?;
    Ok(deleted)
}
