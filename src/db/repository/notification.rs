use rusqlite::{params, Connection};

use crate::db::{format_timestamp, now_timestamp, DatabaseError};
use crate::models::Notification;

use super::column_timestamp;

pub fn insert_notification(
    conn: &Connection,
    owner_id: i64,
    message: &str,
    link: Option<&str>,
) -> Result<Notification, DatabaseError> {
    let created_at = now_timestamp();
    conn.execute(
        "INSERT INTO notifications (owner_id, message, link, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![owner_id, message, link, format_timestamp(&created_at)],
    )?;
    Ok(Notification {
        id: conn.last_insert_rowid(),
        owner_id,
        message: message.to_string(),
        link: link.map(str::to_string),
        read: false,
        created_at,
    })
}

/// Notifications for a user, newest first.
pub fn list_notifications(
    conn: &Connection,
    owner_id: i64,
) -> Result<Vec<Notification>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, message, link, read, created_at
         FROM notifications WHERE owner_id = ?1
         ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![owner_id], |row| {
        let created_at: String = row.get(5)?;
        Ok(Notification {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            message: row.get(2)?,
            link: row.get(3)?,
            read: row.get(4)?,
            created_at: column_timestamp(5, &created_at)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Mark a notification read. Returns false when it does not belong to `owner_id`.
pub fn mark_notification_read(
    conn: &Connection,
    id: i64,
    owner_id: i64,
) -> Result<bool, DatabaseError> {
    let affected = conn.execute(
        "UPDATE notifications SET read = 1 WHERE id = ?1 AND owner_id = ?2",
        params![id, owner_id],
    )?;
    Ok(affected > 0)
}
