use rusqlite::{params, Connection};

use crate::db::{format_timestamp, now_timestamp, DatabaseError};
use crate::models::{AlertLogEntry, AlertType};

use super::{column_enum, column_timestamp};

pub fn insert_alert(
    conn: &Connection,
    user_id: i64,
    reading_id: Option<i64>,
    alert_type: AlertType,
    message: &str,
) -> Result<AlertLogEntry, DatabaseError> {
    let created_at = now_timestamp();
    conn.execute(
        "INSERT INTO alert_log (user_id, reading_id, alert_type, message, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user_id,
            reading_id,
            alert_type.as_str(),
            message,
            format_timestamp(&created_at),
        ],
    )?;
    Ok(AlertLogEntry {
        id: conn.last_insert_rowid(),
        user_id,
        reading_id,
        alert_type,
        message: message.to_string(),
        created_at,
    })
}

pub fn list_alerts(conn: &Connection, user_id: i64) -> Result<Vec<AlertLogEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, reading_id, alert_type, message, created_at FROM alert_log
         WHERE user_id = ?1 ORDER BY created_at ASC, id ASC",
    )?;
    let rows = stmt.query_map(params![user_id], |row| {
        let alert_type: String = row.get(3)?;
        let created_at: String = row.get(5)?;
        Ok(AlertLogEntry {
            id: row.get(0)?,
            user_id: row.get(1)?,
            reading_id: row.get(2)?,
            alert_type: column_enum(3, &alert_type)?,
            message: row.get(4)?,
            created_at: column_timestamp(5, &created_at)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}
