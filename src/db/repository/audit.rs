use chrono::Duration;
use rusqlite::{params, Connection};

use crate::db::{format_timestamp, now_timestamp, DatabaseError};
use crate::models::AuditEntry;

use super::column_timestamp;

/// Append an audit row. `user_id` is None for anonymous actions.
pub fn insert_audit_entry(
    conn: &Connection,
    user_id: Option<i64>,
    action: &str,
    entity: Option<&str>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO audit_log (user_id, action, entity, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![user_id, action, entity, format_timestamp(&now_timestamp())],
    )?;
    Ok(())
}

/// Audit trail for one user, oldest first.
pub fn list_audit_entries(
    conn: &Connection,
    user_id: i64,
) -> Result<Vec<AuditEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, action, entity, created_at FROM audit_log
         WHERE user_id = ?1 ORDER BY created_at ASC, id ASC",
    )?;
    let rows = stmt.query_map(params![user_id], |row| {
        let created_at: String = row.get(4)?;
        Ok(AuditEntry {
            id: row.get(0)?,
            user_id: row.get(1)?,
            action: row.get(2)?,
            entity: row.get(3)?,
            created_at: column_timestamp(4, &created_at)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Delete audit rows older than `retention_days`. Returns the number removed.
pub fn prune_audit_log(conn: &Connection, retention_days: u32) -> Result<usize, DatabaseError> {
    let cutoff = now_timestamp() - Duration::days(i64::from(retention_days));
    let deleted = conn.execute(
        "DELETE FROM audit_log WHERE created_at < ?1",
        params![format_timestamp(&cutoff)],
    )?;
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn entries_round_trip_in_order() {
        let conn = open_memory_database().unwrap();
        insert_audit_entry(&conn, Some(7), "pefr.record", Some("pefr_record:1")).unwrap();
        insert_audit_entry(&conn, Some(7), "symptom.record", None).unwrap();
        insert_audit_entry(&conn, None, "auth.login_failed", None).unwrap();

        let entries = list_audit_entries(&conn, 7).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "pefr.record");
        assert_eq!(entries[0].entity.as_deref(), Some("pefr_record:1"));
        assert_eq!(entries[1].action, "symptom.record");
    }

    #[test]
    fn prune_removes_only_old_rows() {
        let conn = open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO audit_log (user_id, action, created_at)
             VALUES (1, 'old', '2000-01-01 00:00:00.000000')",
            [],
        )
        .unwrap();
        insert_audit_entry(&conn, Some(1), "fresh", None).unwrap();

        assert_eq!(prune_audit_log(&conn, 30).unwrap(), 1);
        let remaining = list_audit_entries(&conn, 1).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].action, "fresh");
    }
}
