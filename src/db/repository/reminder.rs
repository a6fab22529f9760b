use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::{Reminder, ReminderInput};

pub fn insert_reminder(
    conn: &Connection,
    owner_id: i64,
    input: &ReminderInput,
) -> Result<Reminder, DatabaseError> {
    conn.execute(
        "INSERT INTO reminders (owner_id, reminder_type, time, frequency)
         VALUES (?1, ?2, ?3, ?4)",
        params![owner_id, input.reminder_type, input.time, input.frequency],
    )?;
    Ok(Reminder {
        id: conn.last_insert_rowid(),
        owner_id,
        reminder_type: input.reminder_type.clone(),
        time: input.time.clone(),
        frequency: input.frequency.clone(),
        compliance_count: 0,
        missed_count: 0,
    })
}

pub fn list_reminders(conn: &Connection, owner_id: i64) -> Result<Vec<Reminder>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, reminder_type, time, frequency, compliance_count, missed_count
         FROM reminders WHERE owner_id = ?1 ORDER BY time, id",
    )?;
    let rows = stmt.query_map(params![owner_id], |row| {
        Ok(Reminder {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            reminder_type: row.get(2)?,
            time: row.get(3)?,
            frequency: row.get(4)?,
            compliance_count: row.get(5)?,
            missed_count: row.get(6)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn delete_reminder(conn: &Connection, id: i64, owner_id: i64) -> Result<bool, DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM reminders WHERE id = ?1 AND owner_id = ?2",
        params![id, owner_id],
    )?;
    Ok(affected > 0)
}
