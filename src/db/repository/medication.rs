use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{format_timestamp, now_timestamp, DatabaseError};
use crate::models::{
    Medication, MedicationInput, MedicationSource, MedicationStatusChange, MedicationUpdate,
    TakenStatus,
};

use super::{column_enum, column_timestamp};

const MEDICATION_COLUMNS: &str = "id, owner_id, name, dose, schedule, description, start_date, \
     days, doses_remaining, source, prescribed_by, taken_status, created_at";

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn insert_medication(
    conn: &Connection,
    owner_id: i64,
    input: &MedicationInput,
    source: MedicationSource,
    prescribed_by: Option<i64>,
) -> Result<Medication, DatabaseError> {
    let created_at = now_timestamp();
    conn.execute(
        "INSERT INTO medications (owner_id, name, dose, schedule, description, start_date,
         days, doses_remaining, source, prescribed_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            owner_id,
            input.name,
            input.dose,
            input.schedule,
            input.description,
            input.start_date.map(|d| d.format(DATE_FORMAT).to_string()),
            input.days,
            input.doses_remaining,
            source.as_str(),
            prescribed_by,
            format_timestamp(&created_at),
        ],
    )?;

    Ok(Medication {
        id: conn.last_insert_rowid(),
        owner_id,
        name: input.name.clone(),
        dose: input.dose.clone(),
        schedule: input.schedule.clone(),
        description: input.description.clone(),
        start_date: input.start_date,
        days: input.days,
        doses_remaining: input.doses_remaining,
        source,
        prescribed_by,
        taken_status: None,
        created_at,
    })
}

/// Fetch a medication only if it belongs to `owner_id`.
pub fn get_owned_medication(
    conn: &Connection,
    id: i64,
    owner_id: i64,
) -> Result<Option<Medication>, DatabaseError> {
    let sql =
        format!("SELECT {MEDICATION_COLUMNS} FROM medications WHERE id = ?1 AND owner_id = ?2");
    let medication = conn
        .query_row(&sql, params![id, owner_id], row_to_medication)
        .optional()?;
    Ok(medication)
}

pub fn list_medications(
    conn: &Connection,
    owner_id: i64,
) -> Result<Vec<Medication>, DatabaseError> {
    let sql = format!(
        "SELECT {MEDICATION_COLUMNS} FROM medications
         WHERE owner_id = ?1 ORDER BY created_at DESC, id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![owner_id], row_to_medication)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn update_medication(
    conn: &Connection,
    id: i64,
    update: &MedicationUpdate,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE medications SET
            name = COALESCE(?2, name),
            dose = COALESCE(?3, dose),
            schedule = COALESCE(?4, schedule),
            description = COALESCE(?5, description),
            start_date = COALESCE(?6, start_date),
            days = COALESCE(?7, days),
            doses_remaining = COALESCE(?8, doses_remaining)
         WHERE id = ?1",
        params![
            id,
            update.name,
            update.dose,
            update.schedule,
            update.description,
            update.start_date.map(|d| d.format(DATE_FORMAT).to_string()),
            update.days,
            update.doses_remaining,
        ],
    )?;
    Ok(())
}

pub fn set_taken_status(
    conn: &Connection,
    id: i64,
    status: TakenStatus,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE medications SET taken_status = ?2 WHERE id = ?1",
        params![id, status.as_str()],
    )?;
    Ok(())
}

/// Record `doses` taken; the remaining count never drops below zero.
pub fn decrement_doses(conn: &Connection, id: i64, doses: i32) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE medications SET
            taken_status = 'taken',
            doses_remaining = CASE
                WHEN doses_remaining IS NULL THEN NULL
                ELSE MAX(doses_remaining - ?2, 0)
            END
         WHERE id = ?1",
        params![id, doses],
    )?;
    Ok(())
}

pub fn delete_medication(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM medications WHERE id = ?1", params![id])?;
    Ok(())
}

pub fn insert_status_change(
    conn: &Connection,
    medication_id: i64,
    status: &str,
    notes: Option<&str>,
    changed_by_user_id: Option<i64>,
) -> Result<MedicationStatusChange, DatabaseError> {
    let changed_at = now_timestamp();
    conn.execute(
        "INSERT INTO medication_status_history
            (medication_id, status, notes, changed_at, changed_by_user_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            medication_id,
            status,
            notes,
            format_timestamp(&changed_at),
            changed_by_user_id,
        ],
    )?;
    Ok(MedicationStatusChange {
        id: conn.last_insert_rowid(),
        medication_id,
        status: status.to_string(),
        notes: notes.map(str::to_string),
        changed_at,
        changed_by_user_id,
    })
}

/// Status history for one medication, oldest first.
pub fn list_status_history(
    conn: &Connection,
    medication_id: i64,
) -> Result<Vec<MedicationStatusChange>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, medication_id, status, notes, changed_at, changed_by_user_id
         FROM medication_status_history
         WHERE medication_id = ?1
         ORDER BY changed_at ASC, id ASC",
    )?;
    let rows = stmt.query_map(params![medication_id], |row| {
        let changed_at: String = row.get(4)?;
        Ok(MedicationStatusChange {
            id: row.get(0)?,
            medication_id: row.get(1)?,
            status: row.get(2)?,
            notes: row.get(3)?,
            changed_at: column_timestamp(4, &changed_at)?,
            changed_by_user_id: row.get(5)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

fn row_to_medication(row: &rusqlite::Row) -> Result<Medication, rusqlite::Error> {
    let start_date: Option<String> = row.get(6)?;
    let source: String = row.get(9)?;
    let taken_status: Option<String> = row.get(11)?;
    let created_at: String = row.get(12)?;
    Ok(Medication {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        dose: row.get(3)?,
        schedule: row.get(4)?,
        description: row.get(5)?,
        start_date: start_date
            .map(|s| {
                NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e))
                })
            })
            .transpose()?,
        days: row.get(7)?,
        doses_remaining: row.get(8)?,
        source: column_enum(9, &source)?,
        prescribed_by: row.get(10)?,
        taken_status: taken_status
            .as_deref()
            .map(|s| column_enum(11, s))
            .transpose()?,
        created_at: column_timestamp(12, &created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn seed_patient(conn: &Connection) -> i64 {
        conn.execute(
            "INSERT INTO users (email, name, role, password_hash, created_at)
             VALUES ('p@example.com', 'P', 'Patient', 'x', '2025-01-01 00:00:00.000000')",
            [],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    fn inhaler(doses: Option<i32>) -> MedicationInput {
        MedicationInput {
            name: "Salbutamol".into(),
            dose: Some("100mcg".into()),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            doses_remaining: doses,
            ..Default::default()
        }
    }

    #[test]
    fn insert_and_fetch_owned() {
        let conn = open_memory_database().unwrap();
        let owner = seed_patient(&conn);
        let med = insert_medication(
            &conn,
            owner,
            &inhaler(Some(2)),
            MedicationSource::Patient,
            None,
        )
        .unwrap();

        let fetched = get_owned_medication(&conn, med.id, owner).unwrap().unwrap();
        assert_eq!(fetched.name, "Salbutamol");
        assert_eq!(fetched.start_date, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert!(fetched.taken_status.is_none());
        assert!(get_owned_medication(&conn, med.id, owner + 1).unwrap().is_none());
    }

    #[test]
    fn decrement_stops_at_zero() {
        let conn = open_memory_database().unwrap();
        let owner = seed_patient(&conn);
        let med = insert_medication(
            &conn,
            owner,
            &inhaler(Some(1)),
            MedicationSource::Patient,
            None,
        )
        .unwrap();

        decrement_doses(&conn, med.id, 1).unwrap();
        decrement_doses(&conn, med.id, 2).unwrap();
        let fetched = get_owned_medication(&conn, med.id, owner).unwrap().unwrap();
        assert_eq!(fetched.doses_remaining, Some(0));
        assert_eq!(fetched.taken_status, Some(TakenStatus::Taken));
    }

    #[test]
    fn partial_update_keeps_other_columns() {
        let conn = open_memory_database().unwrap();
        let owner = seed_patient(&conn);
        let med = insert_medication(&conn, owner, &inhaler(None), MedicationSource::Patient, None)
            .unwrap();
        update_medication(
            &conn,
            med.id,
            &MedicationUpdate {
                schedule: Some("twice daily".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let fetched = get_owned_medication(&conn, med.id, owner).unwrap().unwrap();
        assert_eq!(fetched.schedule.as_deref(), Some("twice daily"));
        assert_eq!(fetched.dose.as_deref(), Some("100mcg"));
    }

    #[test]
    fn history_is_oldest_first_and_cascades() {
        let conn = open_memory_database().unwrap();
        let owner = seed_patient(&conn);
        let med = insert_medication(&conn, owner, &inhaler(None), MedicationSource::Patient, None)
            .unwrap();
        insert_status_change(&conn, med.id, "prescribed", None, Some(owner)).unwrap();
        insert_status_change(&conn, med.id, "taken", Some("after run"), Some(owner)).unwrap();

        let history = list_status_history(&conn, med.id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].status, "prescribed");
        assert_eq!(history[1].notes.as_deref(), Some("after run"));

        delete_medication(&conn, med.id).unwrap();
        assert!(list_status_history(&conn, med.id).unwrap().is_empty());
    }
}
