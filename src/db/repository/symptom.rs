use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{format_timestamp, DatabaseError};
use crate::models::{Symptom, SymptomEntry};

use super::column_timestamp;

const SYMPTOM_COLUMNS: &str = "id, owner_id, wheeze_rating, cough_rating, dyspnea_rating, \
     night_symptoms_rating, dust_exposure, smoke_exposure, severity, onset_at, duration, \
     suspected_trigger, recorded_at";

pub fn insert_symptom(
    conn: &Connection,
    owner_id: i64,
    entry: &SymptomEntry,
    recorded_at: &NaiveDateTime,
) -> Result<Symptom, DatabaseError> {
    conn.execute(
        "INSERT INTO symptoms (owner_id, wheeze_rating, cough_rating, dyspnea_rating,
         night_symptoms_rating, dust_exposure, smoke_exposure, severity, onset_at, duration,
         suspected_trigger, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            owner_id,
            entry.wheeze_rating,
            entry.cough_rating,
            entry.dyspnea_rating,
            entry.night_symptoms_rating,
            entry.dust_exposure,
            entry.smoke_exposure,
            entry.severity,
            entry.onset_at.as_ref().map(format_timestamp),
            entry.duration,
            entry.suspected_trigger,
            format_timestamp(recorded_at),
        ],
    )?;

    Ok(Symptom {
        id: conn.last_insert_rowid(),
        owner_id,
        entry: entry.clone(),
        recorded_at: *recorded_at,
    })
}

/// Symptom history for a patient, newest first.
pub fn list_symptoms(conn: &Connection, owner_id: i64) -> Result<Vec<Symptom>, DatabaseError> {
    let sql = format!(
        "SELECT {SYMPTOM_COLUMNS} FROM symptoms
         WHERE owner_id = ?1
         ORDER BY recorded_at DESC, id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![owner_id], row_to_symptom)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn latest_symptom(conn: &Connection, owner_id: i64) -> Result<Option<Symptom>, DatabaseError> {
    let sql = format!(
        "SELECT {SYMPTOM_COLUMNS} FROM symptoms
         WHERE owner_id = ?1
         ORDER BY recorded_at DESC, id DESC
         LIMIT 1"
    );
    let symptom = conn
        .query_row(&sql, params![owner_id], row_to_symptom)
        .optional()?;
    Ok(symptom)
}

fn row_to_symptom(row: &rusqlite::Row) -> Result<Symptom, rusqlite::Error> {
    let onset_at: Option<String> = row.get(9)?;
    let recorded_at: String = row.get(12)?;
    Ok(Symptom {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        entry: SymptomEntry {
            wheeze_rating: row.get(2)?,
            cough_rating: row.get(3)?,
            dyspnea_rating: row.get(4)?,
            night_symptoms_rating: row.get(5)?,
            dust_exposure: row.get(6)?,
            smoke_exposure: row.get(7)?,
            severity: row.get(8)?,
            onset_at: onset_at
                .as_deref()
                .map(|s| column_timestamp(9, s))
                .transpose()?,
            duration: row.get(10)?,
            suspected_trigger: row.get(11)?,
        },
        recorded_at: column_timestamp(12, &recorded_at)?,
    })
}
