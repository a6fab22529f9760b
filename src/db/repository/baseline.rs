use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{format_timestamp, now_timestamp, DatabaseError};
use crate::models::Baseline;

use super::column_timestamp;

/// Create or replace the patient's baseline (one row per owner).
pub fn upsert_baseline(
    conn: &Connection,
    owner_id: i64,
    baseline_value: u32,
) -> Result<Baseline, DatabaseError> {
    conn.execute(
        "INSERT INTO baselines (owner_id, baseline_value, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(owner_id) DO UPDATE SET
            baseline_value = excluded.baseline_value,
            updated_at = excluded.updated_at",
        params![owner_id, baseline_value, format_timestamp(&now_timestamp())],
    )?;
    get_baseline(conn, owner_id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "baseline".into(),
        id: owner_id.to_string(),
    })
}

pub fn get_baseline(conn: &Connection, owner_id: i64) -> Result<Option<Baseline>, DatabaseError> {
    let baseline = conn
        .query_row(
            "SELECT id, owner_id, baseline_value, updated_at FROM baselines WHERE owner_id = ?1",
            params![owner_id],
            |row| {
                let updated_at: String = row.get(3)?;
                Ok(Baseline {
                    id: row.get(0)?,
                    owner_id: row.get(1)?,
                    baseline_value: row.get(2)?,
                    updated_at: column_timestamp(3, &updated_at)?,
                })
            },
        )
        .optional()?;
    Ok(baseline)
}
