use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{format_timestamp, DatabaseError};
use crate::models::{NewPefrRecord, PefrRecord};

use super::{column_enum, column_timestamp};

const PEFR_COLUMNS: &str =
    "id, owner_id, pefr_value, zone, percentage, trend, source, recorded_at";

pub fn insert_pefr_record(
    conn: &Connection,
    record: &NewPefrRecord,
) -> Result<PefrRecord, DatabaseError> {
    conn.execute(
        "INSERT INTO pefr_records
            (owner_id, pefr_value, zone, percentage, trend, source, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.owner_id,
            record.pefr_value,
            record.zone.as_str(),
            record.percentage,
            record.trend.as_str(),
            record.source.as_str(),
            format_timestamp(&record.recorded_at),
        ],
    )?;

    Ok(PefrRecord {
        id: conn.last_insert_rowid(),
        owner_id: record.owner_id,
        pefr_value: record.pefr_value,
        zone: record.zone,
        percentage: record.percentage,
        trend: record.trend,
        source: record.source,
        recorded_at: record.recorded_at,
    })
}

/// Most recent reading for a patient. Equal timestamps resolve to the highest id.
pub fn latest_pefr_record(
    conn: &Connection,
    owner_id: i64,
) -> Result<Option<PefrRecord>, DatabaseError> {
    let sql = format!(
        "SELECT {PEFR_COLUMNS} FROM pefr_records
         WHERE owner_id = ?1
         ORDER BY recorded_at DESC, id DESC
         LIMIT 1"
    );
    let record = conn
        .query_row(&sql, params![owner_id], row_to_pefr_record)
        .optional()?;
    Ok(record)
}

/// All readings for a patient, newest first.
pub fn list_pefr_records(
    conn: &Connection,
    owner_id: i64,
) -> Result<Vec<PefrRecord>, DatabaseError> {
    let sql = format!(
        "SELECT {PEFR_COLUMNS} FROM pefr_records
         WHERE owner_id = ?1
         ORDER BY recorded_at DESC, id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![owner_id], row_to_pefr_record)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

fn row_to_pefr_record(row: &rusqlite::Row) -> Result<PefrRecord, rusqlite::Error> {
    let zone: String = row.get(3)?;
    let trend: String = row.get(5)?;
    let source: String = row.get(6)?;
    let recorded_at: String = row.get(7)?;
    Ok(PefrRecord {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        pefr_value: row.get(2)?,
        zone: column_enum(3, &zone)?,
        percentage: row.get(4)?,
        trend: column_enum(5, &trend)?,
        source: column_enum(6, &source)?,
        recorded_at: column_timestamp(7, &recorded_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::{ReadingSource, Trend, Zone};
    use chrono::NaiveDateTime;

    fn seed_patient(conn: &Connection) -> i64 {
        conn.execute(
            "INSERT INTO users (email, name, role, password_hash, created_at)
             VALUES ('p@example.com', 'P', 'Patient', 'x', '2025-01-01 00:00:00.000000')",
            [],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    fn reading(owner_id: i64, value: i64, at: &str) -> NewPefrRecord {
        NewPefrRecord {
            owner_id,
            pefr_value: value,
            zone: Zone::Green,
            percentage: 90.0,
            trend: Trend::Stable,
            source: ReadingSource::Manual,
            recorded_at: NaiveDateTime::parse_from_str(at, "%Y-%m-%d %H:%M:%S").unwrap(),
        }
    }

    #[test]
    fn latest_prefers_newest_timestamp() {
        let conn = open_memory_database().unwrap();
        let owner = seed_patient(&conn);
        insert_pefr_record(&conn, &reading(owner, 300, "2025-03-02 08:00:00")).unwrap();
        insert_pefr_record(&conn, &reading(owner, 250, "2025-03-01 08:00:00")).unwrap();

        let latest = latest_pefr_record(&conn, owner).unwrap().unwrap();
        assert_eq!(latest.pefr_value, 300);
    }

    #[test]
    fn latest_breaks_timestamp_ties_by_highest_id() {
        let conn = open_memory_database().unwrap();
        let owner = seed_patient(&conn);
        insert_pefr_record(&conn, &reading(owner, 300, "2025-03-01 08:00:00")).unwrap();
        let second =
            insert_pefr_record(&conn, &reading(owner, 310, "2025-03-01 08:00:00")).unwrap();

        let latest = latest_pefr_record(&conn, owner).unwrap().unwrap();
        assert_eq!(latest.id, second.id);
    }

    #[test]
    fn list_is_newest_first_and_round_trips_enums() {
        let conn = open_memory_database().unwrap();
        let owner = seed_patient(&conn);
        insert_pefr_record(&conn, &reading(owner, 200, "2025-03-01 08:00:00")).unwrap();
        let mut red = reading(owner, 120, "2025-03-03 08:00:00");
        red.zone = Zone::Red;
        red.trend = Trend::Worsening;
        insert_pefr_record(&conn, &red).unwrap();

        let all = list_pefr_records(&conn, owner).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].zone, Zone::Red);
        assert_eq!(all[0].trend, Trend::Worsening);
        assert_eq!(all[1].pefr_value, 200);
    }

    #[test]
    fn no_readings_means_no_latest() {
        let conn = open_memory_database().unwrap();
        let owner = seed_patient(&conn);
        assert!(latest_pefr_record(&conn, owner).unwrap().is_none());
    }

    #[test]
    fn corrupt_timestamp_is_an_error() {
        let conn = open_memory_database().unwrap();
        let owner = seed_patient(&conn);
        conn.execute(
            "INSERT INTO pefr_records
                (owner_id, pefr_value, zone, percentage, trend, source, recorded_at)
             VALUES (?1, 300, 'Green', 90.0, 'stable', 'manual', 'not-a-time')",
            params![owner],
        )
        .unwrap();

        assert!(latest_pefr_record(&conn, owner).is_err());
        assert!(list_pefr_records(&conn, owner).is_err());
    }
}
