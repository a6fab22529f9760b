use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{format_timestamp, now_timestamp, DatabaseError};
use crate::models::{DoctorPatientLink, User, Zone};

use super::column_timestamp;
use super::user::{row_to_user, USER_COLUMNS};

pub fn insert_link(
    conn: &Connection,
    doctor_id: i64,
    patient_id: i64,
) -> Result<DoctorPatientLink, DatabaseError> {
    let created_at = now_timestamp();
    conn.execute(
        "INSERT INTO doctor_patient_links (doctor_id, patient_id, created_at)
         VALUES (?1, ?2, ?3)",
        params![doctor_id, patient_id, format_timestamp(&created_at)],
    )?;
    Ok(DoctorPatientLink {
        id: conn.last_insert_rowid(),
        doctor_id,
        patient_id,
        created_at,
    })
}

pub fn find_link(
    conn: &Connection,
    doctor_id: i64,
    patient_id: i64,
) -> Result<Option<DoctorPatientLink>, DatabaseError> {
    let link = conn
        .query_row(
            "SELECT id, doctor_id, patient_id, created_at FROM doctor_patient_links
             WHERE doctor_id = ?1 AND patient_id = ?2",
            params![doctor_id, patient_id],
            row_to_link,
        )
        .optional()?;
    Ok(link)
}

/// The patient's most recently linked doctor, if any.
pub fn latest_linked_doctor(
    conn: &Connection,
    patient_id: i64,
) -> Result<Option<User>, DatabaseError> {
    let sql = format!(
        "SELECT {USER_COLUMNS} FROM doctor_patient_links l
         JOIN users u ON u.id = l.doctor_id
         WHERE l.patient_id = ?1
         ORDER BY l.created_at DESC, l.id DESC
         LIMIT 1"
    );
    let doctor = conn
        .query_row(&sql, params![patient_id], row_to_user)
        .optional()?;
    Ok(doctor)
}

pub fn linked_doctor_ids(conn: &Connection, patient_id: i64) -> Result<Vec<i64>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT doctor_id FROM doctor_patient_links WHERE patient_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![patient_id], |row| row.get(0))?;
    rows.collect::<Result<Vec<i64>, _>>().map_err(DatabaseError::from)
}

/// Remove every doctor link for a patient. Returns the number removed.
pub fn delete_links_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<usize, DatabaseError> {
    let removed = conn.execute(
        "DELETE FROM doctor_patient_links WHERE patient_id = ?1",
        params![patient_id],
    )?;
    Ok(removed)
}

/// Remove one doctor–patient link. Returns false when none existed.
pub fn delete_link(
    conn: &Connection,
    doctor_id: i64,
    patient_id: i64,
) -> Result<bool, DatabaseError> {
    let removed = conn.execute(
        "DELETE FROM doctor_patient_links WHERE doctor_id = ?1 AND patient_id = ?2",
        params![doctor_id, patient_id],
    )?;
    Ok(removed > 0)
}

/// Linked patients for a doctor, optionally filtered by a case-insensitive
/// name/e-mail substring and by the zone of each patient's latest reading.
///
/// The substring match runs in Rust: SQLite's `lower()` folds ASCII only.
pub fn list_linked_patients(
    conn: &Connection,
    doctor_id: i64,
    search: Option<&str>,
    zone: Option<Zone>,
) -> Result<Vec<User>, DatabaseError> {
    let sql = format!(
        "SELECT {USER_COLUMNS} FROM doctor_patient_links l
         JOIN users u ON u.id = l.patient_id
         WHERE l.doctor_id = ?1
           AND (?2 IS NULL OR (
                SELECT p.zone FROM pefr_records p
                WHERE p.owner_id = u.id
                ORDER BY p.recorded_at DESC, p.id DESC
                LIMIT 1) = ?2)
         ORDER BY u.name COLLATE NOCASE, u.id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![doctor_id, zone.map(|z| z.as_str())], row_to_user)?;
    let patients = rows.collect::<Result<Vec<_>, _>>()?;

    let needle = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);
    Ok(match needle {
        Some(needle) => patients
            .into_iter()
            .filter(|u| matches_search(u, &needle))
            .collect(),
        None => patients,
    })
}

/// `needle` must already be lowercased.
fn matches_search(user: &User, needle: &str) -> bool {
    user.name.to_lowercase().contains(needle) || user.email.to_lowercase().contains(needle)
}

fn row_to_link(row: &rusqlite::Row) -> Result<DoctorPatientLink, rusqlite::Error> {
    let created_at: String = row.get(3)?;
    Ok(DoctorPatientLink {
        id: row.get(0)?,
        doctor_id: row.get(1)?,
        patient_id: row.get(2)?,
        created_at: column_timestamp(3, &created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn seed_user(conn: &Connection, email: &str, name: &str, role: &str) -> i64 {
        conn.execute(
            "INSERT INTO users (email, name, role, password_hash, created_at)
             VALUES (?1, ?2, ?3, 'x', '2025-01-01 00:00:00.000000')",
            params![email, name, role],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    fn seed_reading(conn: &Connection, owner: i64, zone: &str, at: &str) {
        conn.execute(
            "INSERT INTO pefr_records (owner_id, pefr_value, zone, percentage, trend, recorded_at)
             VALUES (?1, 100, ?2, 50.0, 'stable', ?3)",
            params![owner, zone, at],
        )
        .unwrap();
    }

    #[test]
    fn duplicate_link_is_rejected() {
        let conn = open_memory_database().unwrap();
        let doc = seed_user(&conn, "d@example.com", "Dr D", "Doctor");
        let pat = seed_user(&conn, "p@example.com", "Pat", "Patient");
        insert_link(&conn, doc, pat).unwrap();
        let err = insert_link(&conn, doc, pat).unwrap_err();
        assert!(err.is_constraint_violation());
        assert!(find_link(&conn, doc, pat).unwrap().is_some());
    }

    #[test]
    fn search_matches_name_or_email_case_insensitively() {
        let conn = open_memory_database().unwrap();
        let doc = seed_user(&conn, "d@example.com", "Dr D", "Doctor");
        let a = seed_user(&conn, "asha@example.com", "Asha Rao", "Patient");
        let b = seed_user(&conn, "ben@clinic.org", "Ben Ito", "Patient");
        insert_link(&conn, doc, a).unwrap();
        insert_link(&conn, doc, b).unwrap();

        let by_name = list_linked_patients(&conn, doc, Some("ASHA"), None).unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, a);

        let by_email = list_linked_patients(&conn, doc, Some("clinic"), None).unwrap();
        assert_eq!(by_email.len(), 1);
        assert_eq!(by_email[0].id, b);

        let wildcard = list_linked_patients(&conn, doc, Some("%"), None).unwrap();
        assert!(wildcard.is_empty());
    }

    #[test]
    fn search_folds_non_ascii_case() {
        let conn = open_memory_database().unwrap();
        let doc = seed_user(&conn, "d@example.com", "Dr D", "Doctor");
        let e = seed_user(&conn, "elodie@example.com", "ÉLODIE Martin", "Patient");
        let z = seed_user(&conn, "zeynep@example.com", "Zeynep Öztürk", "Patient");
        insert_link(&conn, doc, e).unwrap();
        insert_link(&conn, doc, z).unwrap();

        for term in ["élodie", "ÉLODIE", "Élodie"] {
            let found = list_linked_patients(&conn, doc, Some(term), None).unwrap();
            assert_eq!(found.iter().map(|u| u.id).collect::<Vec<_>>(), vec![e], "{term}");
        }
        let found = list_linked_patients(&conn, doc, Some("ÖZTÜRK"), None).unwrap();
        assert_eq!(found.iter().map(|u| u.id).collect::<Vec<_>>(), vec![z]);
    }

    #[test]
    fn zone_filter_uses_latest_reading_only() {
        let conn = open_memory_database().unwrap();
        let doc = seed_user(&conn, "d@example.com", "Dr D", "Doctor");
        let a = seed_user(&conn, "a@example.com", "A", "Patient");
        let b = seed_user(&conn, "b@example.com", "B", "Patient");
        insert_link(&conn, doc, a).unwrap();
        insert_link(&conn, doc, b).unwrap();
        seed_reading(&conn, a, "Red", "2025-03-01 08:00:00.000000");
        seed_reading(&conn, a, "Green", "2025-03-02 08:00:00.000000");
        seed_reading(&conn, b, "Red", "2025-03-02 08:00:00.000000");

        let red = list_linked_patients(&conn, doc, None, Some(Zone::Red)).unwrap();
        assert_eq!(red.iter().map(|u| u.id).collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn unlinked_patients_are_not_listed() {
        let conn = open_memory_database().unwrap();
        let doc = seed_user(&conn, "d@example.com", "Dr D", "Doctor");
        let other = seed_user(&conn, "o@example.com", "Dr O", "Doctor");
        let pat = seed_user(&conn, "p@example.com", "Pat", "Patient");
        insert_link(&conn, other, pat).unwrap();

        assert!(list_linked_patients(&conn, doc, None, None).unwrap().is_empty());
        assert_eq!(linked_doctor_ids(&conn, pat).unwrap(), vec![other]);
        assert_eq!(delete_links_for_patient(&conn, pat).unwrap(), 1);
        assert!(latest_linked_doctor(&conn, pat).unwrap().is_none());
    }
}
