use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::{EmergencyContact, EmergencyContactInput};

pub fn insert_contact(
    conn: &Connection,
    owner_id: i64,
    input: &EmergencyContactInput,
) -> Result<EmergencyContact, DatabaseError> {
    conn.execute(
        "INSERT INTO emergency_contacts (owner_id, name, phone_number, contact_relationship)
         VALUES (?1, ?2, ?3, ?4)",
        params![owner_id, input.name, input.phone_number, input.contact_relationship],
    )?;
    Ok(EmergencyContact {
        id: conn.last_insert_rowid(),
        owner_id,
        name: input.name.clone(),
        phone_number: input.phone_number.clone(),
        contact_relationship: input.contact_relationship.clone(),
    })
}

pub fn list_contacts(
    conn: &Connection,
    owner_id: i64,
) -> Result<Vec<EmergencyContact>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, name, phone_number, contact_relationship
         FROM emergency_contacts WHERE owner_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![owner_id], |row| {
        Ok(EmergencyContact {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            name: row.get(2)?,
            phone_number: row.get(3)?,
            contact_relationship: row.get(4)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Delete a contact owned by `owner_id`. Returns false when no such row exists.
pub fn delete_contact(conn: &Connection, id: i64, owner_id: i64) -> Result<bool, DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM emergency_contacts WHERE id = ?1 AND owner_id = ?2",
        params![id, owner_id],
    )?;
    Ok(affected > 0)
}
