use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{format_timestamp, now_timestamp, DatabaseError};
use crate::models::{NewUser, ProfileFields, User};

use super::{column_enum, column_timestamp};

pub(crate) const USER_COLUMNS: &str =
    "u.id, u.email, u.name, u.role, u.age, u.height, u.gender, u.contact_number, u.address, \
     u.created_at";

/// Insert a new account. A duplicate e-mail surfaces as a constraint violation.
pub fn insert_user(conn: &Connection, user: &NewUser) -> Result<User, DatabaseError> {
    let created_at = now_timestamp();
    conn.execute(
        "INSERT INTO users (email, name, role, password_hash, age, height, gender,
         contact_number, address, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            user.email,
            user.name,
            user.role.as_str(),
            user.password_hash,
            user.age,
            user.height,
            user.gender,
            user.contact_number,
            user.address,
            format_timestamp(&created_at),
        ],
    )?;

    Ok(User {
        id: conn.last_insert_rowid(),
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role,
        age: user.age,
        height: user.height,
        gender: user.gender.clone(),
        contact_number: user.contact_number.clone(),
        address: user.address.clone(),
        created_at,
    })
}

pub fn get_user(conn: &Connection, id: i64) -> Result<Option<User>, DatabaseError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1");
    let user = conn.query_row(&sql, params![id], row_to_user).optional()?;
    Ok(user)
}

/// E-mail lookup is case-insensitive (column collation).
pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, DatabaseError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.email = ?1");
    let user = conn.query_row(&sql, params![email], row_to_user).optional()?;
    Ok(user)
}

/// Fetch a user together with the stored password hash (login path only).
pub fn get_credentials_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<(User, String)>, DatabaseError> {
    let sql = format!("SELECT {USER_COLUMNS}, u.password_hash FROM users u WHERE u.email = ?1");
    let found = conn
        .query_row(&sql, params![email], |row| {
            Ok((row_to_user(row)?, row.get::<_, String>(10)?))
        })
        .optional()?;
    Ok(found)
}

/// Apply a partial profile update. Role and e-mail are not updatable.
pub fn update_profile(
    conn: &Connection,
    id: i64,
    fields: &ProfileFields,
) -> Result<Option<User>, DatabaseError> {
    conn.execute(
        "UPDATE users SET
            name = COALESCE(?2, name),
            age = COALESCE(?3, age),
            height = COALESCE(?4, height),
            gender = COALESCE(?5, gender),
            contact_number = COALESCE(?6, contact_number),
            address = COALESCE(?7, address)
         WHERE id = ?1",
        params![
            id,
            fields.name,
            fields.age,
            fields.height,
            fields.gender,
            fields.contact_number,
            fields.address,
        ],
    )?;
    get_user(conn, id)
}

/// Delete an account; owned rows go with it via ON DELETE CASCADE.
pub fn delete_user(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let affected = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "user".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Map the `USER_COLUMNS` projection (indices 0..=9).
pub(crate) fn row_to_user(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    let role: String = row.get(3)?;
    let created_at: String = row.get(9)?;
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        role: column_enum(3, &role)?,
        age: row.get(4)?,
        height: row.get(5)?,
        gender: row.get(6)?,
        contact_number: row.get(7)?,
        address: row.get(8)?,
        created_at: column_timestamp(9, &created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::Role;

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            email: email.into(),
            name: "Asha Rao".into(),
            role,
            password_hash: "hash".into(),
            age: Some(34),
            height: None,
            gender: None,
            contact_number: None,
            address: None,
        }
    }

    #[test]
    fn insert_and_fetch_by_email_ignores_case() {
        let conn = open_memory_database().unwrap();
        let user = insert_user(&conn, &new_user("asha@example.com", Role::Patient)).unwrap();
        let found = get_user_by_email(&conn, "ASHA@example.com").unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.role, Role::Patient);
        assert_eq!(found.age, Some(34));
    }

    #[test]
    fn duplicate_email_is_constraint_violation() {
        let conn = open_memory_database().unwrap();
        insert_user(&conn, &new_user("dup@example.com", Role::Patient)).unwrap();
        let err = insert_user(&conn, &new_user("Dup@example.com", Role::Doctor)).unwrap_err();
        assert!(err.is_constraint_violation());
    }

    #[test]
    fn update_profile_keeps_unset_fields() {
        let conn = open_memory_database().unwrap();
        let user = insert_user(&conn, &new_user("p@example.com", Role::Patient)).unwrap();
        let updated = update_profile(
            &conn,
            user.id,
            &ProfileFields {
                gender: Some("F".into()),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(updated.gender.as_deref(), Some("F"));
        assert_eq!(updated.age, Some(34));
        assert_eq!(updated.name, "Asha Rao");
    }

    #[test]
    fn credentials_include_password_hash() {
        let conn = open_memory_database().unwrap();
        insert_user(&conn, &new_user("c@example.com", Role::Doctor)).unwrap();
        let (user, hash) = get_credentials_by_email(&conn, "c@example.com").unwrap().unwrap();
        assert_eq!(user.role, Role::Doctor);
        assert_eq!(hash, "hash");
    }

    #[test]
    fn delete_missing_user_is_not_found() {
        let conn = open_memory_database().unwrap();
        assert!(matches!(
            delete_user(&conn, 42),
            Err(DatabaseError::NotFound { .. })
        ));
    }
}
