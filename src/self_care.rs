//! Emergency contacts, reminders and in-app notifications.

use rusqlite::Connection;

use crate::authorization::{require_role, Actor};
use crate::core_state::{log_audit, CoreError};
use crate::db::repository;
use crate::models::{
    EmergencyContact, EmergencyContactInput, Notification, Reminder, ReminderInput, Role,
};

// ═══════════════════════════════════════════
// Emergency contacts
// ═══════════════════════════════════════════

pub fn list_contacts(conn: &Connection, actor: &Actor) -> Result<Vec<EmergencyContact>, CoreError> {
    require_role(actor, Role::Patient, "view emergency contacts")?;
    Ok(repository::list_contacts(conn, actor.id)?)
}

pub fn add_contact(
    conn: &Connection,
    actor: &Actor,
    input: &EmergencyContactInput,
) -> Result<EmergencyContact, CoreError> {
    require_role(actor, Role::Patient, "add emergency contacts")?;
    if input.name.trim().is_empty() || input.phone_number.trim().is_empty() {
        return Err(CoreError::Validation(
            "name and phone_number must not be empty".into(),
        ));
    }
    let contact = repository::insert_contact(conn, actor.id, input)?;
    log_audit(conn, Some(actor.id), "contact.add", Some(&format!("contact:{}", contact.id)));
    Ok(contact)
}

pub fn delete_contact(conn: &Connection, actor: &Actor, contact_id: i64) -> Result<(), CoreError> {
    require_role(actor, Role::Patient, "delete emergency contacts")?;
    if !repository::delete_contact(conn, contact_id, actor.id)? {
        return Err(CoreError::NotFound(format!("Contact {contact_id}")));
    }
    log_audit(conn, Some(actor.id), "contact.delete", Some(&format!("contact:{contact_id}")));
    Ok(())
}

// ═══════════════════════════════════════════
// Reminders
// ═══════════════════════════════════════════

pub fn list_reminders(conn: &Connection, actor: &Actor) -> Result<Vec<Reminder>, CoreError> {
    Ok(repository::list_reminders(conn, actor.id)?)
}

pub fn add_reminder(
    conn: &Connection,
    actor: &Actor,
    input: &ReminderInput,
) -> Result<Reminder, CoreError> {
    if input.reminder_type.trim().is_empty()
        || input.time.trim().is_empty()
        || input.frequency.trim().is_empty()
    {
        return Err(CoreError::Validation(
            "reminder_type, time and frequency are required".into(),
        ));
    }
    let reminder = repository::insert_reminder(conn, actor.id, input)?;
    log_audit(conn, Some(actor.id), "reminder.add", Some(&format!("reminder:{}", reminder.id)));
    Ok(reminder)
}

pub fn delete_reminder(
    conn: &Connection,
    actor: &Actor,
    reminder_id: i64,
) -> Result<(), CoreError> {
    if !repository::delete_reminder(conn, reminder_id, actor.id)? {
        return Err(CoreError::NotFound(format!("Reminder {reminder_id}")));
    }
    log_audit(conn, Some(actor.id), "reminder.delete", Some(&format!("reminder:{reminder_id}")));
    Ok(())
}

// ═══════════════════════════════════════════
// Notifications
// ═══════════════════════════════════════════

/// The caller's notifications, newest first.
pub fn list_notifications(
    conn: &Connection,
    actor: &Actor,
) -> Result<Vec<Notification>, CoreError> {
    Ok(repository::list_notifications(conn, actor.id)?)
}

pub fn mark_read(conn: &Connection, actor: &Actor, notification_id: i64) -> Result<(), CoreError> {
    if !repository::mark_notification_read(conn, notification_id, actor.id)? {
        return Err(CoreError::NotFound(format!("Notification {notification_id}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::models::NewUser;

    fn seed(conn: &Connection, email: &str, role: Role) -> Actor {
        let user = repository::insert_user(
            conn,
            &NewUser {
                email: email.into(),
                name: email.into(),
                role,
                password_hash: "x".into(),
                age: None,
                height: None,
                gender: None,
                contact_number: None,
                address: None,
            },
        )
        .unwrap();
        Actor::from(&user)
    }

    #[test]
    fn contacts_are_scoped_to_owner() {
        let conn = open_memory_database().unwrap();
        let a = seed(&conn, "a@example.com", Role::Patient);
        let b = seed(&conn, "b@example.com", Role::Patient);
        let contact = add_contact(
            &conn,
            &a,
            &EmergencyContactInput {
                name: "Ravi".into(),
                phone_number: "+44 20 7946 0000".into(),
                contact_relationship: Some("brother".into()),
            },
        )
        .unwrap();

        assert!(list_contacts(&conn, &b).unwrap().is_empty());
        assert!(matches!(
            delete_contact(&conn, &b, contact.id),
            Err(CoreError::NotFound(_))
        ));
        delete_contact(&conn, &a, contact.id).unwrap();
        assert!(list_contacts(&conn, &a).unwrap().is_empty());
    }

    #[test]
    fn blank_contact_is_invalid() {
        let conn = open_memory_database().unwrap();
        let a = seed(&conn, "a@example.com", Role::Patient);
        let input = EmergencyContactInput {
            name: "Ravi".into(),
            phone_number: " ".into(),
            contact_relationship: None,
        };
        assert!(matches!(add_contact(&conn, &a, &input), Err(CoreError::Validation(_))));
    }

    #[test]
    fn reminders_start_with_zero_counters() {
        let conn = open_memory_database().unwrap();
        let doctor = seed(&conn, "d@example.com", Role::Doctor);
        let reminder = add_reminder(
            &conn,
            &doctor,
            &ReminderInput {
                reminder_type: "pefr".into(),
                time: "08:00".into(),
                frequency: "daily".into(),
            },
        )
        .unwrap();
        assert_eq!(reminder.compliance_count, 0);
        assert_eq!(reminder.missed_count, 0);
        assert_eq!(list_reminders(&conn, &doctor).unwrap().len(), 1);
        delete_reminder(&conn, &doctor, reminder.id).unwrap();
        assert!(delete_reminder(&conn, &doctor, reminder.id).is_err());
    }

    #[test]
    fn notifications_newest_first_and_owner_only() {
        let conn = open_memory_database().unwrap();
        let a = seed(&conn, "a@example.com", Role::Patient);
        let b = seed(&conn, "b@example.com", Role::Patient);
        let first = repository::insert_notification(&conn, a.id, "first", None).unwrap();
        repository::insert_notification(&conn, a.id, "second", None).unwrap();

        let listed = list_notifications(&conn, &a).unwrap();
        assert_eq!(listed[0].message, "second");
        assert_eq!(listed[1].message, "first");

        assert!(matches!(mark_read(&conn, &b, first.id), Err(CoreError::NotFound(_))));
        mark_read(&conn, &a, first.id).unwrap();
        let listed = list_notifications(&conn, &a).unwrap();
        assert!(listed.iter().find(|n| n.id == first.id).unwrap().read);
    }
}
