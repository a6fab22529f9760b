//! Patient medication lists and doctor prescriptions.
//!
//! Every status change appends a `medication_status_history` row; the
//! doctor history view reads those back in order.

use rusqlite::Connection;
use serde::Deserialize;

use crate::authorization::{authorize_patient_access, require_role, Actor, CareLinkPolicy};
use crate::core_state::{log_audit, CoreError};
use crate::db::repository;
use crate::models::{
    Medication, MedicationInput, MedicationSource, MedicationUpdate, MedicationWithHistory, Role,
    TakenStatus,
};

// ═══════════════════════════════════════════
// Inputs
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct StatusChange {
    pub status: TakenStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoseTaken {
    #[serde(default = "one_dose")]
    pub doses: i32,
    pub notes: Option<String>,
}

fn one_dose() -> i32 {
    1
}

// ═══════════════════════════════════════════
// Patient operations
// ═══════════════════════════════════════════

pub fn list_medications(conn: &Connection, actor: &Actor) -> Result<Vec<Medication>, CoreError> {
    require_role(actor, Role::Patient, "view medications")?;
    Ok(repository::list_medications(conn, actor.id)?)
}

/// Add a self-reported medication to the calling patient's list.
pub fn add_medication(
    conn: &Connection,
    actor: &Actor,
    input: &MedicationInput,
) -> Result<Medication, CoreError> {
    require_role(actor, Role::Patient, "add medications")?;
    validate_input(input)?;

    let tx = conn.unchecked_transaction()?;
    let medication =
        repository::insert_medication(&tx, actor.id, input, MedicationSource::Patient, None)?;
    repository::insert_status_change(&tx, medication.id, "added", None, Some(actor.id))?;
    tx.commit()?;

    log_audit(conn, Some(actor.id), "medication.add", Some(&medication_entity(medication.id)));
    Ok(medication)
}

pub fn update_medication(
    conn: &Connection,
    actor: &Actor,
    medication_id: i64,
    update: &MedicationUpdate,
) -> Result<Medication, CoreError> {
    require_role(actor, Role::Patient, "update medications")?;
    owned(conn, actor, medication_id)?;
    if let Some(name) = &update.name {
        if name.trim().is_empty() {
            return Err(CoreError::Validation("name must not be empty".into()));
        }
    }
    validate_counts(update.days, update.doses_remaining)?;

    repository::update_medication(conn, medication_id, update)?;
    log_audit(conn, Some(actor.id), "medication.update", Some(&medication_entity(medication_id)));
    owned(conn, actor, medication_id)
}

pub fn delete_medication(
    conn: &Connection,
    actor: &Actor,
    medication_id: i64,
) -> Result<(), CoreError> {
    require_role(actor, Role::Patient, "delete medications")?;
    owned(conn, actor, medication_id)?;
    repository::delete_medication(conn, medication_id)?;
    log_audit(conn, Some(actor.id), "medication.delete", Some(&medication_entity(medication_id)));
    Ok(())
}

/// Set the taken status and append it to the history.
pub fn set_status(
    conn: &Connection,
    actor: &Actor,
    medication_id: i64,
    change: &StatusChange,
) -> Result<Medication, CoreError> {
    require_role(actor, Role::Patient, "update medication status")?;
    owned(conn, actor, medication_id)?;

    let tx = conn.unchecked_transaction()?;
    repository::set_taken_status(&tx, medication_id, change.status)?;
    repository::insert_status_change(
        &tx,
        medication_id,
        change.status.as_str(),
        change.notes.as_deref(),
        Some(actor.id),
    )?;
    tx.commit()?;

    log_audit(conn, Some(actor.id), "medication.status", Some(&medication_entity(medication_id)));
    owned(conn, actor, medication_id)
}

/// Record doses taken. `doses_remaining` bottoms out at zero.
pub fn take(
    conn: &Connection,
    actor: &Actor,
    medication_id: i64,
    taken: &DoseTaken,
) -> Result<Medication, CoreError> {
    require_role(actor, Role::Patient, "record doses")?;
    if taken.doses < 1 {
        return Err(CoreError::Validation("doses must be at least 1".into()));
    }
    owned(conn, actor, medication_id)?;

    let tx = conn.unchecked_transaction()?;
    repository::decrement_doses(&tx, medication_id, taken.doses)?;
    repository::insert_status_change(
        &tx,
        medication_id,
        TakenStatus::Taken.as_str(),
        taken.notes.as_deref(),
        Some(actor.id),
    )?;
    tx.commit()?;

    log_audit(conn, Some(actor.id), "medication.take", Some(&medication_entity(medication_id)));
    owned(conn, actor, medication_id)
}

// ═══════════════════════════════════════════
// Doctor operations
// ═══════════════════════════════════════════

/// Prescribe a medication to a patient and notify them.
pub fn prescribe(
    conn: &Connection,
    actor: &Actor,
    patient_id: i64,
    input: &MedicationInput,
    policy: CareLinkPolicy,
) -> Result<Medication, CoreError> {
    let patient =
        authorize_patient_access(conn, actor, patient_id, policy, "prescribe medication")?;
    validate_input(input)?;

    let tx = conn.unchecked_transaction()?;
    let medication = repository::insert_medication(
        &tx,
        patient.id,
        input,
        MedicationSource::Doctor,
        Some(actor.id),
    )?;
    repository::insert_status_change(&tx, medication.id, "prescribed", None, Some(actor.id))?;
    repository::insert_notification(
        &tx,
        patient.id,
        &format!("New medication prescribed: {}", medication.name),
        Some("/medications"),
    )?;
    tx.commit()?;

    log_audit(
        conn,
        Some(actor.id),
        "medication.prescribe",
        Some(&medication_entity(medication.id)),
    );
    tracing::info!(
        doctor_id = actor.id,
        patient_id = patient.id,
        medication_id = medication.id,
        "Medication prescribed"
    );
    Ok(medication)
}

/// A patient's medications, each with its status history (oldest first).
pub fn medication_history(
    conn: &Connection,
    actor: &Actor,
    patient_id: i64,
    policy: CareLinkPolicy,
) -> Result<Vec<MedicationWithHistory>, CoreError> {
    let patient =
        authorize_patient_access(conn, actor, patient_id, policy, "view medication history")?;

    repository::list_medications(conn, patient.id)?
        .into_iter()
        .map(|medication| {
            let status_history = repository::list_status_history(conn, medication.id)?;
            Ok(MedicationWithHistory {
                medication,
                status_history,
            })
        })
        .collect()
}

// ═══════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════

/// Another user's medication is indistinguishable from a missing one.
fn owned(conn: &Connection, actor: &Actor, medication_id: i64) -> Result<Medication, CoreError> {
    repository::get_owned_medication(conn, medication_id, actor.id)?
        .ok_or_else(|| CoreError::NotFound(format!("Medication {medication_id}")))
}

fn validate_input(input: &MedicationInput) -> Result<(), CoreError> {
    if input.name.trim().is_empty() {
        return Err(CoreError::Validation("name must not be empty".into()));
    }
    validate_counts(input.days, input.doses_remaining)
}

fn validate_counts(days: Option<i32>, doses_remaining: Option<i32>) -> Result<(), CoreError> {
    if days.is_some_and(|d| d < 0) {
        return Err(CoreError::Validation("days must not be negative".into()));
    }
    if doses_remaining.is_some_and(|d| d < 0) {
        return Err(CoreError::Validation("doses_remaining must not be negative".into()));
    }
    Ok(())
}

fn medication_entity(id: i64) -> String {
    format!("medication:{id}")
}
