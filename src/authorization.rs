//! Role and care-link access checks.
//!
//! Checked in order, first failure wins:
//! 1. Role required by the operation → `Forbidden`
//! 2. Target patient exists and is a patient → `NotFound`
//! 3. Doctor is linked to the patient (when the policy requires it) → `Forbidden`
//!
//! Token validation happens earlier, in the HTTP middleware.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::core_state::CoreError;
use crate::db::repository;
use crate::models::{Role, User};

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub role: Role,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
        }
    }
}

/// Whether a doctor needs a link to a patient before reading their records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CareLinkPolicy {
    Required,
    /// Any doctor may read any patient's records.
    Unchecked,
}

// ═══════════════════════════════════════════════════════════
// Checks
// ═══════════════════════════════════════════════════════════

/// Fail with `Forbidden` unless the actor holds `required`.
pub fn require_role(actor: &Actor, required: Role, action: &str) -> Result<(), CoreError> {
    match (required, actor.role) {
        (Role::Patient, Role::Patient) | (Role::Doctor, Role::Doctor) => Ok(()),
        (Role::Patient, Role::Doctor) => Err(CoreError::Forbidden(format!(
            "Only patients can {action}"
        ))),
        (Role::Doctor, Role::Patient) => Err(CoreError::Forbidden(format!(
            "Only doctors can {action}"
        ))),
    }
}

/// Resolve an id to an existing patient. Doctors and missing users are `NotFound`.
pub fn resolve_patient(conn: &Connection, patient_id: i64) -> Result<User, CoreError> {
    match repository::get_user(conn, patient_id)? {
        Some(user) => match user.role {
            Role::Patient => Ok(user),
            Role::Doctor => Err(patient_not_found(patient_id)),
        },
        None => Err(patient_not_found(patient_id)),
    }
}

/// Gate for a doctor reading or acting on one patient's records.
pub fn authorize_patient_access(
    conn: &Connection,
    actor: &Actor,
    patient_id: i64,
    policy: CareLinkPolicy,
    action: &str,
) -> Result<User, CoreError> {
    require_role(actor, Role::Doctor, action)?;
    let patient = resolve_patient(conn, patient_id)?;

    match policy {
        CareLinkPolicy::Unchecked => {}
        CareLinkPolicy::Required => {
            if repository::find_link(conn, actor.id, patient.id)?.is_none() {
                tracing::debug!(
                    doctor_id = actor.id,
                    patient_id = patient.id,
                    "Patient access denied: no care link"
                );
                return Err(CoreError::Forbidden(
                    "Patient is not linked to this doctor".into(),
                ));
            }
        }
    }

    Ok(patient)
}

fn patient_not_found(patient_id: i64) -> CoreError {
    CoreError::NotFound(format!("Patient {patient_id}"))
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
