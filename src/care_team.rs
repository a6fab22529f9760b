//! Doctor–patient linking and the doctor dashboard.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::authorization::{
    authorize_patient_access, require_role, resolve_patient, Actor, CareLinkPolicy,
};
use crate::core_state::{log_audit, CoreError};
use crate::db::repository;
use crate::models::{DoctorPatientLink, PefrRecord, Role, Symptom, User, Zone};

/// Dashboard filters. Both optional; both narrow the linked-patient set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientFilter {
    /// Case-insensitive substring of name or e-mail.
    pub search: Option<String>,
    /// Zone of the patient's most recent reading.
    pub zone: Option<Zone>,
}

/// One dashboard row.
#[derive(Debug, Clone, Serialize)]
pub struct PatientSummary {
    #[serde(flatten)]
    pub patient: User,
    pub baseline_value: Option<u32>,
    pub latest_pefr_record: Option<PefrRecord>,
    pub latest_symptom: Option<Symptom>,
}

/// Link the calling patient to the doctor registered under `doctor_email`.
/// Re-linking an existing pair returns the stored link unchanged.
pub fn link_doctor(
    conn: &Connection,
    actor: &Actor,
    doctor_email: &str,
) -> Result<DoctorPatientLink, CoreError> {
    require_role(actor, Role::Patient, "link a doctor")?;

    let doctor = repository::get_user_by_email(conn, doctor_email.trim())?
        .filter(|u| u.role == Role::Doctor)
        .ok_or_else(|| CoreError::NotFound("Doctor with that e-mail".into()))?;

    if let Some(existing) = repository::find_link(conn, doctor.id, actor.id)? {
        return Ok(existing);
    }

    let link = match repository::insert_link(conn, doctor.id, actor.id) {
        Ok(link) => link,
        // Lost a race with a concurrent identical request.
        Err(e) if e.is_constraint_violation() => {
            return repository::find_link(conn, doctor.id, actor.id)?
                .ok_or(CoreError::Database(e));
        }
        Err(e) => return Err(e.into()),
    };

    log_audit(conn, Some(actor.id), "link.create", Some(&format!("doctor:{}", doctor.id)));
    tracing::info!(patient_id = actor.id, doctor_id = doctor.id, "Doctor linked");
    Ok(link)
}

/// The calling patient's most recently linked doctor.
pub fn linked_doctor(conn: &Connection, actor: &Actor) -> Result<User, CoreError> {
    require_role(actor, Role::Patient, "view their doctor")?;
    repository::latest_linked_doctor(conn, actor.id)?
        .ok_or_else(|| CoreError::NotFound("Linked doctor".into()))
}

/// Remove all of the calling patient's doctor links.
pub fn unlink_doctor(conn: &Connection, actor: &Actor) -> Result<usize, CoreError> {
    require_role(actor, Role::Patient, "unlink a doctor")?;
    let removed = repository::delete_links_for_patient(conn, actor.id)?;
    if removed == 0 {
        return Err(CoreError::NotFound("Linked doctor".into()));
    }
    log_audit(conn, Some(actor.id), "link.delete", None);
    Ok(removed)
}

/// Drop one patient from the calling doctor's list.
pub fn remove_patient(conn: &Connection, actor: &Actor, patient_id: i64) -> Result<(), CoreError> {
    require_role(actor, Role::Doctor, "remove patients")?;
    let patient = resolve_patient(conn, patient_id)?;
    if !repository::delete_link(conn, actor.id, patient.id)? {
        return Err(CoreError::NotFound(format!("Link to patient {patient_id}")));
    }
    log_audit(conn, Some(actor.id), "link.delete", Some(&format!("patient:{}", patient.id)));
    Ok(())
}

/// Dashboard: the calling doctor's linked patients with their latest data.
pub fn list_patients(
    conn: &Connection,
    actor: &Actor,
    filter: &PatientFilter,
) -> Result<Vec<PatientSummary>, CoreError> {
    require_role(actor, Role::Doctor, "view the patient dashboard")?;

    let patients =
        repository::list_linked_patients(conn, actor.id, filter.search.as_deref(), filter.zone)?;

    patients
        .into_iter()
        .map(|patient| {
            let baseline_value =
                repository::get_baseline(conn, patient.id)?.map(|b| b.baseline_value);
            let latest_pefr_record = repository::latest_pefr_record(conn, patient.id)?;
            let latest_symptom = repository::latest_symptom(conn, patient.id)?;
            Ok(PatientSummary {
                patient,
                baseline_value,
                latest_pefr_record,
                latest_symptom,
            })
        })
        .collect()
}

pub fn patient_readings(
    conn: &Connection,
    actor: &Actor,
    patient_id: i64,
    policy: CareLinkPolicy,
) -> Result<Vec<PefrRecord>, CoreError> {
    let patient =
        authorize_patient_access(conn, actor, patient_id, policy, "view patient readings")?;
    Ok(repository::list_pefr_records(conn, patient.id)?)
}

pub fn patient_symptoms(
    conn: &Connection,
    actor: &Actor,
    patient_id: i64,
    policy: CareLinkPolicy,
) -> Result<Vec<Symptom>, CoreError> {
    let patient =
        authorize_patient_access(conn, actor, patient_id, policy, "view patient symptoms")?;
    Ok(repository::list_symptoms(conn, patient.id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::models::{NewPefrRecord, NewUser, ReadingSource, Trend};

    fn seed(conn: &Connection, email: &str, name: &str, role: Role) -> Actor {
        let user = repository::insert_user(
            conn,
            &NewUser {
                email: email.into(),
                name: name.into(),
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

    fn reading(conn: &Connection, owner: i64, zone: Zone) {
        repository::insert_pefr_record(
            conn,
            &NewPefrRecord {
                owner_id: owner,
                pefr_value: 150,
                zone,
                percentage: 37.5,
                trend: Trend::Stable,
                source: ReadingSource::Manual,
                recorded_at: crate::db::now_timestamp(),
            },
        )
        .unwrap();
    }

    fn link_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM doctor_patient_links", [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn linking_twice_returns_same_link() {
        let conn = open_memory_database().unwrap();
        seed(&conn, "doc@example.com", "Dr Who", Role::Doctor);
        let patient = seed(&conn, "pat@example.com", "Pat", Role::Patient);

        let first = link_doctor(&conn, &patient, "doc@example.com").unwrap();
        let second = link_doctor(&conn, &patient, "DOC@example.com").unwrap();
        assert_eq!(first, second);
        assert_eq!(link_count(&conn), 1);

        let audits = repository::list_audit_entries(&conn, patient.id).unwrap();
        assert_eq!(audits.iter().filter(|a| a.action == "link.create").count(), 1);
    }

    #[test]
    fn linking_non_doctor_email_is_not_found() {
        let conn = open_memory_database().unwrap();
        seed(&conn, "other@example.com", "Other", Role::Patient);
        let patient = seed(&conn, "pat@example.com", "Pat", Role::Patient);

        for email in ["other@example.com", "nobody@example.com"] {
            assert!(matches!(
                link_doctor(&conn, &patient, email),
                Err(CoreError::NotFound(_))
            ));
        }
    }

    #[test]
    fn doctor_self_link_is_forbidden() {
        let conn = open_memory_database().unwrap();
        let doctor = seed(&conn, "doc@example.com", "Dr Who", Role::Doctor);
        assert!(matches!(
            link_doctor(&conn, &doctor, "doc@example.com"),
            Err(CoreError::Forbidden(_))
        ));
        assert_eq!(link_count(&conn), 0);
    }

    #[test]
    fn dashboard_zone_filter_follows_latest_reading() {
        let conn = open_memory_database().unwrap();
        let doctor = seed(&conn, "doc@example.com", "Dr Who", Role::Doctor);
        let patient = seed(&conn, "pat@example.com", "Pat", Role::Patient);
        link_doctor(&conn, &patient, "doc@example.com").unwrap();
        reading(&conn, patient.id, Zone::Red);

        let red = list_patients(
            &conn,
            &doctor,
            &PatientFilter {
                zone: Some(Zone::Red),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(red.len(), 1);
        assert_eq!(red[0].patient.id, patient.id);
        assert_eq!(red[0].latest_pefr_record.as_ref().unwrap().zone, Zone::Red);

        let green = list_patients(
            &conn,
            &doctor,
            &PatientFilter {
                zone: Some(Zone::Green),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(green.is_empty());
    }

    #[test]
    fn dashboard_search_is_unicode_case_insensitive() {
        let conn = open_memory_database().unwrap();
        let doctor = seed(&conn, "doc@example.com", "Dr Who", Role::Doctor);
        let elodie = seed(&conn, "elodie@example.com", "ÉLODIE", Role::Patient);
        let other = seed(&conn, "sam@example.com", "Sam", Role::Patient);
        link_doctor(&conn, &elodie, "doc@example.com").unwrap();
        link_doctor(&conn, &other, "doc@example.com").unwrap();
        reading(&conn, elodie.id, Zone::Red);

        for term in ["élodie", "ÉLODIE"] {
            let filter = PatientFilter {
                search: Some(term.into()),
                ..Default::default()
            };
            let rows = list_patients(&conn, &doctor, &filter).unwrap();
            assert_eq!(rows.len(), 1, "{term}");
            assert_eq!(rows[0].patient.id, elodie.id);
        }

        let filter = PatientFilter {
            search: Some("élodie".into()),
            zone: Some(Zone::Green),
        };
        assert!(list_patients(&conn, &doctor, &filter).unwrap().is_empty());
    }

    #[test]
    fn dashboard_requires_doctor() {
        let conn = open_memory_database().unwrap();
        let patient = seed(&conn, "pat@example.com", "Pat", Role::Patient);
        assert!(matches!(
            list_patients(&conn, &patient, &PatientFilter::default()),
            Err(CoreError::Forbidden(_))
        ));
    }

    #[test]
    fn unlink_and_remove_patient() {
        let conn = open_memory_database().unwrap();
        let doctor = seed(&conn, "doc@example.com", "Dr Who", Role::Doctor);
        let patient = seed(&conn, "pat@example.com", "Pat", Role::Patient);

        link_doctor(&conn, &patient, "doc@example.com").unwrap();
        assert_eq!(linked_doctor(&conn, &patient).unwrap().id, doctor.id);
        remove_patient(&conn, &doctor, patient.id).unwrap();
        assert!(matches!(
            remove_patient(&conn, &doctor, patient.id),
            Err(CoreError::NotFound(_))
        ));

        link_doctor(&conn, &patient, "doc@example.com").unwrap();
        assert_eq!(unlink_doctor(&conn, &patient).unwrap(), 1);
        assert!(matches!(linked_doctor(&conn, &patient), Err(CoreError::NotFound(_))));
    }

    #[test]
    fn patient_views_respect_link_policy() {
        let conn = open_memory_database().unwrap();
        let doctor = seed(&conn, "doc@example.com", "Dr Who", Role::Doctor);
        let patient = seed(&conn, "pat@example.com", "Pat", Role::Patient);
        reading(&conn, patient.id, Zone::Red);

        assert!(matches!(
            patient_readings(&conn, &doctor, patient.id, CareLinkPolicy::Required),
            Err(CoreError::Forbidden(_))
        ));
        let open = patient_readings(&conn, &doctor, patient.id, CareLinkPolicy::Unchecked).unwrap();
        assert_eq!(open.len(), 1);

        link_doctor(&conn, &patient, "doc@example.com").unwrap();
        assert_eq!(
            patient_readings(&conn, &doctor, patient.id, CareLinkPolicy::Required)
                .unwrap()
                .len(),
            1
        );
        assert!(patient_symptoms(&conn, &doctor, patient.id, CareLinkPolicy::Required)
            .unwrap()
            .is_empty());
    }
}
