//! Baseline, peak-flow and symptom recording.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::authorization::{require_role, Actor};
use crate::core_state::{log_audit, CoreError};
use crate::db::{now_timestamp, repository};
use crate::models::{
    AlertType, Baseline, NewPefrRecord, PefrRecord, ReadingSource, Role, Symptom, SymptomEntry,
    Trend, Zone,
};
use crate::peak_flow;
use crate::triage::{self, Triage};

#[derive(Debug, Clone, Deserialize)]
pub struct NewReading {
    pub pefr_value: i64,
    #[serde(default)]
    pub source: ReadingSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordedReading {
    pub zone: Zone,
    pub guidance: &'static str,
    pub percentage: f64,
    pub trend: Trend,
    pub record: PefrRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordedSymptom {
    #[serde(flatten)]
    pub symptom: Symptom,
    pub triage: Triage,
}

// ═══════════════════════════════════════════════════════════
// Baseline
// ═══════════════════════════════════════════════════════════

/// Create or replace the calling patient's baseline. Existing readings
/// keep the zone they were scored with.
pub fn set_baseline(conn: &Connection, actor: &Actor, value: i64) -> Result<Baseline, CoreError> {
    require_role(actor, Role::Patient, "set a baseline")?;
    let value = u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| CoreError::Validation("baseline_value must be a positive integer".into()))?;

    let baseline = repository::upsert_baseline(conn, actor.id, value)?;
    log_audit(conn, Some(actor.id), "baseline.set", Some(&format!("baseline:{}", baseline.id)));
    Ok(baseline)
}

pub fn get_baseline(conn: &Connection, actor: &Actor) -> Result<Baseline, CoreError> {
    require_role(actor, Role::Patient, "view a baseline")?;
    repository::get_baseline(conn, actor.id)?
        .ok_or_else(|| CoreError::NotFound("Baseline".into()))
}

// ═══════════════════════════════════════════════════════════
// Peak flow
// ═══════════════════════════════════════════════════════════

/// Score and store a reading.
///
/// The reading, its Red-zone alert and the doctor notifications commit
/// together; the audit entry follows outside the transaction.
pub fn record_pefr(
    conn: &Connection,
    actor: &Actor,
    input: &NewReading,
) -> Result<RecordedReading, CoreError> {
    require_role(actor, Role::Patient, "record PEFR")?;
    // Zero is scored like any reading; only negative values are rejected.
    if input.pefr_value < 0 {
        return Err(CoreError::Validation("pefr_value must not be negative".into()));
    }

    let tx = conn.unchecked_transaction()?;

    let baseline = repository::get_baseline(&tx, actor.id)?.map(|b| b.baseline_value);
    let previous = repository::latest_pefr_record(&tx, actor.id)?.map(|r| r.pefr_value);
    let classification = peak_flow::classify(baseline, input.pefr_value);
    let trend = peak_flow::trend(previous, input.pefr_value);

    let record = repository::insert_pefr_record(
        &tx,
        &NewPefrRecord {
            owner_id: actor.id,
            pefr_value: input.pefr_value,
            zone: classification.zone,
            percentage: classification.percentage,
            trend,
            source: input.source,
            recorded_at: now_timestamp(),
        },
    )?;

    if classification.zone == Zone::Red {
        raise_red_zone_alert(&tx, &record)?;
    }

    tx.commit()?;

    log_audit(conn, Some(actor.id), "pefr.record", Some(&format!("pefr_record:{}", record.id)));
    tracing::debug!(
        reading_id = record.id,
        zone = %record.zone,
        trend = %record.trend,
        "PEFR recorded"
    );

    Ok(RecordedReading {
        zone: classification.zone,
        guidance: classification.guidance,
        percentage: classification.percentage,
        trend,
        record,
    })
}

/// One alert row per Red reading, plus a notification for each linked doctor.
fn raise_red_zone_alert(conn: &Connection, record: &PefrRecord) -> Result<(), CoreError> {
    let message = format!(
        "Red zone PEFR reading of {} ({:.1}% of baseline)",
        record.pefr_value, record.percentage
    );
    repository::insert_alert(conn, record.owner_id, Some(record.id), AlertType::RedZone, &message)?;

    let doctors = repository::linked_doctor_ids(conn, record.owner_id)?;
    let link = format!("/patient/{}/pefr", record.owner_id);
    for doctor_id in &doctors {
        repository::insert_notification(conn, *doctor_id, &message, Some(&link))?;
    }

    tracing::warn!(
        patient_id = record.owner_id,
        reading_id = record.id,
        notified_doctors = doctors.len(),
        "Red zone alert raised"
    );
    Ok(())
}

pub fn list_pefr(conn: &Connection, actor: &Actor) -> Result<Vec<PefrRecord>, CoreError> {
    require_role(actor, Role::Patient, "view PEFR records")?;
    Ok(repository::list_pefr_records(conn, actor.id)?)
}

// ═══════════════════════════════════════════════════════════
// Symptoms
// ═══════════════════════════════════════════════════════════

pub fn record_symptom(
    conn: &Connection,
    actor: &Actor,
    entry: &SymptomEntry,
) -> Result<RecordedSymptom, CoreError> {
    require_role(actor, Role::Patient, "record symptoms")?;
    triage::validate(entry).map_err(CoreError::Validation)?;

    let symptom = repository::insert_symptom(conn, actor.id, entry, &now_timestamp())?;
    log_audit(conn, Some(actor.id), "symptom.record", Some(&format!("symptom:{}", symptom.id)));

    let triage = triage::assess(entry);
    Ok(RecordedSymptom { symptom, triage })
}

pub fn list_symptoms(conn: &Connection, actor: &Actor) -> Result<Vec<Symptom>, CoreError> {
    require_role(actor, Role::Patient, "view symptoms")?;
    Ok(repository::list_symptoms(conn, actor.id)?)
}
