use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::enums::{MedicationSource, TakenStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub dose: Option<String>,
    pub schedule: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub days: Option<i32>,
    pub doses_remaining: Option<i32>,
    pub source: MedicationSource,
    pub prescribed_by: Option<i64>,
    pub taken_status: Option<TakenStatus>,
    pub created_at: NaiveDateTime,
}

/// Request body for adding or prescribing a medication.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicationInput {
    pub name: String,
    pub dose: Option<String>,
    pub schedule: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub days: Option<i32>,
    pub doses_remaining: Option<i32>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicationUpdate {
    pub name: Option<String>,
    pub dose: Option<String>,
    pub schedule: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub days: Option<i32>,
    pub doses_remaining: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationStatusChange {
    pub id: i64,
    pub medication_id: i64,
    pub status: String,
    pub notes: Option<String>,
    pub changed_at: NaiveDateTime,
    pub changed_by_user_id: Option<i64>,
}

/// Read-model for the doctor's per-patient medication history view.
#[derive(Debug, Clone, Serialize)]
pub struct MedicationWithHistory {
    #[serde(flatten)]
    pub medication: Medication,
    pub status_history: Vec<MedicationStatusChange>,
}
