use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Authorization edge granting a doctor visibility into a patient's records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorPatientLink {
    pub id: i64,
    pub doctor_id: i64,
    pub patient_id: i64,
    pub created_at: NaiveDateTime,
}
