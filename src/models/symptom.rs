use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Self-reported respiratory symptoms. Ratings are 0–10, all optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymptomEntry {
    pub wheeze_rating: Option<i32>,
    pub cough_rating: Option<i32>,
    pub dyspnea_rating: Option<i32>,
    pub night_symptoms_rating: Option<i32>,
    #[serde(default)]
    pub dust_exposure: bool,
    #[serde(default)]
    pub smoke_exposure: bool,
    pub severity: Option<String>,
    pub onset_at: Option<NaiveDateTime>,
    pub duration: Option<i32>,
    pub suspected_trigger: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symptom {
    pub id: i64,
    pub owner_id: i64,
    #[serde(flatten)]
    pub entry: SymptomEntry,
    pub recorded_at: NaiveDateTime,
}
