use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::{ReadingSource, Trend, Zone};

/// A patient's personal-best peak flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Baseline {
    pub id: i64,
    pub owner_id: i64,
    pub baseline_value: u32,
    pub updated_at: NaiveDateTime,
}

/// A stored peak-flow reading. Zone, percentage and trend are frozen at insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PefrRecord {
    pub id: i64,
    pub owner_id: i64,
    pub pefr_value: i64,
    pub zone: Zone,
    pub percentage: f64,
    pub trend: Trend,
    pub source: ReadingSource,
    pub recorded_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewPefrRecord {
    pub owner_id: i64,
    pub pefr_value: i64,
    pub zone: Zone,
    pub percentage: f64,
    pub trend: Trend,
    pub source: ReadingSource,
    pub recorded_at: NaiveDateTime,
}
