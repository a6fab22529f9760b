use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::AlertType;

/// Append-only record of a raised clinical alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertLogEntry {
    pub id: i64,
    pub user_id: i64,
    pub reading_id: Option<i64>,
    pub alert_type: AlertType,
    pub message: String,
    pub created_at: NaiveDateTime,
}

/// Append-only record of a mutating action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: String,
    pub entity: Option<String>,
    pub created_at: NaiveDateTime,
}
