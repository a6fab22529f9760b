use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub owner_id: i64,
    pub message: String,
    pub link: Option<String>,
    pub read: bool,
    pub created_at: NaiveDateTime,
}
