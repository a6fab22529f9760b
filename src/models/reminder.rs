use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: i64,
    pub owner_id: i64,
    pub reminder_type: String,
    pub time: String,
    pub frequency: String,
    pub compliance_count: i32,
    pub missed_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderInput {
    pub reminder_type: String,
    pub time: String,
    pub frequency: String,
}
