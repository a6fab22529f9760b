use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub phone_number: String,
    pub contact_relationship: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyContactInput {
    pub name: String,
    pub phone_number: String,
    pub contact_relationship: Option<String>,
}
