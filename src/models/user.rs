use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::Role;

/// An account holder. The password hash never leaves the repository layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub age: Option<i32>,
    pub height: Option<i32>,
    pub gender: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Optional demographic fields shared by signup and profile updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileFields {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub height: Option<i32>,
    pub gender: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password_hash: String,
    pub age: Option<i32>,
    pub height: Option<i32>,
    pub gender: Option<String>,
    pub contact_number: Option<String>,
    pub address: Option<String>,
}
