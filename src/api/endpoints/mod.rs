//! API endpoint handlers.
//!
//! Handlers are thin: open a connection, call the service function,
//! serialize the result. Authorization lives in the services.

pub mod auth;
pub mod contacts;
pub mod doctor;
pub mod health;
pub mod medications;
pub mod notifications;
pub mod patient;
pub mod profile;
pub mod readings;
pub mod reminders;
