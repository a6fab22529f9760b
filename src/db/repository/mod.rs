//! Repository layer: entity-scoped database operations.
//!
//! One sub-module per table family. Functions take an explicit
//! `&Connection` so callers decide the transaction boundary.

mod alert;
mod audit;
mod baseline;
mod contact;
mod link;
mod medication;
mod notification;
mod pefr;
mod reminder;
mod session;
mod symptom;
mod user;

use std::str::FromStr;

use chrono::NaiveDateTime;

use super::{parse_timestamp, DatabaseError};

pub use alert::*;
pub use audit::*;
pub use baseline::*;
pub use contact::*;
pub use link::*;
pub use medication::*;
pub use notification::*;
pub use pefr::*;
pub use reminder::*;
pub use session::*;
pub use symptom::*;
pub use user::*;

/// Parse a stored enum column inside a row mapper.
pub(crate) fn column_enum<T>(idx: usize, raw: &str) -> Result<T, rusqlite::Error>
where
    T: FromStr<Err = DatabaseError>,
{
    T::from_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse a stored timestamp column inside a row mapper.
pub(crate) fn column_timestamp(idx: usize, raw: &str) -> Result<NaiveDateTime, rusqlite::Error> {
    parse_timestamp(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
