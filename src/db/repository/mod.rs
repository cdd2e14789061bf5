//! Repository layer — entity-scoped database operations.
//!
//! One sub-module per table. All public functions are re-exported here so
//! callers address the layer, not the file split.

mod administration_log;
mod dose;
mod medication;
mod member;

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use super::DatabaseError;

// Re-export all public items from sub-modules
pub use administration_log::*;
pub use dose::*;
pub use medication::*;
pub use member::*;

// Stored-value parsers. A column that does not parse is a hard error,
// never a defaulted value.

pub(crate) fn parse_stored_uuid(field: &str, value: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(value).map_err(|_| DatabaseError::Malformed {
        field: field.into(),
        value: value.into(),
    })
}

pub(crate) fn parse_stored_date(field: &str, value: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| DatabaseError::Malformed {
        field: field.into(),
        value: value.into(),
    })
}

pub(crate) fn parse_stored_time(field: &str, value: &str) -> Result<NaiveTime, DatabaseError> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| DatabaseError::Malformed {
        field: field.into(),
        value: value.into(),
    })
}

/// Wall-clock times are stored as `HH:MM`, exactly as callers enter them.
pub(crate) fn format_stored_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
