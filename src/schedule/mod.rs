//! Schedule Status Engine
//!
//! Answers one question: for this member, on this caller's clock, which
//! doses are DONE, COMING, or PAST_DUE. The module also coordinates the
//! mutations (create, reconcile-update, cascade delete, administration
//! logging) that keep the underlying schedule consistent.
//!
//! Statuses are derived at read time against the caller's local clock;
//! nothing here ever persists one. Two callers in different time zones can
//! legitimately see different answers for the same stored rows.

pub mod clock;
pub mod dashboard;
pub mod mutation;
pub mod status;

pub use clock::*;
pub use dashboard::*;
pub use mutation::*;
pub use status::*;

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unparseable client date-time: {0}")]
    InvalidClientTime(String),
}

impl ScheduleError {
    /// Whether the caller, not the engine, is at fault. Not-found and
    /// validation failures map to 4xx-style handling in an embedding
    /// transport; everything else is a server-side fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ScheduleError::Validation(_)
                | ScheduleError::InvalidClientTime(_)
                | ScheduleError::Database(DatabaseError::NotFound { .. })
        )
    }
}
