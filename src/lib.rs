//! Dosetrack: household medication schedules with read-time status.
//!
//! Medications carry an ordered list of daily dose slots; administrations
//! are appended to a log and never edited. DONE, COMING and PAST_DUE are
//! derived against the caller's clock and time zone on every read, so the
//! database never stores a stale classification.

pub mod config;
pub mod models;
pub mod db;
pub mod schedule;
