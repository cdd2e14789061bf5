use std::collections::HashSet;

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::AdministrationLog;

use super::{format_stored_time, parse_stored_date, parse_stored_time, parse_stored_uuid};

pub fn insert_administration_log(
    conn: &Connection,
    log: &AdministrationLog,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO administration_logs (id, dose_id, administered_date, administered_time, note, administered_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            log.id.to_string(),
            log.dose_id.to_string(),
            log.administered_date.to_string(),
            format_stored_time(log.administered_time),
            log.note,
            log.administered_by.to_string(),
        ],
    )?;
    Ok(())
}

/// Which of the given doses have at least one log row on the given day.
/// One query for a whole member's worth of doses; duplicates collapse.
pub fn logged_dose_ids(
    conn: &Connection,
    dose_ids: &[Uuid],
    day: NaiveDate,
) -> Result<HashSet<Uuid>, DatabaseError> {
    if dose_ids.is_empty() {
        return Ok(HashSet::new());
    }

    let placeholders: Vec<String> = (2..=dose_ids.len() + 1).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "SELECT DISTINCT dose_id FROM administration_logs
         WHERE administered_date = ?1 AND dose_id IN ({})",
        placeholders.join(", ")
    );

    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::with_capacity(dose_ids.len() + 1);
    params_vec.push(Box::new(day.to_string()));
    for id in dose_ids {
        params_vec.push(Box::new(id.to_string()));
    }
    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), |row| row.get::<_, String>(0))?;

    let mut logged = HashSet::new();
    for row in rows {
        logged.insert(parse_stored_uuid("administration_logs.dose_id", &row?)?);
    }
    Ok(logged)
}

/// Administration history for one dose, newest first.
pub fn logs_for_dose(conn: &Connection, dose_id: &Uuid) -> Result<Vec<AdministrationLog>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, dose_id, administered_date, administered_time, note, administered_by
         FROM administration_logs WHERE dose_id = ?1
         ORDER BY administered_date DESC, administered_time DESC",
    )?;

    let rows = stmt.query_map(params![dose_id.to_string()], |row| {
        Ok(LogRow {
            id: row.get(0)?,
            dose_id: row.get(1)?,
            administered_date: row.get(2)?,
            administered_time: row.get(3)?,
            note: row.get(4)?,
            administered_by: row.get(5)?,
        })
    })?;

    let mut logs = Vec::new();
    for row in rows {
        logs.push(log_from_row(row?)?);
    }
    Ok(logs)
}

pub fn delete_logs_for_doses(conn: &Connection, dose_ids: &[Uuid]) -> Result<usize, DatabaseError> {
    if dose_ids.is_empty() {
        return Ok(0);
    }

    let placeholders: Vec<String> = (1..=dose_ids.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "DELETE FROM administration_logs WHERE dose_id IN ({})",
        placeholders.join(", ")
    );

    let params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = dose_ids
        .iter()
        .map(|id| Box::new(id.to_string()) as Box<dyn rusqlite::types::ToSql>)
        .collect();
    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let deleted = conn.execute(&sql, param_refs.as_slice())?;
    Ok(deleted)
}

// Internal row type for AdministrationLog mapping
struct LogRow {
    id: String,
    dose_id: String,
    administered_date: String,
    administered_time: String,
    note: Option<String>,
    administered_by: String,
}

fn log_from_row(row: LogRow) -> Result<AdministrationLog, DatabaseError> {
    Ok(AdministrationLog {
        id: parse_stored_uuid("administration_logs.id", &row.id)?,
        dose_id: parse_stored_uuid("administration_logs.dose_id", &row.dose_id)?,
        administered_date: parse_stored_date(
            "administration_logs.administered_date",
            &row.administered_date,
        )?,
        administered_time: parse_stored_time(
            "administration_logs.administered_time",
            &row.administered_time,
        )?,
        note: row.note,
        administered_by: parse_stored_uuid(
            "administration_logs.administered_by",
            &row.administered_by,
        )?,
    })
}
