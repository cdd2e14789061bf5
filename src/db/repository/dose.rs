use chrono::NaiveTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Dose;

use super::{format_stored_time, parse_stored_time, parse_stored_uuid};

pub fn insert_dose(conn: &Connection, dose: &Dose) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO doses (id, medication_id, time) VALUES (?1, ?2, ?3)",
        params![
            dose.id.to_string(),
            dose.medication_id.to_string(),
            format_stored_time(dose.time),
        ],
    )?;
    Ok(())
}

/// Bulk load dose rows by id. Order is not significant; callers index by id.
pub fn doses_by_ids(conn: &Connection, ids: &[Uuid]) -> Result<Vec<Dose>, DatabaseError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "SELECT id, medication_id, time FROM doses WHERE id IN ({})",
        placeholders.join(", ")
    );

    let params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = ids
        .iter()
        .map(|id| Box::new(id.to_string()) as Box<dyn rusqlite::types::ToSql>)
        .collect();
    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut doses = Vec::new();
    for row in rows {
        let (id, medication_id, time) = row?;
        doses.push(Dose {
            id: parse_stored_uuid("doses.id", &id)?,
            medication_id: parse_stored_uuid("doses.medication_id", &medication_id)?,
            time: parse_stored_time("doses.time", &time)?,
        });
    }
    Ok(doses)
}

/// Ids of every dose row pointing at the medication, reference list aside.
pub fn dose_ids_for_medication(
    conn: &Connection,
    medication_id: &Uuid,
) -> Result<Vec<Uuid>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id FROM doses WHERE medication_id = ?1")?;
    let rows = stmt.query_map(params![medication_id.to_string()], |row| {
        row.get::<_, String>(0)
    })?;

    let mut ids = Vec::new();
    for row in rows {
        ids.push(parse_stored_uuid("doses.id", &row?)?);
    }
    Ok(ids)
}

/// Returns rows updated: 0 means no such dose.
pub fn update_dose_time(
    conn: &Connection,
    dose_id: &Uuid,
    time: NaiveTime,
) -> Result<usize, DatabaseError> {
    let updated = conn.execute(
        "UPDATE doses SET time = ?2 WHERE id = ?1",
        params![dose_id.to_string(), format_stored_time(time)],
    )?;
    Ok(updated)
}

/// Returns rows deleted. Administration logs for the dose are not touched.
pub fn delete_dose(conn: &Connection, dose_id: &Uuid) -> Result<usize, DatabaseError> {
    let deleted = conn.execute("DELETE FROM doses WHERE id = ?1", params![dose_id.to_string()])?;
    Ok(deleted)
}

pub fn delete_doses_for_medication(
    conn: &Connection,
    medication_id: &Uuid,
) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM doses WHERE medication_id = ?1",
        params![medication_id.to_string()],
    )?;
    Ok(deleted)
}
