use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Medication;

use super::{parse_stored_date, parse_stored_uuid};

pub fn insert_medication(conn: &Connection, med: &Medication) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medications (id, member_id, name, dosage, route, note,
         start_date, end_date, dose_ids, created_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            med.id.to_string(),
            med.member_id.to_string(),
            med.name,
            med.dosage,
            med.route,
            med.note,
            med.start_date.to_string(),
            med.end_date.map(|d| d.to_string()),
            encode_dose_ids(&med.dose_ids)?,
            med.created_by.to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_medication(conn: &Connection, id: &Uuid) -> Result<Option<Medication>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, member_id, name, dosage, route, note, start_date, end_date, dose_ids, created_by
         FROM medications WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], |row| Ok(medication_row_from_rusqlite(row)));

    match result {
        Ok(row) => Ok(Some(medication_from_row(row?)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn medications_by_member(
    conn: &Connection,
    member_id: &Uuid,
) -> Result<Vec<Medication>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, member_id, name, dosage, route, note, start_date, end_date, dose_ids, created_by
         FROM medications WHERE member_id = ?1",
    )?;

    let rows = stmt.query_map(params![member_id.to_string()], |row| {
        Ok(medication_row_from_rusqlite(row))
    })?;

    let mut meds = Vec::new();
    for row in rows {
        meds.push(medication_from_row(row??)?);
    }
    Ok(meds)
}

/// Rewrite every mutable field, the dose-reference list included. The list
/// must already be the post-reconciliation survivor set.
pub fn update_medication(conn: &Connection, med: &Medication) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE medications SET member_id = ?2, name = ?3, dosage = ?4, route = ?5,
         note = ?6, start_date = ?7, end_date = ?8, dose_ids = ?9
         WHERE id = ?1",
        params![
            med.id.to_string(),
            med.member_id.to_string(),
            med.name,
            med.dosage,
            med.route,
            med.note,
            med.start_date.to_string(),
            med.end_date.map(|d| d.to_string()),
            encode_dose_ids(&med.dose_ids)?,
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Medication".into(),
            id: med.id.to_string(),
        });
    }
    Ok(())
}

/// Delete the medication row only; returns rows removed. Dose and log
/// cleanup belongs to the mutation coordinator.
pub fn delete_medication(conn: &Connection, id: &Uuid) -> Result<usize, DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM medications WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(deleted)
}

fn encode_dose_ids(ids: &[Uuid]) -> Result<String, DatabaseError> {
    serde_json::to_string(ids).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

fn decode_dose_ids(raw: &str) -> Result<Vec<Uuid>, DatabaseError> {
    serde_json::from_str(raw).map_err(|_| DatabaseError::Malformed {
        field: "medications.dose_ids".into(),
        value: raw.into(),
    })
}

// Internal row type for Medication mapping
struct MedicationRow {
    id: String,
    member_id: String,
    name: String,
    dosage: String,
    route: String,
    note: Option<String>,
    start_date: String,
    end_date: Option<String>,
    dose_ids: String,
    created_by: String,
}

fn medication_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<MedicationRow, rusqlite::Error> {
    Ok(MedicationRow {
        id: row.get(0)?,
        member_id: row.get(1)?,
        name: row.get(2)?,
        dosage: row.get(3)?,
        route: row.get(4)?,
        note: row.get(5)?,
        start_date: row.get(6)?,
        end_date: row.get(7)?,
        dose_ids: row.get(8)?,
        created_by: row.get(9)?,
    })
}

fn medication_from_row(row: MedicationRow) -> Result<Medication, DatabaseError> {
    let end_date = match row.end_date {
        Some(d) => Some(parse_stored_date("medications.end_date", &d)?),
        None => None,
    };
    Ok(Medication {
        id: parse_stored_uuid("medications.id", &row.id)?,
        member_id: parse_stored_uuid("medications.member_id", &row.member_id)?,
        name: row.name,
        dosage: row.dosage,
        route: row.route,
        note: row.note,
        start_date: parse_stored_date("medications.start_date", &row.start_date)?,
        end_date,
        dose_ids: decode_dose_ids(&row.dose_ids)?,
        created_by: parse_stored_uuid("medications.created_by", &row.created_by)?,
    })
}
