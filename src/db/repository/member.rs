use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Member;

use super::parse_stored_uuid;

pub fn insert_member(conn: &Connection, member: &Member) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO members (id, first_name, last_name, created_by)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            member.id.to_string(),
            member.first_name,
            member.last_name,
            member.created_by.to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_member(conn: &Connection, id: &Uuid) -> Result<Option<Member>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, created_by FROM members WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], |row| {
        Ok(MemberRow {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            created_by: row.get(3)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(member_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All members, in the order the dashboard lists them.
pub fn list_members(conn: &Connection) -> Result<Vec<Member>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, created_by FROM members
         ORDER BY first_name, last_name",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(MemberRow {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            created_by: row.get(3)?,
        })
    })?;

    let mut members = Vec::new();
    for row in rows {
        members.push(member_from_row(row?)?);
    }
    Ok(members)
}

/// Rename a member. Ownership (`created_by`) never changes after creation.
pub fn update_member(conn: &Connection, member: &Member) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE members SET first_name = ?2, last_name = ?3 WHERE id = ?1",
        params![member.id.to_string(), member.first_name, member.last_name],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Member".into(),
            id: member.id.to_string(),
        });
    }
    Ok(())
}

/// Delete the member row only; returns rows removed. Cascading through the
/// member's medications belongs to the mutation coordinator.
pub fn delete_member(conn: &Connection, id: &Uuid) -> Result<usize, DatabaseError> {
    let deleted = conn.execute("DELETE FROM members WHERE id = ?1", params![id.to_string()])?;
    Ok(deleted)
}

// Internal row type for Member mapping
struct MemberRow {
    id: String,
    first_name: String,
    last_name: Option<String>,
    created_by: String,
}

fn member_from_row(row: MemberRow) -> Result<Member, DatabaseError> {
    Ok(Member {
        id: parse_stored_uuid("members.id", &row.id)?,
        first_name: row.first_name,
        last_name: row.last_name,
        created_by: parse_stored_uuid("members.created_by", &row.created_by)?,
    })
}
