use rusqlite::{params, Connection};

use super::{select_one_where, Entity};
use crate::db::DatabaseError;
use crate::models::*;

pub fn diagnosis_for_visit(conn: &Connection, visit_id: i64) -> Result<Option<Diagnosis>, DatabaseError> {
    select_one_where(conn, "visit_id = ?1 ORDER BY id", params![visit_id])
}

/// Doctor reports written across a patient's visits, newest first.
pub fn diagnoses_for_user(conn: &Connection, user_id: i64) -> Result<Vec<Diagnosis>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT d.* FROM diagnoses d
         JOIN visits v ON v.id = d.visit_id
         WHERE v.user_id = ?1 AND v.deleted_at IS NULL AND d.deleted_at IS NULL
         ORDER BY d.created_at DESC, d.id DESC",
    )?;
    let rows = stmt.query_map(params![user_id], Diagnosis::from_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}
