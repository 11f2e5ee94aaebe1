use rusqlite::{params, Connection};

use super::{diagnosis_for_visit, get_record, select_where, triage_for_visit};
use crate::db::DatabaseError;
use crate::models::*;

/// A patient's visits, newest first.
pub fn visits_for_user(conn: &Connection, user_id: i64) -> Result<Vec<Visit>, DatabaseError> {
    select_where(conn, "user_id = ?1 ORDER BY created_at DESC, id DESC", params![user_id])
}

pub fn load_visit_detail(conn: &Connection, visit: Visit) -> Result<VisitDetail, DatabaseError> {
    Ok(VisitDetail {
        triage_data: triage_for_visit(conn, visit.meta.id)?,
        doctor_report: diagnosis_for_visit(conn, visit.meta.id)?,
        visit,
    })
}

pub fn get_visit_detail(conn: &Connection, visit_id: i64) -> Result<Option<VisitDetail>, DatabaseError> {
    get_record::<Visit>(conn, visit_id)?
        .map(|visit| load_visit_detail(conn, visit))
        .transpose()
}

pub fn visit_details_for_user(conn: &Connection, user_id: i64) -> Result<Vec<VisitDetail>, DatabaseError> {
    visits_for_user(conn, user_id)?
        .into_iter()
        .map(|visit| load_visit_detail(conn, visit))
        .collect()
}

/// Triage of the patient's newest visit that has one.
pub fn latest_visit_triage(conn: &Connection, user_id: i64) -> Result<Option<Triage>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT t.* FROM triages t
         JOIN visits v ON v.id = t.visit_id
         WHERE v.user_id = ?1 AND v.deleted_at IS NULL AND t.deleted_at IS NULL
         ORDER BY v.created_at DESC, v.id DESC, t.id DESC
         LIMIT 1",
    )?;
    let mut rows = stmt.query_map(params![user_id], <Triage as crate::db::Entity>::from_row)?;
    rows.next().transpose().map_err(DatabaseError::from)
}
