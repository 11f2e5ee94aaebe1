use rusqlite::{params, Connection};

use super::{get_record, select_where};
use crate::db::DatabaseError;
use crate::models::*;

/// Medication lines of a prescription in the order they were written.
pub fn medications_for_prescription(conn: &Connection, prescription_id: i64) -> Result<Vec<Medication>, DatabaseError> {
    select_where(conn, "prescription_id = ?1 ORDER BY id", params![prescription_id])
}

pub fn prescriptions_for_user(conn: &Connection, user_id: i64) -> Result<Vec<Prescription>, DatabaseError> {
    select_where(conn, "user_id = ?1 ORDER BY created_at DESC, id DESC", params![user_id])
}

pub fn load_prescription_detail(conn: &Connection, prescription: Prescription) -> Result<PrescriptionDetail, DatabaseError> {
    Ok(PrescriptionDetail {
        medications: medications_for_prescription(conn, prescription.meta.id)?,
        prescription,
    })
}

pub fn get_prescription_detail(conn: &Connection, id: i64) -> Result<Option<PrescriptionDetail>, DatabaseError> {
    get_record::<Prescription>(conn, id)?
        .map(|p| load_prescription_detail(conn, p))
        .transpose()
}

pub fn prescription_details_for_user(conn: &Connection, user_id: i64) -> Result<Vec<PrescriptionDetail>, DatabaseError> {
    prescriptions_for_user(conn, user_id)?
        .into_iter()
        .map(|p| load_prescription_detail(conn, p))
        .collect()
}
