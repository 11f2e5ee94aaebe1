use rusqlite::{params, Connection};

use super::{select_one_where, select_where, Entity};
use crate::db::DatabaseError;
use crate::models::*;

pub fn triage_for_visit(conn: &Connection, visit_id: i64) -> Result<Option<Triage>, DatabaseError> {
    select_one_where(conn, "visit_id = ?1 ORDER BY id", params![visit_id])
}

/// Every triage reading taken across a patient's visits, newest first.
pub fn triage_history_for_user(conn: &Connection, user_id: i64) -> Result<Vec<Triage>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT t.* FROM triages t
         JOIN visits v ON v.id = t.visit_id
         WHERE v.user_id = ?1 AND v.deleted_at IS NULL AND t.deleted_at IS NULL
         ORDER BY t.created_at DESC, t.id DESC",
    )?;
    let rows = stmt.query_map(params![user_id], Triage::from_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// The patient's newest visit of type `triage`, with its reading if any.
pub fn latest_triage_visit(conn: &Connection, user_id: i64) -> Result<Option<(Visit, Option<Triage>)>, DatabaseError> {
    let visit: Option<Visit> = select_one_where(
        conn,
        "user_id = ?1 AND type = 'triage' ORDER BY created_at DESC, id DESC",
        params![user_id],
    )?;
    match visit {
        Some(visit) => {
            let triage = triage_for_visit(conn, visit.meta.id)?;
            Ok(Some((visit, triage)))
        }
        None => Ok(None),
    }
}

/// Readings still waiting to be seen, oldest first.
pub fn pending_triage(conn: &Connection) -> Result<Vec<Triage>, DatabaseError> {
    select_where(
        conn,
        "status = ?1 ORDER BY created_at, id",
        params![TriageStatus::Pending],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::insert_record;
    use crate::db::sqlite::open_memory_database;

    fn setup() -> (Connection, i64) {
        let conn = open_memory_database().unwrap();
        let mut user = User::new("Hala", "Mansour", "NID-T");
        insert_record(&conn, &mut user).unwrap();
        (conn, user.meta.id)
    }

    fn visit_with_triage(conn: &Connection, uid: i64, kind: &str, status: TriageStatus) -> (Visit, Triage) {
        let mut visit = Visit::new(uid, kind);
        insert_record(conn, &mut visit).unwrap();
        let mut triage = Triage { visit_id: visit.meta.id, status, ..Default::default() };
        insert_record(conn, &mut triage).unwrap();
        (visit, triage)
    }

    #[test]
    fn pending_is_oldest_first_and_filters_status() {
        let (conn, uid) = setup();
        let (_, first) = visit_with_triage(&conn, uid, "triage", TriageStatus::Pending);
        visit_with_triage(&conn, uid, "triage", TriageStatus::Completed);
        let (_, third) = visit_with_triage(&conn, uid, "triage", TriageStatus::Pending);

        let ids: Vec<_> = pending_triage(&conn).unwrap().into_iter().map(|t| t.meta.id).collect();
        assert_eq!(ids, vec![first.meta.id, third.meta.id]);
    }

    #[test]
    fn history_spans_visits_newest_first() {
        let (conn, uid) = setup();
        let (_, older) = visit_with_triage(&conn, uid, "regular", TriageStatus::Completed);
        let (_, newer) = visit_with_triage(&conn, uid, "triage", TriageStatus::Pending);

        let ids: Vec<_> = triage_history_for_user(&conn, uid).unwrap().into_iter().map(|t| t.meta.id).collect();
        assert_eq!(ids, vec![newer.meta.id, older.meta.id]);
    }

    #[test]
    fn latest_triage_visit_only_considers_triage_visits() {
        let (conn, uid) = setup();
        let (triage_visit, _) = visit_with_triage(&conn, uid, "triage", TriageStatus::Completed);
        visit_with_triage(&conn, uid, "regular", TriageStatus::Completed);

        let (visit, triage) = latest_triage_visit(&conn, uid).unwrap().unwrap();
        assert_eq!(visit.meta.id, triage_visit.meta.id);
        assert!(triage.is_some());
    }
}
