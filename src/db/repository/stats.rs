use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, Params};
use serde::Serialize;

use crate::db::{timestamp_value, DatabaseError};
use crate::models::{AppointmentStatus, TriageStatus};

/// Dashboard counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClinicStats {
    pub total_patients: i64,
    pub total_visits: i64,
    pub total_prescriptions: i64,
    pub total_appointments: i64,
    pub today_visits: i64,
    pub today_prescriptions: i64,
    pub today_appointments: i64,
    pub pending_triage: i64,
    pub upcoming_appointments: i64,
}

fn count_live<P: Params>(conn: &Connection, table: &str, clause: &str, params: P) -> Result<i64, DatabaseError> {
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE deleted_at IS NULL AND {clause}");
    Ok(conn.query_row(&sql, params, |row| row.get(0))?)
}

/// Counters as of `now`; "today" is the UTC calendar day containing `now`.
pub fn clinic_stats(conn: &Connection, now: DateTime<Utc>) -> Result<ClinicStats, DatabaseError> {
    let day_start = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|start| start.and_utc())
        .unwrap_or(now);
    let (start, end) = (timestamp_value(&day_start), timestamp_value(&(day_start + Duration::days(1))));
    let today = params![start, end];

    Ok(ClinicStats {
        total_patients: count_live(conn, "users", "1 = 1", [])?,
        total_visits: count_live(conn, "visits", "1 = 1", [])?,
        total_prescriptions: count_live(conn, "prescriptions", "1 = 1", [])?,
        total_appointments: count_live(conn, "appointments", "1 = 1", [])?,
        today_visits: count_live(conn, "visits", "created_at >= ?1 AND created_at < ?2", today)?,
        today_prescriptions: count_live(conn, "prescriptions", "created_at >= ?1 AND created_at < ?2", today)?,
        today_appointments: count_live(conn, "appointments", "date >= ?1 AND date < ?2", today)?,
        pending_triage: count_live(conn, "triages", "status = ?1", params![TriageStatus::Pending])?,
        upcoming_appointments: count_live(
            conn,
            "appointments",
            "date >= ?1 AND status = ?2",
            params![timestamp_value(&now), AppointmentStatus::Scheduled],
        )?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{insert_record, soft_delete};
    use crate::db::sqlite::open_memory_database;
    use crate::models::*;

    #[test]
    fn empty_database_is_all_zero() {
        let conn = open_memory_database().unwrap();
        assert_eq!(clinic_stats(&conn, Utc::now()).unwrap(), ClinicStats::default());
    }

    #[test]
    fn counts_activity() {
        let conn = open_memory_database().unwrap();
        let now = Utc::now();
        let mut user = User::new("Ziad", "Karam", "NID-S");
        insert_record(&conn, &mut user).unwrap();
        let uid = user.meta.id;

        let mut visit = Visit::new(uid, "triage");
        insert_record(&conn, &mut visit).unwrap();
        insert_record(&conn, &mut Triage { visit_id: visit.meta.id, ..Default::default() }).unwrap();
        insert_record(&conn, &mut Prescription { user_id: uid, visit_id: visit.meta.id, ..Default::default() }).unwrap();
        insert_record(&conn, &mut Appointment { user_id: uid, date: now + Duration::days(3), ..Default::default() }).unwrap();
        let mut cancelled = Appointment {
            user_id: uid,
            date: now + Duration::days(4),
            status: AppointmentStatus::Cancelled,
            ..Default::default()
        };
        insert_record(&conn, &mut cancelled).unwrap();
        let mut gone = User::new("Gone", "Patient", "NID-GONE");
        insert_record(&conn, &mut gone).unwrap();
        soft_delete::<User>(&conn, gone.meta.id).unwrap();

        let stats = clinic_stats(&conn, now).unwrap();
        assert_eq!(stats.total_patients, 1);
        assert_eq!(stats.total_visits, 1);
        assert_eq!(stats.today_visits, 1);
        assert_eq!(stats.today_prescriptions, 1);
        assert_eq!(stats.total_appointments, 2);
        assert_eq!(stats.pending_triage, 1);
        assert_eq!(stats.upcoming_appointments, 1);
    }
}
