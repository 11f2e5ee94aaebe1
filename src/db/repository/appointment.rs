use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{get_record, select_where};
use crate::db::{timestamp_value, DatabaseError};
use crate::models::*;

/// A patient's appointments from `now` on, soonest first.
pub fn future_appointments_for_user(
    conn: &Connection,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<Vec<Appointment>, DatabaseError> {
    select_where(
        conn,
        "user_id = ?1 AND date >= ?2 ORDER BY date, id",
        params![user_id, timestamp_value(&now)],
    )
}

/// Every appointment from `now` on, soonest first, with the patient.
pub fn upcoming_appointments(conn: &Connection, now: DateTime<Utc>) -> Result<Vec<AppointmentWithPatient>, DatabaseError> {
    let appointments: Vec<Appointment> =
        select_where(conn, "date >= ?1 ORDER BY date, id", params![timestamp_value(&now)])?;
    appointments
        .into_iter()
        .map(|appointment| {
            Ok(AppointmentWithPatient {
                user: get_record::<User>(conn, appointment.user_id)?,
                appointment,
            })
        })
        .collect()
}
