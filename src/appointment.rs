//! Appointment booking.
//!
//! Appointments are plain per-patient rows. The only rule beyond field
//! presence is that a booking, or a change to one, may not land in the past.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Deserialize;

use crate::composite::{CompositeError, CompositeWriter};
use crate::db::repository::{require_record, update_record};
use crate::db::store::SqliteStore;
use crate::models::{Appointment, AppointmentStatus, RecordMeta, User};

// ─── Types ────────────────────────────────────────────────────────────────────

/// Request to book an appointment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppointmentRequest {
    pub user_id: i64,
    pub date: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub appointment_type: String,
    pub status: Option<AppointmentStatus>,
    pub notes: String,
}

pub const PAST_DATE_MESSAGE: &str = "Cannot schedule appointment in the past";

/// Reject dates strictly before `now`.
pub fn check_not_past(date: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), CompositeError> {
    if date < now {
        return Err(CompositeError::Validation(PAST_DATE_MESSAGE.into()));
    }
    Ok(())
}

impl AppointmentRequest {
    pub fn validate(self, now: DateTime<Utc>) -> Result<Appointment, CompositeError> {
        if self.user_id <= 0 {
            return Err(CompositeError::Validation("user_id is required".into()));
        }
        let date = self
            .date
            .ok_or_else(|| CompositeError::Validation("date is required".into()))?;
        check_not_past(date, now)?;

        Ok(Appointment {
            meta: RecordMeta::new(),
            user_id: self.user_id,
            date,
            appointment_type: self.appointment_type,
            status: self.status.unwrap_or_default(),
            notes: self.notes,
        })
    }
}

// ─── Writes ───────────────────────────────────────────────────────────────────

/// Book an appointment for an existing patient.
pub fn book_appointment(conn: &Connection, request: AppointmentRequest) -> Result<Appointment, CompositeError> {
    let appointment = request.validate(Utc::now())?;

    let mut store = SqliteStore::new(conn);
    let appointment = CompositeWriter::new(&mut store).run(|scope| {
        scope.require::<User>(appointment.user_id)?;
        scope.insert_root(appointment)
    })?;

    tracing::info!(appointment_id = appointment.meta.id, date = %appointment.date, "Appointment booked");
    Ok(appointment)
}

/// Save an edited appointment. The (possibly changed) date is checked again.
pub fn reschedule(conn: &Connection, mut appointment: Appointment) -> Result<Appointment, CompositeError> {
    let now = Utc::now();
    check_not_past(appointment.date, now)?;
    require_record::<Appointment>(conn, appointment.meta.id)?;
    appointment.meta.updated_at = now;
    update_record(conn, &appointment)?;
    Ok(appointment)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::db::repository::insert_record;
    use crate::db::sqlite::open_memory_database;
    use crate::db::DatabaseError;

    fn setup() -> (Connection, i64) {
        let conn = open_memory_database().unwrap();
        let mut user = User::new("Lina", "Aoun", "NID-APPT");
        insert_record(&conn, &mut user).unwrap();
        (conn, user.meta.id)
    }

    #[test]
    fn books_future_appointment_as_scheduled() {
        let (conn, uid) = setup();
        let appt = book_appointment(
            &conn,
            AppointmentRequest {
                user_id: uid,
                date: Some(Utc::now() + Duration::days(2)),
                appointment_type: "follow-up".into(),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(appt.meta.id > 0);
        assert_eq!(appt.status, AppointmentStatus::Scheduled);
    }

    #[test]
    fn past_date_is_rejected() {
        let (conn, uid) = setup();
        let err = book_appointment(
            &conn,
            AppointmentRequest {
                user_id: uid,
                date: Some(Utc::now() - Duration::hours(1)),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, CompositeError::Validation(m) if m == PAST_DATE_MESSAGE));
    }

    #[test]
    fn unknown_patient_is_reference_error() {
        let (conn, _) = setup();
        let err = book_appointment(
            &conn,
            AppointmentRequest {
                user_id: 321,
                date: Some(Utc::now() + Duration::days(1)),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, CompositeError::MissingReference { entity: "User", id: 321 }));
    }

    #[test]
    fn reschedule_checks_date_and_existence() {
        let (conn, uid) = setup();
        let mut appt = book_appointment(
            &conn,
            AppointmentRequest {
                user_id: uid,
                date: Some(Utc::now() + Duration::days(1)),
                ..Default::default()
            },
        )
        .unwrap();

        appt.date = Utc::now() + Duration::days(5);
        appt.notes = "moved".into();
        let saved = reschedule(&conn, appt.clone()).unwrap();
        let fetched: Appointment = require_record(&conn, saved.meta.id).unwrap();
        assert_eq!(fetched.notes, "moved");

        appt.date = Utc::now() - Duration::days(1);
        assert!(matches!(reschedule(&conn, appt.clone()), Err(CompositeError::Validation(_))));

        appt.date = Utc::now() + Duration::days(1);
        appt.meta.id = 999;
        assert!(matches!(
            reschedule(&conn, appt),
            Err(CompositeError::Store(DatabaseError::NotFound { .. }))
        ));
    }
}
