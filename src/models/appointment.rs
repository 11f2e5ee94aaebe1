use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AppointmentStatus, RecordMeta, User};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Appointment {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub user_id: i64,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub appointment_type: String,
    pub status: AppointmentStatus,
    pub notes: String,
}

record!(Appointment in "appointments" as "Appointment" {
    "user_id" => user_id,
    "date" => date,
    "type" => appointment_type,
    "status" => status,
    "notes" => notes,
});

/// An appointment with its patient embedded.
#[derive(Debug, Clone, Serialize)]
pub struct AppointmentWithPatient {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub user: Option<User>,
}
