use serde::{Deserialize, Serialize};

use super::{positive_id, Medication, PrescriptionStatus, RecordMeta};
use crate::composite::ChildRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prescription {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub user_id: i64,
    pub visit_id: i64,
    #[serde(deserialize_with = "positive_id")]
    pub diagnosis_id: Option<i64>,
    pub notes: String,
    /// Prescription date as given by the prescriber.
    pub date: String,
    pub doctor_name: String,
    pub status: PrescriptionStatus,
    pub instructions: String,
}

record!(Prescription in "prescriptions" as "Prescription" {
    "user_id" => user_id,
    "visit_id" => visit_id,
    "diagnosis_id" => diagnosis_id,
    "notes" => notes,
    "date" => date,
    "doctor_name" => doctor_name,
    "status" => status,
    "instructions" => instructions,
});

impl ChildRecord for Prescription {
    fn attach_to(&mut self, parent_id: i64) {
        self.visit_id = parent_id;
    }
}

/// A prescription with its medication lines.
#[derive(Debug, Clone, Serialize)]
pub struct PrescriptionDetail {
    #[serde(flatten)]
    pub prescription: Prescription,
    pub medications: Vec<Medication>,
}
