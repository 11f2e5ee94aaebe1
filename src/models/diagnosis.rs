use serde::{Deserialize, Serialize};

use super::RecordMeta;
use crate::composite::ChildRecord;

/// A doctor's report for a visit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Diagnosis {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub visit_id: i64,
    pub diagnosis: String,
    pub notes: String,
}

record!(Diagnosis in "diagnoses" as "Diagnosis" {
    "visit_id" => visit_id,
    "diagnosis" => diagnosis,
    "notes" => notes,
});

impl ChildRecord for Diagnosis {
    fn attach_to(&mut self, parent_id: i64) {
        self.visit_id = parent_id;
    }
}
