use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Diagnosis, RecordMeta, Triage};

/// One patient encounter. Triage readings, doctor reports and
/// prescriptions hang off a visit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Visit {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub user_id: i64,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub visit_type: String,
}

record!(Visit in "visits" as "Visit" {
    "user_id" => user_id,
    "date" => date,
    "type" => visit_type,
});

impl Visit {
    /// A visit dated now.
    pub fn new(user_id: i64, visit_type: &str) -> Self {
        let meta = RecordMeta::new();
        Self {
            date: meta.created_at,
            meta,
            user_id,
            visit_type: visit_type.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VisitDetail {
    #[serde(flatten)]
    pub visit: Visit,
    pub triage_data: Option<Triage>,
    pub doctor_report: Option<Diagnosis>,
}
