use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RecordMeta, TriageStatus};
use crate::composite::ChildRecord;

pub const DEFAULT_PRIORITY: &str = "normal";

/// Vital signs and symptoms taken at intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Triage {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub visit_id: i64,
    pub heart_rate: i64,
    pub blood_pressure: String,
    pub temperature: f64,
    pub respiratory_rate: i64,
    pub oxygen_saturation: i64,
    pub pain_level: i64,
    pub symptoms: String,
    pub priority_level: String,
    #[serde(alias = "type")]
    pub status: TriageStatus,
}

record!(Triage in "triages" as "Triage" {
    "visit_id" => visit_id,
    "heart_rate" => heart_rate,
    "blood_pressure" => blood_pressure,
    "temperature" => temperature,
    "respiratory_rate" => respiratory_rate,
    "oxygen_saturation" => oxygen_saturation,
    "pain_level" => pain_level,
    "symptoms" => symptoms,
    "priority_level" => priority_level,
    "status" => status,
});

impl Default for Triage {
    fn default() -> Self {
        Self {
            meta: RecordMeta::new(),
            visit_id: 0,
            heart_rate: 0,
            blood_pressure: String::new(),
            temperature: 0.0,
            respiratory_rate: 0,
            oxygen_saturation: 0,
            pain_level: 0,
            symptoms: String::new(),
            priority_level: DEFAULT_PRIORITY.into(),
            status: TriageStatus::default(),
        }
    }
}

impl ChildRecord for Triage {
    fn attach_to(&mut self, parent_id: i64) {
        self.visit_id = parent_id;
    }
}

impl Triage {
    pub fn validate(&self) -> Result<(), String> {
        if !(0..=10).contains(&self.pain_level) {
            return Err("pain_level must be between 0 and 10".into());
        }
        if !(0..=100).contains(&self.oxygen_saturation) {
            return Err("oxygen_saturation must be between 0 and 100".into());
        }
        if self.heart_rate < 0 || self.respiratory_rate < 0 {
            return Err("heart_rate and respiratory_rate must not be negative".into());
        }
        Ok(())
    }
}

/// The newest triage of a patient, tagged with the visit it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct LatestTriage {
    pub visit_id: i64,
    pub created_at: DateTime<Utc>,
    pub heart_rate: i64,
    pub blood_pressure: String,
    pub temperature: f64,
    pub respiratory_rate: i64,
    pub oxygen_saturation: i64,
    pub pain_level: i64,
    pub symptoms: String,
    pub priority_level: String,
}

impl LatestTriage {
    pub fn new(visit_id: i64, visit_created_at: DateTime<Utc>, triage: Triage) -> Self {
        Self {
            visit_id,
            created_at: visit_created_at,
            heart_rate: triage.heart_rate,
            blood_pressure: triage.blood_pressure,
            temperature: triage.temperature,
            respiratory_rate: triage.respiratory_rate,
            oxygen_saturation: triage.oxygen_saturation,
            pain_level: triage.pain_level,
            symptoms: triage.symptoms,
            priority_level: triage.priority_level,
        }
    }
}
