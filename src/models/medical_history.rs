//! Ancillary medical-history records. Each belongs to one patient and is
//! managed through the same create/read/update/delete surface.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{AllergySeverity, DisabilityKind, RecordMeta};
use crate::db::Entity;

/// A per-patient history record.
pub trait HistoryRecord: Entity + Serialize + DeserializeOwned + Send + 'static {
    fn user_id(&self) -> i64;
    fn meta_mut(&mut self) -> &mut RecordMeta;
}

macro_rules! history_record {
    ($ty:ident) => {
        impl HistoryRecord for $ty {
            fn user_id(&self) -> i64 {
                self.user_id
            }

            fn meta_mut(&mut self) -> &mut RecordMeta {
                &mut self.meta
            }
        }
    };
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HereditaryDisease {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub user_id: i64,
    pub name: String,
}

record!(HereditaryDisease in "hereditary_diseases" as "Hereditary disease" {
    "user_id" => user_id,
    "name" => name,
});
history_record!(HereditaryDisease);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Disability {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub user_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DisabilityKind,
}

record!(Disability in "disabilities" as "Disability" {
    "user_id" => user_id,
    "name" => name,
    "type" => kind,
});
history_record!(Disability);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicalImage {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub user_id: i64,
    pub image_url: String,
    pub description: String,
    pub center_name: String,
    pub date: String,
}

record!(MedicalImage in "medical_images" as "Medical image" {
    "user_id" => user_id,
    "image_url" => image_url,
    "description" => description,
    "center_name" => center_name,
    "date" => date,
});
history_record!(MedicalImage);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Surgery {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub user_id: i64,
    pub name: String,
    pub date: String,
    pub description: String,
}

record!(Surgery in "surgeries" as "Surgery" {
    "user_id" => user_id,
    "name" => name,
    "date" => date,
    "description" => description,
});
history_record!(Surgery);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Allergy {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub user_id: i64,
    pub name: String,
    pub reaction: String,
    pub severity: AllergySeverity,
    pub diagnosis: String,
    pub diagnosis_date: String,
    pub treatment_notes: String,
}

record!(Allergy in "allergies" as "Allergy" {
    "user_id" => user_id,
    "name" => name,
    "reaction" => reaction,
    "severity" => severity,
    "diagnosis" => diagnosis,
    "diagnosis_date" => diagnosis_date,
    "treatment_notes" => treatment_notes,
});
history_record!(Allergy);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChronicCondition {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub user_id: i64,
    pub name: String,
    pub diagnosis: String,
    pub diagnosis_date: String,
    pub medications: String,
    pub treatment_notes: String,
}

record!(ChronicCondition in "chronic_conditions" as "Chronic condition" {
    "user_id" => user_id,
    "name" => name,
    "diagnosis" => diagnosis,
    "diagnosis_date" => diagnosis_date,
    "medications" => medications,
    "treatment_notes" => treatment_notes,
});
history_record!(ChronicCondition);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disability_kind_uses_type_key() {
        let disability: Disability =
            serde_json::from_str(r#"{"user_id": 2, "name": "Low vision", "type": "impairment"}"#).unwrap();
        assert_eq!(disability.kind, DisabilityKind::Impairment);
        let json = serde_json::to_value(&disability).unwrap();
        assert_eq!(json["type"], "impairment");
    }

    #[test]
    fn unknown_severity_is_rejected() {
        let parsed = serde_json::from_str::<Allergy>(r#"{"user_id": 1, "severity": "extreme"}"#);
        assert!(parsed.is_err());
    }
}
