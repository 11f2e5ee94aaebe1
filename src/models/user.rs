use serde::{Deserialize, Serialize};

use super::{
    Allergy, Appointment, ChronicCondition, Disability, HereditaryDisease, MedicalImage,
    Prescription, RecordMeta, Surgery, Visit,
};

/// A patient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    pub father_name: String,
    pub address: String,
    pub mobile_phone: String,
    pub landline_phone: String,
    pub emergency_contact1: String,
    pub emergency_contact2: String,
    pub height: f64,
    pub weight: f64,
    pub hair_color: String,
    pub eye_color: String,
    pub skin_color: String,
    pub blood_type: String,
    pub insurance: String,
}

record!(User in "users" as "User" {
    "first_name" => first_name,
    "last_name" => last_name,
    "national_id" => national_id,
    "father_name" => father_name,
    "address" => address,
    "mobile_phone" => mobile_phone,
    "landline_phone" => landline_phone,
    "emergency_contact1" => emergency_contact1,
    "emergency_contact2" => emergency_contact2,
    "height" => height,
    "weight" => weight,
    "hair_color" => hair_color,
    "eye_color" => eye_color,
    "skin_color" => skin_color,
    "blood_type" => blood_type,
    "insurance" => insurance,
});

impl User {
    pub fn new(first_name: &str, last_name: &str, national_id: &str) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            national_id: national_id.into(),
            ..Default::default()
        }
    }

    /// Names and national id are mandatory; measurements cannot be negative.
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("national_id", &self.national_id),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} is required"));
            }
        }
        if self.height < 0.0 || self.weight < 0.0 {
            return Err("height and weight must not be negative".into());
        }
        Ok(())
    }
}

/// A patient with their history and activity eager-loaded.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub visits: Vec<Visit>,
    pub prescriptions: Vec<Prescription>,
    pub appointments: Vec<Appointment>,
    pub hereditary_diseases: Vec<HereditaryDisease>,
    pub disabilities: Vec<Disability>,
    pub medical_images: Vec<MedicalImage>,
    pub surgeries: Vec<Surgery>,
    pub allergies: Vec<Allergy>,
    pub chronic_conditions: Vec<ChronicCondition>,
}
