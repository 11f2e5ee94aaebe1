use serde::{Deserialize, Serialize};

use super::RecordMeta;
use crate::composite::ChildRecord;

/// One prescribed medication line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Medication {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub prescription_id: i64,
    pub generic_name: String,
    pub brand_name: String,
    pub form: String,
    pub strength: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
    pub instructions: String,
    pub category: String,
    pub quantity: i64,
    pub description: String,
    pub side_effects: String,
    pub interactions: String,
}

record!(Medication in "medications" as "Medication" {
    "prescription_id" => prescription_id,
    "generic_name" => generic_name,
    "brand_name" => brand_name,
    "form" => form,
    "strength" => strength,
    "dosage" => dosage,
    "frequency" => frequency,
    "duration" => duration,
    "instructions" => instructions,
    "category" => category,
    "quantity" => quantity,
    "description" => description,
    "side_effects" => side_effects,
    "interactions" => interactions,
});

impl ChildRecord for Medication {
    fn attach_to(&mut self, parent_id: i64) {
        self.prescription_id = parent_id;
    }
}

impl Medication {
    pub fn validate(&self) -> Result<(), String> {
        if self.generic_name.trim().is_empty() && self.brand_name.trim().is_empty() {
            return Err("medication needs a generic or brand name".into());
        }
        if self.quantity < 0 {
            return Err(format!("quantity for {} must not be negative", self.display_name()));
        }
        Ok(())
    }

    pub fn display_name(&self) -> &str {
        if self.generic_name.is_empty() {
            &self.brand_name
        } else {
            &self.generic_name
        }
    }
}

/// A formulary entry clinicians pick medications from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub meta: RecordMeta,
    pub generic_name: String,
    pub brand_name: String,
    pub form: String,
    pub strength: String,
    pub category: String,
    pub description: String,
    pub contra_indications: String,
    pub side_effects: String,
    pub interactions: String,
    pub manufacturer: String,
    pub active: bool,
}

record!(CatalogEntry in "medication_catalog" as "Medication" {
    "generic_name" => generic_name,
    "brand_name" => brand_name,
    "form" => form,
    "strength" => strength,
    "category" => category,
    "description" => description,
    "contra_indications" => contra_indications,
    "side_effects" => side_effects,
    "interactions" => interactions,
    "manufacturer" => manufacturer,
    "active" => active,
});
