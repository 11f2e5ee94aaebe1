//! Prescription intake.
//!
//! A prescription hangs off a visit and owns its medication lines. When the
//! request names no visit, or one that does not exist, the configured
//! [`MissingRootPolicy`] decides between creating a `prescription` visit on
//! the spot and rejecting the request. Either way the visit, the
//! prescription and every medication commit together.

use chrono::Utc;
use rusqlite::Connection;
use serde::Deserialize;

use crate::composite::{CompositeError, CompositeWriter, MissingRootPolicy, PersistedRoot, RootInput};
use crate::db::repository::{load_prescription_detail, require_record};
use crate::db::store::SqliteStore;
use crate::models::{
    positive_id, Medication, Prescription, PrescriptionDetail, PrescriptionStatus, RecordMeta, User, Visit,
};

/// Visit type used for visits created on behalf of a prescription.
pub const PRESCRIPTION_VISIT_TYPE: &str = "prescription";

// ─── Types ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreatePrescriptionRequest {
    pub user_id: i64,
    #[serde(deserialize_with = "positive_id")]
    pub visit_id: Option<i64>,
    #[serde(deserialize_with = "positive_id")]
    pub diagnosis_id: Option<i64>,
    pub notes: String,
    pub date: Option<String>,
    pub doctor_name: String,
    pub status: Option<PrescriptionStatus>,
    pub instructions: String,
    #[serde(alias = "medications")]
    pub items: Vec<PrescriptionItemInput>,
}

/// Names of a catalog medication, as the frontend nests them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MedicationRef {
    pub generic_name: String,
    pub brand_name: String,
}

/// One medication line. Names may come flat or nested under `medication`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PrescriptionItemInput {
    pub medication: Option<MedicationRef>,
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

impl PrescriptionItemInput {
    pub fn into_medication(self) -> Medication {
        let (generic_name, brand_name) = match self.medication {
            Some(named) => (
                pick(named.generic_name, self.generic_name),
                pick(named.brand_name, self.brand_name),
            ),
            None => (self.generic_name, self.brand_name),
        };
        Medication {
            meta: RecordMeta::new(),
            prescription_id: 0,
            generic_name,
            brand_name,
            form: self.form,
            strength: self.strength,
            dosage: self.dosage,
            frequency: self.frequency,
            duration: self.duration,
            instructions: self.instructions,
            category: self.category,
            quantity: self.quantity,
            description: self.description,
            side_effects: self.side_effects,
            interactions: self.interactions,
        }
    }
}

fn pick(preferred: String, fallback: String) -> String {
    if preferred.trim().is_empty() {
        fallback
    } else {
        preferred
    }
}

/// A validated prescription, ready to write.
#[derive(Debug, Clone)]
pub struct PrescriptionDraft {
    pub visit_id: Option<i64>,
    pub prescription: Prescription,
    pub medications: Vec<Medication>,
}

impl CreatePrescriptionRequest {
    pub fn validate(self) -> Result<PrescriptionDraft, CompositeError> {
        if self.user_id <= 0 {
            return Err(CompositeError::Validation("user_id is required".into()));
        }

        let medications: Vec<Medication> = self.items.into_iter().map(PrescriptionItemInput::into_medication).collect();
        for medication in &medications {
            medication.validate().map_err(CompositeError::Validation)?;
        }

        let date = self
            .date
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string());

        let prescription = Prescription {
            meta: RecordMeta::new(),
            user_id: self.user_id,
            visit_id: 0,
            diagnosis_id: self.diagnosis_id,
            notes: self.notes,
            date,
            doctor_name: self.doctor_name,
            status: self.status.unwrap_or_default(),
            instructions: self.instructions,
        };

        Ok(PrescriptionDraft {
            visit_id: self.visit_id,
            prescription,
            medications,
        })
    }

    /// Validation for the catalog endpoint: the visit and date must be given.
    pub fn validate_strict(self) -> Result<PrescriptionDraft, CompositeError> {
        if self.visit_id.is_none() {
            return Err(CompositeError::Validation("visit_id is required".into()));
        }
        if self.date.as_deref().map_or(true, |d| d.trim().is_empty()) {
            return Err(CompositeError::Validation("date is required".into()));
        }
        self.validate()
    }
}

// ─── Writes ───────────────────────────────────────────────────────────────────

/// A reused visit must belong to the prescription's patient.
fn check_visit_owner(conn: &Connection, visit_id: i64, user_id: i64) -> Result<(), CompositeError> {
    let visit: Visit = require_record(conn, visit_id)?;
    if visit.user_id != user_id {
        return Err(CompositeError::Validation(format!(
            "Visit {visit_id} belongs to another patient"
        )));
    }
    Ok(())
}

/// Write a validated draft: resolve the visit, then the prescription, then
/// its medications, all in one transaction.
pub fn write_prescription(
    conn: &Connection,
    draft: PrescriptionDraft,
    policy: MissingRootPolicy,
) -> Result<PrescriptionDetail, CompositeError> {
    let PrescriptionDraft {
        visit_id,
        prescription,
        medications,
    } = draft;
    let user_id = prescription.user_id;
    let root = RootInput::reference(visit_id, Visit::new(user_id, PRESCRIPTION_VISIT_TYPE), policy)?;

    let mut store = SqliteStore::new(conn);
    let (visit, prescription, medications) = CompositeWriter::new(&mut store).run(|scope| {
        scope.require::<User>(user_id)?;
        let visit = scope.resolve_root(root)?;
        if let PersistedRoot::Reused(visit_id) = visit {
            check_visit_owner(conn, visit_id, user_id)?;
        }
        let prescription = scope.insert_child(visit.id(), prescription)?;
        let medications = scope.insert_children(prescription.meta.id, medications)?;
        Ok((visit, prescription, medications))
    })?;

    tracing::info!(
        prescription_id = prescription.meta.id,
        visit_id = visit.id(),
        visit_created = visit.created().is_some(),
        medications = medications.len(),
        "Prescription created"
    );
    Ok(PrescriptionDetail {
        prescription,
        medications,
    })
}

pub fn create_prescription(
    conn: &Connection,
    request: CreatePrescriptionRequest,
    policy: MissingRootPolicy,
) -> Result<PrescriptionDetail, CompositeError> {
    let draft = request.validate()?;
    write_prescription(conn, draft, policy)
}

/// Catalog-side creation: visit and date are mandatory and the visit must exist.
pub fn create_prescription_strict(
    conn: &Connection,
    request: CreatePrescriptionRequest,
) -> Result<PrescriptionDetail, CompositeError> {
    let draft = request.validate_strict()?;
    write_prescription(conn, draft, MissingRootPolicy::Reject)
}

/// Append one medication to an existing prescription.
pub fn add_medication(
    conn: &Connection,
    prescription_id: i64,
    item: PrescriptionItemInput,
) -> Result<PrescriptionDetail, CompositeError> {
    let medication = item.into_medication();
    medication.validate().map_err(CompositeError::Validation)?;

    let mut store = SqliteStore::new(conn);
    CompositeWriter::new(&mut store)
        .write::<Prescription, Medication>(RootInput::Existing(prescription_id), vec![medication])?;

    let prescription = require_record::<Prescription>(conn, prescription_id)?;
    Ok(load_prescription_detail(conn, prescription)?)
}
