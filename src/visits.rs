//! Visit intake: a visit and its optional triage reading, written as one unit.
//!
//! The triage reading is a child of the visit: it gets the visit's id and
//! never exists without it. Stand-alone triage and doctor reports attach to
//! an existing visit through the same writer.

use rusqlite::Connection;
use serde::Deserialize;

use crate::composite::{CompositeError, CompositeWriter, RootInput};
use crate::db::repository::load_visit_detail;
use crate::db::store::SqliteStore;
use crate::models::{Diagnosis, RecordMeta, Triage, TriageStatus, User, Visit, VisitDetail, DEFAULT_PRIORITY};

// ─── Types ────────────────────────────────────────────────────────────────────

/// `POST /api/visits` payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateVisitRequest {
    pub user_id: i64,
    #[serde(rename = "type")]
    pub visit_type: String,
    pub triage_data: Option<TriageInput>,
}

/// Vitals captured with a visit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TriageInput {
    pub heart_rate: i64,
    pub blood_pressure: String,
    pub temperature: f64,
    pub respiratory_rate: i64,
    pub oxygen_saturation: i64,
    pub pain_level: i64,
    pub symptoms: String,
    pub priority_level: Option<String>,
}

impl TriageInput {
    fn into_triage(self, status: TriageStatus) -> Triage {
        Triage {
            meta: RecordMeta::new(),
            visit_id: 0,
            heart_rate: self.heart_rate,
            blood_pressure: self.blood_pressure,
            temperature: self.temperature,
            respiratory_rate: self.respiratory_rate,
            oxygen_saturation: self.oxygen_saturation,
            pain_level: self.pain_level,
            symptoms: self.symptoms,
            priority_level: self
                .priority_level
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
            status,
        }
    }
}

impl CreateVisitRequest {
    /// Validate and split into the visit root and its triage children.
    /// Nothing is written when this fails.
    pub fn into_parts(self) -> Result<(Visit, Vec<Triage>), CompositeError> {
        if self.user_id <= 0 {
            return Err(CompositeError::Validation("user_id is required".into()));
        }
        let visit_type = self.visit_type.trim();
        if visit_type.is_empty() {
            return Err(CompositeError::Validation("type is required".into()));
        }

        let triage: Vec<Triage> = self
            .triage_data
            .map(|input| input.into_triage(TriageStatus::Completed))
            .into_iter()
            .collect();
        for reading in &triage {
            reading.validate().map_err(CompositeError::Validation)?;
        }

        Ok((Visit::new(self.user_id, visit_type), triage))
    }
}

// ─── Writes ───────────────────────────────────────────────────────────────────

/// Create a visit and, when supplied, its triage reading in one transaction.
pub fn create_visit(conn: &Connection, request: CreateVisitRequest) -> Result<VisitDetail, CompositeError> {
    let (visit, triage) = request.into_parts()?;

    let mut store = SqliteStore::new(conn);
    let (visit, triage) = CompositeWriter::new(&mut store).run(|scope| {
        scope.require::<User>(visit.user_id)?;
        let visit = scope.insert_root(visit)?;
        let triage = scope.insert_children(visit.meta.id, triage)?;
        Ok((visit, triage))
    })?;

    tracing::info!(
        visit_id = visit.meta.id,
        user_id = visit.user_id,
        with_triage = !triage.is_empty(),
        "Visit created"
    );
    Ok(load_visit_detail(conn, visit)?)
}

/// Attach a triage reading to an existing visit.
pub fn record_triage(conn: &Connection, mut triage: Triage) -> Result<Triage, CompositeError> {
    triage.validate().map_err(CompositeError::Validation)?;
    triage.meta = RecordMeta::new();

    let mut store = SqliteStore::new(conn);
    let written = CompositeWriter::new(&mut store)
        .write::<Visit, Triage>(RootInput::Existing(triage.visit_id), vec![triage])?;
    written
        .children
        .into_iter()
        .next()
        .ok_or_else(|| CompositeError::Validation("triage reading was not written".into()))
}

/// Attach a doctor report to an existing visit.
pub fn record_diagnosis(conn: &Connection, mut report: Diagnosis) -> Result<Diagnosis, CompositeError> {
    if report.diagnosis.trim().is_empty() {
        return Err(CompositeError::Validation("diagnosis is required".into()));
    }
    report.meta = RecordMeta::new();

    let mut store = SqliteStore::new(conn);
    let written = CompositeWriter::new(&mut store)
        .write::<Visit, Diagnosis>(RootInput::Existing(report.visit_id), vec![report])?;
    written
        .children
        .into_iter()
        .next()
        .ok_or_else(|| CompositeError::Validation("doctor report was not written".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{get_visit_detail, insert_record};
    use crate::db::sqlite::open_memory_database;

    fn setup() -> (Connection, i64) {
        let conn = open_memory_database().unwrap();
        let mut user = User::new("Yara", "Sleiman", "NID-VS");
        insert_record(&conn, &mut user).unwrap();
        (conn, user.meta.id)
    }

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn creates_visit_with_completed_triage() {
        let (conn, uid) = setup();
        let detail = create_visit(
            &conn,
            CreateVisitRequest {
                user_id: uid,
                visit_type: "triage".into(),
                triage_data: Some(TriageInput {
                    heart_rate: 88,
                    blood_pressure: "130/85".into(),
                    temperature: 38.2,
                    symptoms: "fever".into(),
                    ..Default::default()
                }),
            },
        )
        .unwrap();

        let triage = detail.triage_data.unwrap();
        assert_eq!(triage.visit_id, detail.visit.meta.id);
        assert_eq!(triage.status, TriageStatus::Completed);
        assert_eq!(triage.priority_level, "normal");
        assert_eq!(triage.temperature, 38.2);
        assert!(detail.doctor_report.is_none());

        let reloaded = get_visit_detail(&conn, detail.visit.meta.id).unwrap().unwrap();
        assert_eq!(reloaded.triage_data.unwrap().symptoms, "fever");
    }

    #[test]
    fn creates_visit_without_triage() {
        let (conn, uid) = setup();
        let detail = create_visit(
            &conn,
            CreateVisitRequest {
                user_id: uid,
                visit_type: "regular".into(),
                triage_data: None,
            },
        )
        .unwrap();
        assert!(detail.triage_data.is_none());
        assert_eq!(count(&conn, "visits"), 1);
        assert_eq!(count(&conn, "triages"), 0);
    }

    #[test]
    fn validation_runs_before_any_write() {
        let (conn, uid) = setup();
        let missing_type = create_visit(&conn, CreateVisitRequest { user_id: uid, ..Default::default() });
        assert!(matches!(missing_type, Err(CompositeError::Validation(m)) if m == "type is required"));

        let bad_vitals = create_visit(
            &conn,
            CreateVisitRequest {
                user_id: uid,
                visit_type: "triage".into(),
                triage_data: Some(TriageInput { pain_level: 42, ..Default::default() }),
            },
        );
        assert!(matches!(bad_vitals, Err(CompositeError::Validation(_))));
        assert_eq!(count(&conn, "visits"), 0);
    }

    #[test]
    fn unknown_patient_is_a_reference_error() {
        let (conn, _) = setup();
        let err = create_visit(
            &conn,
            CreateVisitRequest {
                user_id: 999,
                visit_type: "regular".into(),
                triage_data: Some(TriageInput::default()),
            },
        )
        .unwrap_err();
        assert!(matches!(err, CompositeError::MissingReference { entity: "User", id: 999 }));
        assert_eq!(count(&conn, "visits"), 0);
        assert_eq!(count(&conn, "triages"), 0);
    }

    #[test]
    fn triage_attaches_to_existing_visit_only() {
        let (conn, uid) = setup();
        let mut visit = Visit::new(uid, "triage");
        insert_record(&conn, &mut visit).unwrap();

        let written = record_triage(&conn, Triage { visit_id: visit.meta.id, heart_rate: 70, ..Default::default() }).unwrap();
        assert!(written.meta.id > 0);
        assert_eq!(written.status, TriageStatus::Pending);

        let err = record_triage(&conn, Triage { visit_id: 555, ..Default::default() }).unwrap_err();
        assert!(matches!(err, CompositeError::MissingReference { entity: "Visit", .. }));
    }

    #[test]
    fn diagnosis_requires_text_and_visit() {
        let (conn, uid) = setup();
        let mut visit = Visit::new(uid, "regular");
        insert_record(&conn, &mut visit).unwrap();

        assert!(matches!(
            record_diagnosis(&conn, Diagnosis { visit_id: visit.meta.id, ..Default::default() }),
            Err(CompositeError::Validation(_))
        ));
        let report = record_diagnosis(
            &conn,
            Diagnosis { visit_id: visit.meta.id, diagnosis: "Bronchitis".into(), ..Default::default() },
        )
        .unwrap();
        assert_eq!(report.visit_id, visit.meta.id);
    }
}
