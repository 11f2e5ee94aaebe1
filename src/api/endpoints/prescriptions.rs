//! Prescription endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use super::{delete_record, patch_record};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, ApiPath, MessageResponse};
use crate::db::repository::{get_prescription_detail, get_record, load_prescription_detail, prescription_details_for_user};
use crate::models::{Medication, Prescription, PrescriptionDetail};
use crate::prescriptions::{add_medication, create_prescription, CreatePrescriptionRequest, PrescriptionItemInput};

/// `POST /api/prescriptions`: visit (reused or created), prescription and
/// medications in one write.
pub async fn create(
    State(ctx): State<ApiContext>,
    ApiJson(request): ApiJson<CreatePrescriptionRequest>,
) -> Result<(StatusCode, Json<PrescriptionDetail>), ApiError> {
    let policy = ctx.visit_policy();
    let conn = ctx.core.lock_db()?;
    let detail = create_prescription(&conn, request, policy)?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// `GET /api/prescriptions/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<PrescriptionDetail>, ApiError> {
    let conn = ctx.core.lock_db()?;
    get_prescription_detail(&conn, id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Prescription"))
}

/// `PUT /api/prescriptions/:id`: header fields only; medications have
/// their own routes.
pub async fn update(
    State(ctx): State<ApiContext>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<Value>,
) -> Result<Json<PrescriptionDetail>, ApiError> {
    let conn = ctx.core.lock_db()?;
    let prescription: Prescription = patch_record(&conn, id, patch, |_: &Prescription| Ok(()))?;
    Ok(Json(load_prescription_detail(&conn, prescription)?))
}

/// `DELETE /api/prescriptions/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(delete_record::<Prescription>(&conn, id)?))
}

/// `GET /api/prescriptions/user/:user_id`: newest first.
pub async fn for_user(
    State(ctx): State<ApiContext>,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<Json<Vec<PrescriptionDetail>>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(prescription_details_for_user(&conn, user_id)?))
}

/// `POST /api/prescriptions/:id/medications`
pub async fn add_item(
    State(ctx): State<ApiContext>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(item): ApiJson<PrescriptionItemInput>,
) -> Result<(StatusCode, Json<PrescriptionDetail>), ApiError> {
    let conn = ctx.core.lock_db()?;
    if get_record::<Prescription>(&conn, id)?.is_none() {
        return Err(ApiError::not_found("Prescription"));
    }
    let detail = add_medication(&conn, id, item)?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// `DELETE /api/prescriptions/:id/medications/:medication_id`
pub async fn remove_item(
    State(ctx): State<ApiContext>,
    ApiPath((id, medication_id)): ApiPath<(i64, i64)>,
) -> Result<Json<MessageResponse>, ApiError> {
    let conn = ctx.core.lock_db()?;
    match get_record::<Medication>(&conn, medication_id)? {
        Some(medication) if medication.prescription_id == id => {
            Ok(Json(delete_record::<Medication>(&conn, medication_id)?))
        }
        _ => Err(ApiError::not_found("Medication")),
    }
}
