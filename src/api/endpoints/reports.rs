//! Doctor report (diagnosis) endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use super::{delete_record, find, patch_record};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, ApiPath, MessageResponse};
use crate::db::repository::{diagnoses_for_user, diagnosis_for_visit};
use crate::models::Diagnosis;
use crate::visits::record_diagnosis;

fn check(report: &Diagnosis) -> Result<(), String> {
    if report.diagnosis.trim().is_empty() {
        return Err("diagnosis is required".into());
    }
    Ok(())
}

/// `POST /api/reports`
pub async fn create(
    State(ctx): State<ApiContext>,
    ApiJson(report): ApiJson<Diagnosis>,
) -> Result<(StatusCode, Json<Diagnosis>), ApiError> {
    let conn = ctx.core.lock_db()?;
    let report = record_diagnosis(&conn, report)?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// `GET /api/reports/:id`
pub async fn get(State(ctx): State<ApiContext>, ApiPath(id): ApiPath<i64>) -> Result<Json<Diagnosis>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(find(&conn, id)?))
}

/// `PUT /api/reports/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<Value>,
) -> Result<Json<Diagnosis>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(patch_record(&conn, id, patch, check)?))
}

/// `DELETE /api/reports/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(delete_record::<Diagnosis>(&conn, id)?))
}

/// `GET /api/reports/visit/:visit_id`
pub async fn for_visit(
    State(ctx): State<ApiContext>,
    ApiPath(visit_id): ApiPath<i64>,
) -> Result<Json<Diagnosis>, ApiError> {
    let conn = ctx.core.lock_db()?;
    diagnosis_for_visit(&conn, visit_id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Diagnosis"))
}

/// `GET /api/reports/user/:user_id`: newest first.
pub async fn for_user(
    State(ctx): State<ApiContext>,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<Json<Vec<Diagnosis>>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(diagnoses_for_user(&conn, user_id)?))
}
