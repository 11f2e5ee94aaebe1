//! Medication catalog endpoints, plus the catalog-side prescription flow.
//!
//! - `GET /api/medications/search?q=`: active catalog entries by name
//! - `GET /api/medications/:id`: one catalog entry
//! - `POST /api/medications/prescriptions`: strict prescription creation
//! - `GET /api/medications/prescriptions/:id`
//! - `GET /api/medications/prescriptions/user/:user_id`

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::find;
use crate::api::error::ApiError;
use crate::api::types::{parse_id, ApiContext, ApiJson, ApiPath};
use crate::composite::CompositeError;
use crate::db::repository::{get_prescription_detail, prescription_details_for_user, search_catalog, CATALOG_SEARCH_LIMIT};
use crate::models::{CatalogEntry, PrescriptionDetail};
use crate::prescriptions::{create_prescription_strict, CreatePrescriptionRequest};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// `GET /api/medications/search?q=`
pub async fn search(
    State(ctx): State<ApiContext>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<CatalogEntry>>, ApiError> {
    let term = query.q.unwrap_or_default();
    let term = term.trim();
    if term.is_empty() {
        return Err(ApiError::BadRequest("Search query is required".into()));
    }
    let conn = ctx.core.lock_db()?;
    Ok(Json(search_catalog(&conn, term, CATALOG_SEARCH_LIMIT)?))
}

/// `GET /api/medications/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    ApiPath(raw_id): ApiPath<String>,
) -> Result<Json<CatalogEntry>, ApiError> {
    let id = parse_id(&raw_id)?;
    let conn = ctx.core.lock_db()?;
    Ok(Json(find(&conn, id)?))
}

/// `POST /api/medications/prescriptions`: user, visit and date must all be
/// given and the user and visit must exist; nothing is created on the fly.
pub async fn create_prescription(
    State(ctx): State<ApiContext>,
    ApiJson(request): ApiJson<CreatePrescriptionRequest>,
) -> Result<(StatusCode, Json<PrescriptionDetail>), ApiError> {
    let conn = ctx.core.lock_db()?;
    let detail = create_prescription_strict(&conn, request).map_err(|err| match err {
        missing @ CompositeError::MissingReference { .. } => ApiError::BadRequest(missing.to_string()),
        other => other.into(),
    })?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// `GET /api/medications/prescriptions/:id`
pub async fn prescription(
    State(ctx): State<ApiContext>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<PrescriptionDetail>, ApiError> {
    let conn = ctx.core.lock_db()?;
    get_prescription_detail(&conn, id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Prescription"))
}

/// `GET /api/medications/prescriptions/user/:user_id`
pub async fn prescriptions_for_user(
    State(ctx): State<ApiContext>,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<Json<Vec<PrescriptionDetail>>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(prescription_details_for_user(&conn, user_id)?))
}
