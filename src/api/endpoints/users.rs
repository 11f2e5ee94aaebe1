//! Patient endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use super::{delete_record, patch_record};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, ApiPath, MessageResponse};
use crate::db::repository::{get_user_by_national_id, insert_record, list_users, load_user_profile};
use crate::models::{RecordMeta, User, UserProfile};

/// `POST /api/users`
pub async fn create(
    State(ctx): State<ApiContext>,
    ApiJson(mut user): ApiJson<User>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    user.validate().map_err(ApiError::BadRequest)?;
    user.meta = RecordMeta::new();

    let conn = ctx.core.lock_db()?;
    insert_record(&conn, &mut user)?;
    tracing::info!(user_id = user.meta.id, "Patient registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /api/users`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<User>>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(list_users(&conn)?))
}

/// `GET /api/users/:id`: the patient with history and activity.
pub async fn profile(
    State(ctx): State<ApiContext>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<UserProfile>, ApiError> {
    let conn = ctx.core.lock_db()?;
    load_user_profile(&conn, id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("User"))
}

/// `GET /api/users/national-id/:national_id`
pub async fn by_national_id(
    State(ctx): State<ApiContext>,
    ApiPath(national_id): ApiPath<String>,
) -> Result<Json<User>, ApiError> {
    let conn = ctx.core.lock_db()?;
    get_user_by_national_id(&conn, &national_id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("User"))
}

/// `PUT /api/users/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<Value>,
) -> Result<Json<User>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(patch_record(&conn, id, patch, User::validate)?))
}

/// `DELETE /api/users/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(delete_record::<User>(&conn, id)?))
}
