//! Medical-history endpoints.
//!
//! Six resources share one handler set, instantiated per record type by
//! [`routes`]: create, fetch, partial update, soft delete, list by patient.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;

use super::{delete_record, find, patch_record};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, ApiPath, MessageResponse};
use crate::composite::{CompositeError, CompositeWriter};
use crate::db::repository::list_for_user;
use crate::db::store::SqliteStore;
use crate::models::{HistoryRecord, RecordMeta, User};

fn check_owner<R: HistoryRecord>(record: &R) -> Result<(), String> {
    if record.user_id() <= 0 {
        return Err("user_id is required".into());
    }
    Ok(())
}

/// `POST /api/<resource>`
pub async fn create<R: HistoryRecord>(
    State(ctx): State<ApiContext>,
    ApiJson(mut record): ApiJson<R>,
) -> Result<(StatusCode, Json<R>), ApiError> {
    check_owner(&record).map_err(ApiError::BadRequest)?;
    *record.meta_mut() = RecordMeta::new();

    let conn = ctx.core.lock_db()?;
    let mut store = SqliteStore::new(&conn);
    let record = CompositeWriter::new(&mut store).run(|scope| -> Result<R, CompositeError> {
        scope.require::<User>(record.user_id())?;
        scope.insert_root(record)
    })?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /api/<resource>/:id`
pub async fn get_one<R: HistoryRecord>(
    State(ctx): State<ApiContext>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<R>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(find::<R>(&conn, id)?))
}

/// `PUT /api/<resource>/:id`
pub async fn update<R: HistoryRecord>(
    State(ctx): State<ApiContext>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<Value>,
) -> Result<Json<R>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(patch_record(&conn, id, patch, check_owner::<R>)?))
}

/// `DELETE /api/<resource>/:id`
pub async fn remove<R: HistoryRecord>(
    State(ctx): State<ApiContext>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(delete_record::<R>(&conn, id)?))
}

/// `GET /api/<resource>/user/:user_id`: oldest first.
pub async fn for_user<R: HistoryRecord>(
    State(ctx): State<ApiContext>,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<Json<Vec<R>>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(list_for_user::<R>(&conn, user_id)?))
}

/// The route set for one history resource, to be nested under its path.
pub fn routes<R: HistoryRecord>() -> Router<ApiContext> {
    Router::new()
        .route("/", post(create::<R>))
        .route("/:id", get(get_one::<R>).put(update::<R>).delete(remove::<R>))
        .route("/user/:user_id", get(for_user::<R>))
}
