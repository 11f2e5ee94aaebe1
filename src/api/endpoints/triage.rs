//! Triage endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use super::{delete_record, find, patch_record};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, ApiPath, MessageResponse};
use crate::db::repository::{latest_triage_visit, pending_triage, triage_for_visit, triage_history_for_user};
use crate::models::{LatestTriage, Triage};
use crate::visits::record_triage;

/// `POST /api/triage`: attach a reading to an existing visit.
pub async fn create(
    State(ctx): State<ApiContext>,
    ApiJson(triage): ApiJson<Triage>,
) -> Result<(StatusCode, Json<Triage>), ApiError> {
    let conn = ctx.core.lock_db()?;
    let triage = record_triage(&conn, triage)?;
    Ok((StatusCode::CREATED, Json(triage)))
}

/// `GET /api/triage/:id`
pub async fn get(State(ctx): State<ApiContext>, ApiPath(id): ApiPath<i64>) -> Result<Json<Triage>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(find(&conn, id)?))
}

/// `PUT /api/triage/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<Value>,
) -> Result<Json<Triage>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(patch_record(&conn, id, patch, Triage::validate)?))
}

/// `DELETE /api/triage/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(delete_record::<Triage>(&conn, id)?))
}

/// `GET /api/triage/visit/:visit_id`
pub async fn for_visit(
    State(ctx): State<ApiContext>,
    ApiPath(visit_id): ApiPath<i64>,
) -> Result<Json<Triage>, ApiError> {
    let conn = ctx.core.lock_db()?;
    triage_for_visit(&conn, visit_id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Triage"))
}

/// `GET /api/triage/user/:user_id/history`
pub async fn history(
    State(ctx): State<ApiContext>,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<Json<Vec<Triage>>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(triage_history_for_user(&conn, user_id)?))
}

/// `GET /api/triage/user/:user_id/latest`: reading of the newest triage visit.
pub async fn latest(
    State(ctx): State<ApiContext>,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<Json<LatestTriage>, ApiError> {
    let conn = ctx.core.lock_db()?;
    let (visit, triage) =
        latest_triage_visit(&conn, user_id)?.ok_or_else(|| ApiError::NotFound("No triage visit found".into()))?;
    let triage = triage.ok_or_else(|| ApiError::NotFound("No triage data for the latest triage visit".into()))?;
    Ok(Json(LatestTriage::new(visit.meta.id, visit.meta.created_at, triage)))
}

/// `GET /api/triage/pending`: oldest first.
pub async fn pending(State(ctx): State<ApiContext>) -> Result<Json<Vec<Triage>>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(pending_triage(&conn)?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::super::test_support::{create_user, create_visit, send, test_app};

    #[tokio::test]
    async fn standalone_triage_needs_existing_visit() {
        let app = test_app();
        let (status, body) = send(&app, "POST", "/api/triage", Some(json!({"visit_id": 77, "heart_rate": 60}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["message"], "Visit 77 does not exist");
    }

    #[tokio::test]
    async fn update_to_unknown_visit_is_422() {
        let app = test_app();
        let uid = create_user(&app, "NID-T3").await;
        let vid = create_visit(&app, uid, "triage").await;
        let (_, created) = send(&app, "POST", "/api/triage", Some(json!({"visit_id": vid}))).await;
        let tid = created["id"].as_i64().unwrap();

        let (status, body) = send(&app, "PUT", &format!("/api/triage/{tid}"), Some(json!({"visit_id": 9999}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNRESOLVED_REFERENCE");

        let (_, unchanged) = send(&app, "GET", &format!("/api/triage/{tid}"), None).await;
        assert_eq!(unchanged["visit_id"], vid);
    }

    #[tokio::test]
    async fn pending_queue_and_crud() {
        let app = test_app();
        let uid = create_user(&app, "NID-T1").await;
        let vid = create_visit(&app, uid, "triage").await;

        let (status, created) = send(&app, "POST", "/api/triage", Some(json!({"visit_id": vid, "heart_rate": 110}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "pending");
        let tid = created["id"].as_i64().unwrap();

        let (_, pending) = send(&app, "GET", "/api/triage/pending", None).await;
        assert_eq!(pending.as_array().unwrap().len(), 1);

        let (status, updated) = send(&app, "PUT", &format!("/api/triage/{tid}"), Some(json!({"status": "completed"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["heart_rate"], 110);

        let (_, pending) = send(&app, "GET", "/api/triage/pending", None).await;
        assert_eq!(pending, json!([]));

        let (status, _) = send(&app, "PUT", &format!("/api/triage/{tid}"), Some(json!({"pain_level": 20}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, by_visit) = send(&app, "GET", &format!("/api/triage/visit/{vid}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(by_visit["id"], tid);

        let (status, _) = send(&app, "DELETE", &format!("/api/triage/{tid}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "GET", &format!("/api/triage/{tid}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn latest_is_flattened_with_visit_fields() {
        let app = test_app();
        let uid = create_user(&app, "NID-T2").await;
        let (status, _) = send(&app, "GET", &format!("/api/triage/user/{uid}/latest"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, visit) = send(
            &app,
            "POST",
            "/api/visits",
            Some(json!({"user_id": uid, "type": "triage", "triage_data": {"symptoms": "cough"}})),
        )
        .await;

        let (status, body) = send(&app, "GET", &format!("/api/triage/user/{uid}/latest"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["visit_id"], visit["id"]);
        assert_eq!(body["created_at"], visit["created_at"]);
        assert_eq!(body["symptoms"], "cough");

        let (_, history) = send(&app, "GET", &format!("/api/triage/user/{uid}/history"), None).await;
        assert_eq!(history.as_array().unwrap().len(), 1);
    }
}
