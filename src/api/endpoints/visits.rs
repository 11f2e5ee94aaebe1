//! Visit endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use super::patch_record;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, ApiPath};
use crate::db::repository::{get_visit_detail, latest_visit_triage, load_visit_detail, visit_details_for_user};
use crate::models::{Triage, Visit, VisitDetail};
use crate::visits::{create_visit, CreateVisitRequest};

/// `POST /api/visits`: the visit and its optional triage in one write.
pub async fn create(
    State(ctx): State<ApiContext>,
    ApiJson(request): ApiJson<CreateVisitRequest>,
) -> Result<(StatusCode, Json<VisitDetail>), ApiError> {
    let conn = ctx.core.lock_db()?;
    let detail = create_visit(&conn, request)?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// `GET /api/visits/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<VisitDetail>, ApiError> {
    let conn = ctx.core.lock_db()?;
    get_visit_detail(&conn, id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Visit"))
}

/// `PUT /api/visits/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<Value>,
) -> Result<Json<VisitDetail>, ApiError> {
    let conn = ctx.core.lock_db()?;
    let visit: Visit = patch_record(&conn, id, patch, |visit: &Visit| {
        if visit.visit_type.trim().is_empty() {
            return Err("type is required".into());
        }
        Ok(())
    })?;
    Ok(Json(load_visit_detail(&conn, visit)?))
}

/// `GET /api/visits/user/:user_id`: newest first.
pub async fn for_user(
    State(ctx): State<ApiContext>,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<Json<Vec<VisitDetail>>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(visit_details_for_user(&conn, user_id)?))
}

/// `GET /api/visits/user/:user_id/latest-triage`
pub async fn latest_triage(
    State(ctx): State<ApiContext>,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<Json<Triage>, ApiError> {
    let conn = ctx.core.lock_db()?;
    latest_visit_triage(&conn, user_id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No triage data found".into()))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::super::test_support::{create_user, create_visit, send, test_app};

    #[tokio::test]
    async fn create_with_triage_backfills_visit_id() {
        let app = test_app();
        let uid = create_user(&app, "NID-V1").await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/visits",
            Some(json!({
                "user_id": uid,
                "type": "triage",
                "triage_data": {"heart_rate": 92, "temperature": 37.9, "blood_pressure": "120/80"}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["triage_data"]["visit_id"], body["id"]);
        assert_eq!(body["triage_data"]["status"], "completed");
        assert!(body["doctor_report"].is_null());
    }

    #[tokio::test]
    async fn create_rejects_missing_fields() {
        let app = test_app();
        let (status, body) = send(&app, "POST", "/api/visits", Some(json!({"type": "regular"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "user_id is required");

        let (status, _) = send(&app, "POST", "/api/visits", Some(json!({"user_id": 1}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_patient_is_422_and_writes_nothing() {
        let app = test_app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/visits",
            Some(json!({"user_id": 42, "type": "triage", "triage_data": {"heart_rate": 80}})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["message"], "User 42 does not exist");

        let (_, stats) = send(&app, "GET", "/api/stats", None).await;
        assert_eq!(stats["total_visits"], 0);
    }

    #[tokio::test]
    async fn update_to_unknown_patient_is_422() {
        let app = test_app();
        let uid = create_user(&app, "NID-V4").await;
        let vid = create_visit(&app, uid, "regular").await;

        let (status, body) = send(&app, "PUT", &format!("/api/visits/{vid}"), Some(json!({"user_id": 9999}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNRESOLVED_REFERENCE");
    }

    #[tokio::test]
    async fn detail_update_and_listing() {
        let app = test_app();
        let uid = create_user(&app, "NID-V2").await;
        let first = create_visit(&app, uid, "regular").await;
        let second = create_visit(&app, uid, "emergency").await;

        let (status, body) = send(&app, "GET", &format!("/api/visits/{first}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "regular");

        let (status, body) = send(&app, "PUT", &format!("/api/visits/{first}"), Some(json!({"type": "follow-up"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "follow-up");
        assert_eq!(body["user_id"], uid);

        let (_, list) = send(&app, "GET", &format!("/api/visits/user/{uid}"), None).await;
        let ids: Vec<i64> = list.as_array().unwrap().iter().map(|v| v["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![second, first]);

        let (status, _) = send(&app, "GET", "/api/visits/9999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn latest_triage_for_patient() {
        let app = test_app();
        let uid = create_user(&app, "NID-V3").await;
        let (status, _) = send(&app, "GET", &format!("/api/visits/user/{uid}/latest-triage"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        send(
            &app,
            "POST",
            "/api/visits",
            Some(json!({"user_id": uid, "type": "triage", "triage_data": {"pain_level": 3}})),
        )
        .await;
        let (status, body) = send(&app, "GET", &format!("/api/visits/user/{uid}/latest-triage"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pain_level"], 3);
    }
}
