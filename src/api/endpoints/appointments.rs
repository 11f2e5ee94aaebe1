//! Appointment endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde_json::Value;

use super::{delete_record, find, merge_patch};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, ApiPath, MessageResponse};
use crate::appointment::{book_appointment, reschedule, AppointmentRequest};
use crate::db::repository::{future_appointments_for_user, upcoming_appointments};
use crate::models::{Appointment, AppointmentWithPatient};

/// `POST /api/appointments`
pub async fn create(
    State(ctx): State<ApiContext>,
    ApiJson(request): ApiJson<AppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let conn = ctx.core.lock_db()?;
    let appointment = book_appointment(&conn, request)?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// `GET /api/appointments/:id`
pub async fn get(State(ctx): State<ApiContext>, ApiPath(id): ApiPath<i64>) -> Result<Json<Appointment>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(find(&conn, id)?))
}

/// `PUT /api/appointments/:id`: the resulting date may not be in the past.
pub async fn update(
    State(ctx): State<ApiContext>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<Value>,
) -> Result<Json<Appointment>, ApiError> {
    let conn = ctx.core.lock_db()?;
    let existing: Appointment = find(&conn, id)?;
    let merged = merge_patch(&existing, patch)?;
    Ok(Json(reschedule(&conn, merged)?))
}

/// `DELETE /api/appointments/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(delete_record::<Appointment>(&conn, id)?))
}

/// `GET /api/appointments/user/:user_id`: future only, soonest first.
pub async fn for_user(
    State(ctx): State<ApiContext>,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(future_appointments_for_user(&conn, user_id, Utc::now())?))
}

/// `GET /api/appointments/upcoming`
pub async fn upcoming(State(ctx): State<ApiContext>) -> Result<Json<Vec<AppointmentWithPatient>>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(upcoming_appointments(&conn, Utc::now())?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use serde_json::json;

    use super::super::test_support::{create_user, send, test_app};

    #[tokio::test]
    async fn booking_rules() {
        let app = test_app();
        let uid = create_user(&app, "NID-A1").await;

        let past = Utc::now() - Duration::days(1);
        let (status, body) = send(&app, "POST", "/api/appointments", Some(json!({"user_id": uid, "date": past}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Cannot schedule appointment in the past");

        let soon = Utc::now() + Duration::days(3);
        let (status, body) = send(
            &app,
            "POST",
            "/api/appointments",
            Some(json!({"user_id": uid, "date": soon, "type": "checkup"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "scheduled");
        let aid = body["id"].as_i64().unwrap();

        let (status, body) = send(&app, "PUT", &format!("/api/appointments/{aid}"), Some(json!({"date": past}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/appointments/{aid}"),
            Some(json!({"status": "cancelled"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "cancelled");
        assert_eq!(body["type"], "checkup");
    }

    #[tokio::test]
    async fn update_to_unknown_patient_is_422() {
        let app = test_app();
        let uid = create_user(&app, "NID-A4").await;
        let date = Utc::now() + Duration::days(2);
        let (_, created) = send(&app, "POST", "/api/appointments", Some(json!({"user_id": uid, "date": date}))).await;
        let aid = created["id"].as_i64().unwrap();

        let (status, body) = send(&app, "PUT", &format!("/api/appointments/{aid}"), Some(json!({"user_id": 9999}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "UNRESOLVED_REFERENCE");
    }

    #[tokio::test]
    async fn listings_show_future_only() {
        let app = test_app();
        let uid = create_user(&app, "NID-A2").await;
        for days in [5, 1] {
            let date = Utc::now() + Duration::days(days);
            send(&app, "POST", "/api/appointments", Some(json!({"user_id": uid, "date": date}))).await;
        }

        let (_, mine) = send(&app, "GET", &format!("/api/appointments/user/{uid}"), None).await;
        let mine = mine.as_array().unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine[0]["date"].as_str().unwrap() < mine[1]["date"].as_str().unwrap());

        let (status, upcoming) = send(&app, "GET", "/api/appointments/upcoming", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(upcoming[0]["user"]["national_id"], "NID-A2");

        let aid = mine[0]["id"].as_i64().unwrap();
        let (status, _) = send(&app, "DELETE", &format!("/api/appointments/{aid}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "GET", &format!("/api/appointments/{aid}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_patient_is_422() {
        let app = test_app();
        let date = Utc::now() + Duration::days(1);
        let (status, _) = send(&app, "POST", "/api/appointments", Some(json!({"user_id": 88, "date": date}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
