//! API endpoint handlers, one module per resource.
//!
//! The helpers below cover the read/update/delete shape most resources
//! share. Creates that touch more than one row go through the services in
//! `crate::visits`, `crate::prescriptions` and `crate::appointment`.

pub mod appointments;
pub mod health;
pub mod medical_history;
pub mod medications;
pub mod prescriptions;
pub mod reports;
pub mod stats;
pub mod triage;
pub mod users;
pub mod visits;

use chrono::Utc;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::MessageResponse;
use crate::composite::Record;
use crate::db::repository::{get_record, soft_delete, update_record};
use crate::db::{DatabaseError, Entity};

/// Keys a client can never overwrite.
const IMMUTABLE_KEYS: [&str; 4] = ["id", "created_at", "updated_at", "deleted_at"];

/// Fetch a live row or answer 404 `"{Entity} not found"`.
pub(crate) fn find<R: Entity>(conn: &Connection, id: i64) -> Result<R, ApiError> {
    get_record::<R>(conn, id)?.ok_or_else(|| ApiError::not_found(R::ENTITY))
}

/// Apply a partial JSON update to `existing`: keys present in `patch`
/// replace the stored value, everything else is kept.
pub(crate) fn merge_patch<R>(existing: &R, patch: Value) -> Result<R, ApiError>
where
    R: Serialize + DeserializeOwned,
{
    let Value::Object(changes) = patch else {
        return Err(ApiError::BadRequest("Request body must be a JSON object".into()));
    };
    let mut current = serde_json::to_value(existing).map_err(|e| ApiError::Internal(e.to_string()))?;
    let Some(fields) = current.as_object_mut() else {
        return Err(ApiError::Internal("record did not serialize to an object".into()));
    };
    for (key, value) in changes {
        if !IMMUTABLE_KEYS.contains(&key.as_str()) {
            fields.insert(key, value);
        }
    }
    fields.insert("updated_at".into(), serde_json::json!(Utc::now()));
    serde_json::from_value(current).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Load, merge, check and save. `check` sees the merged record before it is written.
pub(crate) fn patch_record<R, F>(conn: &Connection, id: i64, patch: Value, check: F) -> Result<R, ApiError>
where
    R: Entity + Serialize + DeserializeOwned,
    F: FnOnce(&R) -> Result<(), String>,
{
    let existing: R = find(conn, id)?;
    let merged = merge_patch(&existing, patch)?;
    check(&merged).map_err(ApiError::BadRequest)?;
    update_record(conn, &merged)?;
    Ok(merged)
}

pub(crate) fn delete_record<R: Record>(conn: &Connection, id: i64) -> Result<MessageResponse, ApiError> {
    match soft_delete::<R>(conn, id) {
        Ok(()) => Ok(MessageResponse::deleted(R::ENTITY)),
        Err(DatabaseError::NotFound { .. }) => Err(ApiError::not_found(R::ENTITY)),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::api::router::api_router;
    use crate::config::AppConfig;
    use crate::core_state::CoreState;

    pub fn test_app() -> Router {
        test_app_with(AppConfig::default())
    }

    pub fn test_app_with(config: AppConfig) -> Router {
        api_router(Arc::new(CoreState::in_memory(config).unwrap()))
    }

    /// Send one request; the body is parsed as JSON (`Null` when empty).
    pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    pub async fn create_user(app: &Router, national_id: &str) -> i64 {
        let (status, body) = send(
            app,
            "POST",
            "/api/users",
            Some(serde_json::json!({
                "first_name": "Test",
                "last_name": "Patient",
                "national_id": national_id,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }

    pub async fn create_visit(app: &Router, user_id: i64, visit_type: &str) -> i64 {
        let (status, body) = send(
            app,
            "POST",
            "/api/visits",
            Some(serde_json::json!({"user_id": user_id, "type": visit_type})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }
}
