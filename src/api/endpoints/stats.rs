//! Dashboard statistics.

use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository::{clinic_stats, ClinicStats};

/// `GET /api/stats`
pub async fn summary(State(ctx): State<ApiContext>) -> Result<Json<ClinicStats>, ApiError> {
    let conn = ctx.core.lock_db()?;
    Ok(Json(clinic_stats(&conn, Utc::now())?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::super::test_support::{create_user, send, test_app};

    #[tokio::test]
    async fn counts_reflect_writes() {
        let app = test_app();
        let uid = create_user(&app, "NID-STATS").await;
        send(
            &app,
            "POST",
            "/api/visits",
            Some(json!({"user_id": uid, "type": "triage", "triage_data": {"heart_rate": 70}})),
        )
        .await;

        let (status, body) = send(&app, "GET", "/api/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_patients"], 1);
        assert_eq!(body["total_visits"], 1);
        assert_eq!(body["today_visits"], 1);
        // Triage recorded with a visit is already completed.
        assert_eq!(body["pending_triage"], 0);
    }
}
