//! Shared types for the HTTP layer.

use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::composite::MissingRootPolicy;
use crate::core_state::CoreState;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }

    /// How prescription writes treat a missing visit.
    pub fn visit_policy(&self) -> MissingRootPolicy {
        if self.core.config.auto_create_visits {
            MissingRootPolicy::Synthesize
        } else {
            MissingRootPolicy::Reject
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Extractors and small response bodies
// ═══════════════════════════════════════════════════════════

/// `Json` whose rejections render as [`ApiError::BadRequest`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Path` whose rejections (non-numeric ids) render as [`ApiError::BadRequest`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// `{"message": "..."}` returned by deletes.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn deleted(entity: &str) -> Self {
        Self {
            message: format!("{entity} deleted successfully"),
        }
    }
}

/// Parse a numeric path segment. Non-numeric ids are a 400.
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::BadRequest("Invalid ID format".into()))
}
