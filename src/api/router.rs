//! API router.
//!
//! Every route is nested under `/api/`. Layers, outermost first:
//! CORS, then request logging.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderName, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints;
use crate::api::endpoints::medical_history;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::config::AppConfig;
use crate::core_state::CoreState;
use crate::models::{Allergy, ChronicCondition, Disability, HereditaryDisease, MedicalImage, Surgery};

/// Build the API router over shared state.
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

/// Any origin, no credentials, preflight cached for the configured time.
pub fn cors_layer(config: &AppConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::HEAD,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_LENGTH,
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers([header::CONTENT_LENGTH])
        .max_age(Duration::from_secs(config.cors_max_age_secs))
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    // Static segments ("pending", "upcoming", "search") win over `:id`.
    let users = Router::new()
        .route("/", post(endpoints::users::create).get(endpoints::users::list))
        .route(
            "/:id",
            get(endpoints::users::profile)
                .put(endpoints::users::update)
                .delete(endpoints::users::remove),
        )
        .route("/national-id/:national_id", get(endpoints::users::by_national_id));

    let visits = Router::new()
        .route("/", post(endpoints::visits::create))
        .route("/:id", get(endpoints::visits::detail).put(endpoints::visits::update))
        .route("/user/:user_id", get(endpoints::visits::for_user))
        .route("/user/:user_id/latest-triage", get(endpoints::visits::latest_triage));

    let triage = Router::new()
        .route("/", post(endpoints::triage::create))
        .route("/pending", get(endpoints::triage::pending))
        .route(
            "/:id",
            get(endpoints::triage::get)
                .put(endpoints::triage::update)
                .delete(endpoints::triage::remove),
        )
        .route("/visit/:visit_id", get(endpoints::triage::for_visit))
        .route("/user/:user_id/history", get(endpoints::triage::history))
        .route("/user/:user_id/latest", get(endpoints::triage::latest));

    let reports = Router::new()
        .route("/", post(endpoints::reports::create))
        .route(
            "/:id",
            get(endpoints::reports::get)
                .put(endpoints::reports::update)
                .delete(endpoints::reports::remove),
        )
        .route("/visit/:visit_id", get(endpoints::reports::for_visit))
        .route("/user/:user_id", get(endpoints::reports::for_user));

    let prescriptions = Router::new()
        .route("/", post(endpoints::prescriptions::create))
        .route(
            "/:id",
            get(endpoints::prescriptions::detail)
                .put(endpoints::prescriptions::update)
                .delete(endpoints::prescriptions::remove),
        )
        .route("/:id/medications", post(endpoints::prescriptions::add_item))
        .route(
            "/:id/medications/:medication_id",
            delete(endpoints::prescriptions::remove_item),
        )
        .route("/user/:user_id", get(endpoints::prescriptions::for_user));

    let medications = Router::new()
        .route("/search", get(endpoints::medications::search))
        .route("/prescriptions", post(endpoints::medications::create_prescription))
        .route("/prescriptions/:id", get(endpoints::medications::prescription))
        .route(
            "/prescriptions/user/:user_id",
            get(endpoints::medications::prescriptions_for_user),
        )
        .route("/:id", get(endpoints::medications::detail));

    let appointments = Router::new()
        .route("/", post(endpoints::appointments::create))
        .route("/upcoming", get(endpoints::appointments::upcoming))
        .route(
            "/:id",
            get(endpoints::appointments::get)
                .put(endpoints::appointments::update)
                .delete(endpoints::appointments::remove),
        )
        .route("/user/:user_id", get(endpoints::appointments::for_user));

    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/stats", get(endpoints::stats::summary))
        .nest("/users", users)
        .nest("/visits", visits)
        .nest("/triage", triage)
        .nest("/reports", reports)
        .nest("/prescriptions", prescriptions)
        .nest("/medications", medications)
        .nest("/appointments", appointments)
        .nest("/hereditary-diseases", medical_history::routes::<HereditaryDisease>())
        .nest("/disabilities", medical_history::routes::<Disability>())
        .nest("/medical-images", medical_history::routes::<MedicalImage>())
        .nest("/surgeries", medical_history::routes::<Surgery>())
        .nest("/allergies", medical_history::routes::<Allergy>())
        .nest("/chronic-conditions", medical_history::routes::<ChronicCondition>());

    let cors = cors_layer(&ctx.core.config);

    Router::new()
        .nest("/api", api)
        .with_state(ctx)
        // Layers (innermost first, outermost last):
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(cors)
}
