//! ready-web library - HTTP service for readycheck
//!
//! Builds the axum router over shared application state. Routes split into a
//! protected group behind the identity middleware and a public group
//! (registration, login, catalog, health, UI shim).

use axum::{middleware, Router};
use ready_common::catalog::Catalog;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Question catalog, loaded once at startup and immutable afterwards
    pub catalog: Arc<Catalog>,
    /// Bearer token signing secret
    pub token_secret: String,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, catalog: Catalog, token_secret: String) -> Self {
        Self {
            db,
            catalog: Arc::new(catalog),
            token_secret,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post, put};

    // Protected routes (require an authenticated user)
    let protected = Router::new()
        .route("/api/auth/me", get(api::auth::current_user))
        .route(
            "/api/assessments",
            get(api::assessments::list_assessments).post(api::assessments::create_assessment),
        )
        .route("/api/assessments/:guid", get(api::assessments::get_assessment))
        .route(
            "/api/assessments/:guid/responses",
            put(api::assessments::update_responses),
        )
        .route(
            "/api/assessments/:guid/complete",
            post(api::assessments::complete_assessment),
        )
        .route("/api/analytics/summary", get(api::analytics::analytics_summary))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::middleware::require_auth,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/", get(api::ui::serve_index))
        .route("/api/auth/register", post(api::auth::register))
        .route("/api/auth/login", post(api::auth::login))
        .route("/api/auth/logout", post(api::auth::logout))
        .route("/api/categories", get(api::catalog::get_categories))
        .merge(api::health::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
