//! Question catalog endpoint

use axum::extract::State;
use axum::Json;
use ready_common::catalog::Catalog;

use crate::AppState;

/// GET /api/categories
///
/// Returns the full catalog document as loaded at startup.
pub async fn get_categories(State(state): State<AppState>) -> Json<Catalog> {
    Json(state.catalog.as_ref().clone())
}
