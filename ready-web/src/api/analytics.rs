//! Aggregate analytics endpoint
//!
//! Aggregates are not a public surface: the route sits behind the identity
//! middleware like the rest of the assessment API.

use axum::extract::State;
use axum::{Extension, Json};
use ready_common::db::analytics::fetch_summary;
use ready_common::db::AnalyticsSummary;

use crate::api::error::ApiResult;
use crate::api::middleware::AuthUser;
use crate::AppState;

/// GET /api/analytics/summary
pub async fn analytics_summary(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthUser>,
) -> ApiResult<Json<AnalyticsSummary>> {
    let summary = fetch_summary(&state.db).await?;
    Ok(Json(summary))
}
