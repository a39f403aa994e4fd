//! Assessment CRUD, response merging and completion handlers
//!
//! All routes here sit behind the identity middleware; the owning user comes
//! from request extensions and every query is scoped to it.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use ready_common::db::{analytics, assessments, Assessment, AssessmentSummary, ProgramInfo};
use ready_common::scoring::{score_assessment, ResponseMap, ScoreReport};
use ready_common::Error;
use serde::Serialize;
use tracing::info;

use crate::api::error::ApiResult;
use crate::api::middleware::AuthUser;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CreateAssessmentResponse {
    pub guid: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub message: String,
}

/// POST /api/assessments
pub async fn create_assessment(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(program): Json<ProgramInfo>,
) -> ApiResult<Json<CreateAssessmentResponse>> {
    if program.program_name.trim().is_empty() {
        return Err(Error::InvalidInput("Program name must not be empty".to_string()).into());
    }

    let guid = assessments::create_assessment(&state.db, &auth_user.user.guid, &program).await?;
    analytics::record_event(
        &state.db,
        analytics::EVENT_ASSESSMENT_STARTED,
        Some(&auth_user.user.guid),
        Some(&guid),
        None,
    )
    .await?;

    info!(
        "Assessment {} created for program '{}'",
        guid, program.program_name
    );

    Ok(Json(CreateAssessmentResponse {
        guid,
        message: "Assessment created".to_string(),
    }))
}

/// GET /api/assessments
pub async fn list_assessments(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<AssessmentSummary>>> {
    let listed = assessments::list_for_user(&state.db, &auth_user.user.guid).await?;
    Ok(Json(listed))
}

/// GET /api/assessments/:guid
pub async fn get_assessment(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(guid): Path<String>,
) -> ApiResult<Json<Assessment>> {
    let assessment = assessments::fetch_owned(&state.db, &guid, &auth_user.user.guid).await?;
    Ok(Json(assessment))
}

/// PUT /api/assessments/:guid/responses
///
/// Body is a partial responses map; entries merge into the stored map at the
/// (category, question) leaf, so answers absent from the body survive.
pub async fn update_responses(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(guid): Path<String>,
    Json(incoming): Json<ResponseMap>,
) -> ApiResult<Json<StatusMessage>> {
    assessments::merge_assessment_responses(&state.db, &guid, &auth_user.user.guid, incoming)
        .await?;
    Ok(Json(StatusMessage {
        message: "Responses saved".to_string(),
    }))
}

/// POST /api/assessments/:guid/complete
///
/// Scores the stored responses against the catalog and persists the result.
/// Pure recomputation: completing again with unchanged responses stores and
/// returns an identical report.
pub async fn complete_assessment(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(guid): Path<String>,
) -> ApiResult<Json<ScoreReport>> {
    let assessment = assessments::fetch_owned(&state.db, &guid, &auth_user.user.guid).await?;

    let report = score_assessment(&state.catalog, &assessment.responses);
    assessments::store_completion(&state.db, &guid, &auth_user.user.guid, &report).await?;

    analytics::record_event(
        &state.db,
        analytics::EVENT_ASSESSMENT_COMPLETED,
        Some(&auth_user.user.guid),
        Some(&guid),
        Some(serde_json::json!({ "overall_score": report.overall_score })),
    )
    .await?;

    info!(
        "Assessment {} completed with overall score {}",
        guid, report.overall_score
    );

    Ok(Json(report))
}
