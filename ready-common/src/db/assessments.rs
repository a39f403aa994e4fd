//! Assessment queries
//!
//! Every read and write is scoped `WHERE guid = ? AND user_guid = ?`, so a
//! request against another user's assessment is indistinguishable from a
//! request against a missing one. Assessments are never physically deleted.

use crate::db::models::{Assessment, AssessmentStatus, AssessmentSummary, ProgramInfo};
use crate::scoring::{ResponseMap, ScoreReport};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Create a new in-progress assessment, returning its guid
pub async fn create_assessment(
    db: &SqlitePool,
    user_guid: &str,
    program: &ProgramInfo,
) -> Result<String> {
    let guid = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO assessments (
            guid, user_guid, program_name, organization, program_level,
            target_audience, delivery_format, program_duration, assessor_role,
            status, responses, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'in_progress', '{}', ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(user_guid)
    .bind(&program.program_name)
    .bind(&program.organization)
    .bind(&program.program_level)
    .bind(serde_json::to_string(&program.target_audience)?)
    .bind(serde_json::to_string(&program.delivery_format)?)
    .bind(&program.program_duration)
    .bind(&program.assessor_role)
    .bind(now)
    .bind(now)
    .execute(db)
    .await?;

    Ok(guid)
}

/// List a user's assessments, most recently updated first
pub async fn list_for_user(db: &SqlitePool, user_guid: &str) -> Result<Vec<AssessmentSummary>> {
    let rows = sqlx::query(
        r#"
        SELECT guid, program_name, status, overall_score, created_at, updated_at, completed_at
        FROM assessments
        WHERE user_guid = ?
        ORDER BY updated_at DESC
        "#,
    )
    .bind(user_guid)
    .fetch_all(db)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(AssessmentSummary {
                guid: row.get("guid"),
                program_name: row.get("program_name"),
                status: parse_status(row)?,
                overall_score: row.get("overall_score"),
                created_at: row.get::<DateTime<Utc>, _>("created_at"),
                updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
                completed_at: row.get::<Option<DateTime<Utc>>, _>("completed_at"),
            })
        })
        .collect()
}

/// Fetch a full assessment owned by the given user.
///
/// Missing and not-owned both yield [`Error::NotFound`].
pub async fn fetch_owned(db: &SqlitePool, guid: &str, user_guid: &str) -> Result<Assessment> {
    let row = sqlx::query(
        r#"
        SELECT guid, user_guid, program_name, organization, program_level,
               target_audience, delivery_format, program_duration, assessor_role,
               status, current_category, responses,
               overall_score, category_scores, recommendations,
               created_at, updated_at, completed_at
        FROM assessments
        WHERE guid = ? AND user_guid = ?
        "#,
    )
    .bind(guid)
    .bind(user_guid)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| Error::NotFound("Assessment not found".to_string()))?;

    assessment_from_row(&row)
}

/// Merge newly submitted responses into an assessment at the
/// (category, question) leaf and bump `updated_at`.
pub async fn merge_assessment_responses(
    db: &SqlitePool,
    guid: &str,
    user_guid: &str,
    incoming: ResponseMap,
) -> Result<()> {
    let raw: String = sqlx::query_scalar(
        "SELECT responses FROM assessments WHERE guid = ? AND user_guid = ?",
    )
    .bind(guid)
    .bind(user_guid)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| Error::NotFound("Assessment not found".to_string()))?;

    let mut responses: ResponseMap = serde_json::from_str(&raw)?;
    crate::scoring::merge_responses(&mut responses, incoming);

    sqlx::query(
        "UPDATE assessments SET responses = ?, updated_at = ? WHERE guid = ? AND user_guid = ?",
    )
    .bind(serde_json::to_string(&responses)?)
    .bind(Utc::now())
    .bind(guid)
    .bind(user_guid)
    .execute(db)
    .await?;

    Ok(())
}

/// Persist a completion result. Safe to call repeatedly: the stored values
/// are whatever the latest scoring run produced.
pub async fn store_completion(
    db: &SqlitePool,
    guid: &str,
    user_guid: &str,
    report: &ScoreReport,
) -> Result<()> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        UPDATE assessments
        SET status = 'completed',
            overall_score = ?,
            category_scores = ?,
            recommendations = ?,
            completed_at = ?,
            updated_at = ?
        WHERE guid = ? AND user_guid = ?
        "#,
    )
    .bind(report.overall_score)
    .bind(serde_json::to_string(&report.category_scores)?)
    .bind(serde_json::to_string(&report.recommendations)?)
    .bind(now)
    .bind(now)
    .bind(guid)
    .bind(user_guid)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Assessment not found".to_string()));
    }
    Ok(())
}

fn assessment_from_row(row: &SqliteRow) -> Result<Assessment> {
    let category_scores = row
        .get::<Option<String>, _>("category_scores")
        .map(|raw| serde_json::from_str(&raw))
        .transpose()?;
    let recommendations = row
        .get::<Option<String>, _>("recommendations")
        .map(|raw| serde_json::from_str(&raw))
        .transpose()?;

    Ok(Assessment {
        guid: row.get("guid"),
        user_guid: row.get("user_guid"),
        program: ProgramInfo {
            program_name: row.get("program_name"),
            organization: row.get("organization"),
            program_level: row.get("program_level"),
            target_audience: serde_json::from_str(row.get::<String, _>("target_audience").as_str())?,
            delivery_format: serde_json::from_str(row.get::<String, _>("delivery_format").as_str())?,
            program_duration: row.get("program_duration"),
            assessor_role: row.get("assessor_role"),
        },
        status: parse_status(row)?,
        current_category: row.get("current_category"),
        responses: serde_json::from_str(row.get::<String, _>("responses").as_str())?,
        overall_score: row.get("overall_score"),
        category_scores,
        recommendations,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
        completed_at: row.get::<Option<DateTime<Utc>>, _>("completed_at"),
    })
}

fn parse_status(row: &SqliteRow) -> Result<AssessmentStatus> {
    let raw: String = row.get("status");
    AssessmentStatus::parse(&raw)
        .ok_or_else(|| Error::Internal(format!("Invalid assessment status in database: {}", raw)))
}
