//! Analytics event log and aggregate summary
//!
//! The event table is append-only telemetry; rows are written and never read
//! back individually. The summary endpoint aggregates over users and
//! assessments directly.

use crate::db::models::AnalyticsSummary;
use crate::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

pub const EVENT_USER_REGISTERED: &str = "user_registered";
pub const EVENT_USER_LOGIN: &str = "user_login";
pub const EVENT_ASSESSMENT_STARTED: &str = "assessment_started";
pub const EVENT_ASSESSMENT_COMPLETED: &str = "assessment_completed";

/// Append one analytics event
pub async fn record_event(
    db: &SqlitePool,
    event_type: &str,
    user_guid: Option<&str>,
    assessment_guid: Option<&str>,
    event_data: Option<serde_json::Value>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO analytics_events (guid, event_type, user_guid, assessment_guid, event_data, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(event_type)
    .bind(user_guid)
    .bind(assessment_guid)
    .bind(event_data.map(|v| v.to_string()))
    .bind(Utc::now())
    .execute(db)
    .await?;

    Ok(())
}

/// Aggregate counts, completion rate and average score
pub async fn fetch_summary(db: &SqlitePool) -> Result<AnalyticsSummary> {
    let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(db)
        .await?;
    let total_assessments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assessments")
        .fetch_one(db)
        .await?;
    let completed_assessments: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM assessments WHERE status = 'completed'")
            .fetch_one(db)
            .await?;
    let average_score: Option<f64> = sqlx::query_scalar(
        "SELECT AVG(overall_score) FROM assessments WHERE status = 'completed'",
    )
    .fetch_one(db)
    .await?;

    let completion_rate = if total_assessments > 0 {
        completed_assessments as f64 / total_assessments as f64 * 100.0
    } else {
        0.0
    };

    Ok(AnalyticsSummary {
        total_users,
        total_assessments,
        completed_assessments,
        completion_rate: round1(completion_rate),
        average_score: round1(average_score.unwrap_or(0.0)),
    })
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
