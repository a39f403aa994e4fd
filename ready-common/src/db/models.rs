//! Database models

use crate::scoring::{CategoryScore, Recommendation, ResponseMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A registered user (public profile; credential columns stay in the query layer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub guid: String,
    pub email: String,
    pub name: Option<String>,
    pub organization: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Assessment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    InProgress,
    Completed,
}

impl AssessmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentStatus::InProgress => "in_progress",
            AssessmentStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "in_progress" => Some(AssessmentStatus::InProgress),
            "completed" => Some(AssessmentStatus::Completed),
            _ => None,
        }
    }
}

/// Program metadata captured when an assessment is created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramInfo {
    pub program_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    pub program_level: String,
    #[serde(default)]
    pub target_audience: Vec<String>,
    #[serde(default)]
    pub delivery_format: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessor_role: Option<String>,
}

/// One self-assessment run, owned by exactly one user
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub guid: String,
    #[serde(skip_serializing)]
    pub user_guid: String,
    #[serde(flatten)]
    pub program: ProgramInfo,
    pub status: AssessmentStatus,
    pub current_category: i64,
    pub responses: ResponseMap,
    pub overall_score: Option<f64>,
    pub category_scores: Option<BTreeMap<String, CategoryScore>>,
    pub recommendations: Option<Vec<Recommendation>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Listing row for a user's assessments
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentSummary {
    pub guid: String,
    pub program_name: String,
    pub status: AssessmentStatus,
    pub overall_score: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Aggregate analytics over all users and assessments
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub total_users: i64,
    pub total_assessments: i64,
    pub completed_assessments: i64,
    /// Percentage of assessments completed, one decimal
    pub completion_rate: f64,
    /// Mean overall score across completed assessments, one decimal
    pub average_score: f64,
}
