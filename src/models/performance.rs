//! Weekly performance snapshot for a member.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::timestamp;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceLog {
    pub id: String,
    pub member_id: String,
    pub week_number: u32,
    pub year: i32,
    pub tasks_assigned: u32,
    pub tasks_completed: u32,
    pub tasks_overdue: u32,
    pub completion_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(serialize_with = "timestamp::serialize")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPerformanceLog {
    pub member_id: String,
    pub week_number: u32,
    pub year: i32,
    pub tasks_assigned: u32,
    pub tasks_completed: u32,
    pub tasks_overdue: u32,
    pub completion_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Request body for recording a snapshot. Week and year default to the current ISO week.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePerformanceLogRequest {
    #[validate(length(min = 1))]
    pub member_id: String,
    #[serde(default)]
    #[validate(range(min = 1, max = 53))]
    pub week_number: Option<u32>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub tasks_assigned: u32,
    #[serde(default)]
    pub tasks_completed: u32,
    #[serde(default)]
    pub tasks_overdue: u32,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub completion_rate: f64,
    #[serde(default)]
    pub performance_score: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}
