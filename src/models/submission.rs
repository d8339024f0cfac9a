//! Task submission model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{timestamp, Task, TaskCategory};

/// A member's completion report for a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSubmission {
    pub id: String,
    pub task_id: String,
    pub submitter_id: String,
    /// Mirrors the category of the parent task
    pub submission_type: TaskCategory,
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_score: Option<i32>,
    #[serde(serialize_with = "timestamp::serialize")]
    pub submitted_at: DateTime<Utc>,
    #[serde(serialize_with = "timestamp::serialize")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    pub task_id: String,
    pub submitter_id: String,
    pub submission_type: TaskCategory,
    pub details: String,
    #[serde(serialize_with = "timestamp::serialize")]
    pub submitted_at: DateTime<Utc>,
}

/// Request body for submitting a completion report.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitTaskRequest {
    pub details: String,
}

/// Everything a completed submission produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub submission: TaskSubmission,
    pub task: Task,
    /// Advisory feedback; shown to the member, not stored on the submission
    pub feedback: String,
}
