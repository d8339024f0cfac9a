//! Task model and its state enums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

/// Recurrence kind of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Weekly,
    Custom,
    OneTime,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Weekly => "weekly",
            TaskType::Custom => "custom",
            TaskType::OneTime => "one_time",
        }
    }
}

/// Kind of work a task asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    GrantApplication,
    SponsorOutreach,
    PartnerContact,
    Research,
    Other,
}

impl TaskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::GrantApplication => "grant_application",
            TaskCategory::SponsorOutreach => "sponsor_outreach",
            TaskCategory::PartnerContact => "partner_contact",
            TaskCategory::Research => "research",
            TaskCategory::Other => "other",
        }
    }

    /// Human readable label, e.g. "grant application".
    pub fn label(&self) -> String {
        self.as_str().replacen('_', " ", 1)
    }
}

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    /// Declared but never assigned by any flow
    Overdue,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Overdue => "overdue",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TaskStatus::Pending),
            "in_progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            "overdue" => Some(TaskStatus::Overdue),
            _ => None,
        }
    }
}

/// A unit of work assigned to one member.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    /// External auth id of the member the task is assigned to
    pub assignee_id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub category: TaskCategory,
    pub status: TaskStatus,
    #[serde(serialize_with = "timestamp::serialize")]
    pub due_date: DateTime<Utc>,
    #[serde(serialize_with = "timestamp::serialize")]
    pub assigned_at: DateTime<Utc>,
    #[serde(
        default,
        serialize_with = "timestamp::serialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
    /// ISO-8601 week of assignment
    pub week_number: u32,
    /// Calendar year of assignment
    pub year: i32,
    /// Advisory text explaining why the task matters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub created_by: String,
    #[serde(serialize_with = "timestamp::serialize")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "timestamp::serialize")]
    pub updated_at: DateTime<Utc>,
}

/// Fields of a task record before the store assigns id and timestamps.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub assignee_id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub category: TaskCategory,
    pub status: TaskStatus,
    #[serde(serialize_with = "timestamp::serialize")]
    pub due_date: DateTime<Utc>,
    #[serde(serialize_with = "timestamp::serialize")]
    pub assigned_at: DateTime<Utc>,
    pub week_number: u32,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub created_by: String,
}

/// Partial task update; also the request body of the update endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<TaskCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(
        default,
        serialize_with = "timestamp::serialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        serialize_with = "timestamp::serialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_label_replaces_first_underscore() {
        assert_eq!(TaskCategory::GrantApplication.label(), "grant application");
        assert_eq!(TaskCategory::Other.label(), "other");
    }

    #[test]
    fn test_status_parse_matches_wire_names() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::Overdue,
        ] {
            assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
            assert_eq!(
                serde_json::to_value(status).unwrap(),
                serde_json::Value::String(status.as_str().to_string())
            );
        }
        assert_eq!(TaskStatus::parse("done"), None);
    }

    #[test]
    fn test_changes_skip_unset_fields() {
        let changes = TaskChanges {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        let json = serde_json::to_value(&changes).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "completed" }));
    }
}
