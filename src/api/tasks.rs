//! Task API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use super::{error, parse_limit, success, ApiResult};
use crate::auth::{require_founder, Identity};
use crate::errors::AppError;
use crate::models::{
    SubmissionOutcome, SubmitTaskRequest, Task, TaskChanges, TaskStatus, TaskSubmission,
};
use crate::tasks::week::WeekStamp;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MyTasksQuery {
    /// Comma separated statuses; defaults to open tasks
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub week: Option<u32>,
    pub year: Option<i32>,
}

fn parse_statuses(raw: Option<&str>) -> Result<Vec<TaskStatus>, AppError> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Ok(vec![TaskStatus::Pending, TaskStatus::InProgress]);
    };
    raw.split(',')
        .map(|s| {
            TaskStatus::parse(s.trim())
                .ok_or_else(|| AppError::Validation(format!("Unknown task status: {}", s.trim())))
        })
        .collect()
}

/// GET /api/tasks/mine - Caller's tasks, soonest due first.
pub async fn my_tasks(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<MyTasksQuery>,
) -> ApiResult<Vec<Task>> {
    let statuses = parse_statuses(query.status.as_deref())?;
    let tasks = state.tasks.tasks_for(&identity.user_id, &statuses).await?;
    success(tasks)
}

/// GET /api/tasks/completed - Caller's completed tasks, most recent first.
pub async fn my_completed_tasks(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Vec<Task>> {
    let limit = parse_limit(query.limit)?;
    let tasks = state.tasks.completed_tasks(&identity.user_id, limit).await?;
    success(tasks)
}

/// GET /api/tasks/weekly - All tasks of a week; defaults to the current ISO week.
pub async fn weekly_tasks(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<WeekQuery>,
) -> ApiResult<Vec<Task>> {
    require_founder(&state.repo, &identity).await?;

    let current = WeekStamp::of(Utc::now());
    let stamp = WeekStamp {
        week: query.week.unwrap_or(current.week),
        year: query.year.unwrap_or(current.year),
    };
    if !(1..=53).contains(&stamp.week) {
        return error(AppError::Validation(
            "week must be between 1 and 53".to_string(),
        ));
    }

    let tasks = state.tasks.weekly_tasks(stamp).await?;
    success(tasks)
}

/// PATCH /api/tasks/{id} - Partial update.
pub async fn update_task(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(changes): Json<TaskChanges>,
) -> ApiResult<Task> {
    require_founder(&state.repo, &identity).await?;

    if changes.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return error(AppError::Validation("Title cannot be empty".to_string()));
    }

    let task = state.tasks.update_task(&id, changes, Utc::now()).await?;
    success(task)
}

/// DELETE /api/tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<()> {
    require_founder(&state.repo, &identity).await?;

    state.tasks.delete_task(&id).await?;
    tracing::info!("Deleted task {}", id);
    success(())
}

/// POST /api/tasks/{id}/submit - Submit a completion report.
pub async fn submit_task(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(request): Json<SubmitTaskRequest>,
) -> ApiResult<SubmissionOutcome> {
    let outcome = state
        .tasks
        .submit_completion(&identity.user_id, &id, &request.details, Utc::now())
        .await?;
    success(outcome)
}

/// GET /api/tasks/{id}/submissions - Visible to the assignee and the founder.
pub async fn task_submissions(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Vec<TaskSubmission>> {
    let task = state
        .repo
        .get_task(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task {} not found", id)))?;

    if task.assignee_id != identity.user_id {
        require_founder(&state.repo, &identity).await?;
    }

    let submissions = state.tasks.submissions(&task.id).await?;
    success(submissions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filter_parsing() {
        assert_eq!(
            parse_statuses(None).unwrap(),
            vec![TaskStatus::Pending, TaskStatus::InProgress]
        );
        assert_eq!(
            parse_statuses(Some("completed")).unwrap(),
            vec![TaskStatus::Completed]
        );
        assert_eq!(
            parse_statuses(Some("pending, overdue")).unwrap(),
            vec![TaskStatus::Pending, TaskStatus::Overdue]
        );
        assert!(matches!(
            parse_statuses(Some("pending,done")),
            Err(AppError::Validation(_))
        ));
    }
}
