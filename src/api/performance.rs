//! Performance log endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use validator::Validate;

use super::{parse_limit, success, tasks::LimitQuery, ApiResult};
use crate::auth::{require_founder, Identity};
use crate::models::{CreatePerformanceLogRequest, NewPerformanceLog, PerformanceLog};
use crate::tasks::week::WeekStamp;
use crate::AppState;

/// POST /api/performance - Record a weekly snapshot (founder).
pub async fn create_performance_log(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<CreatePerformanceLogRequest>,
) -> ApiResult<PerformanceLog> {
    require_founder(&state.repo, &identity).await?;
    request.validate()?;

    let current = WeekStamp::of(Utc::now());
    let log = state
        .repo
        .create_performance_log(&NewPerformanceLog {
            member_id: request.member_id,
            week_number: request.week_number.unwrap_or(current.week),
            year: request.year.unwrap_or(current.year),
            tasks_assigned: request.tasks_assigned,
            tasks_completed: request.tasks_completed,
            tasks_overdue: request.tasks_overdue,
            completion_rate: request.completion_rate,
            performance_score: request.performance_score,
            notes: request.notes,
        })
        .await?;
    success(log)
}

/// GET /api/performance/{member_id} - Snapshots for a member, latest week first.
///
/// Members may read their own; anyone else needs the founder role.
pub async fn list_performance_logs(
    State(state): State<AppState>,
    identity: Identity,
    Path(member_id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Vec<PerformanceLog>> {
    if member_id != identity.user_id {
        require_founder(&state.repo, &identity).await?;
    }
    let limit = parse_limit(query.limit)?;
    let logs = state.repo.list_performance_logs(&member_id, limit).await?;
    success(logs)
}
