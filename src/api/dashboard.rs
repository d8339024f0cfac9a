//! Dashboard and status endpoints.
//!
//! Dashboards never fail on a persistence error: they answer with empty
//! collections and `degraded: true` so the UI can show a fallback notice.

use axum::extract::State;
use chrono::Utc;
use serde::Serialize;

use super::{success, ApiResult};
use crate::auth::{require_founder, Identity};
use crate::errors::AppError;
use crate::models::{Task, TaskStatus, TeamMember, TeamStatistics};
use crate::tasks::week::WeekStamp;
use crate::AppState;

/// Number of completed tasks shown on the member dashboard.
const RECENT_COMPLETED: usize = 10;

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDashboard {
    pub open_tasks: Vec<Task>,
    pub completed_tasks: Vec<Task>,
    /// Completed share of open plus recently completed tasks, in percent
    pub weekly_progress: u32,
    pub degraded: bool,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FounderDashboard {
    pub team: Vec<TeamMember>,
    pub week_number: u32,
    pub year: i32,
    pub weekly_tasks: Vec<Task>,
    pub statistics: TeamStatistics,
    pub degraded: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub database_available: bool,
}

/// GET /api/dashboard/member
pub async fn member_dashboard(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<MemberDashboard> {
    let dashboard = match load_member_dashboard(&state, &identity.user_id).await {
        Ok(dashboard) => dashboard,
        Err(e) => {
            tracing::warn!("Member dashboard degraded: {}", e);
            MemberDashboard {
                degraded: true,
                ..Default::default()
            }
        }
    };
    success(dashboard)
}

async fn load_member_dashboard(
    state: &AppState,
    user_id: &str,
) -> Result<MemberDashboard, AppError> {
    let open_tasks = state
        .tasks
        .tasks_for(user_id, &[TaskStatus::Pending, TaskStatus::InProgress])
        .await?;
    let completed_tasks = state
        .tasks
        .completed_tasks(user_id, Some(RECENT_COMPLETED))
        .await?;
    let weekly_progress = TeamStatistics::completion_rate(
        completed_tasks.len(),
        open_tasks.len() + completed_tasks.len(),
    );

    Ok(MemberDashboard {
        open_tasks,
        completed_tasks,
        weekly_progress,
        degraded: false,
    })
}

/// GET /api/dashboard/founder
pub async fn founder_dashboard(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<FounderDashboard> {
    let stamp = WeekStamp::of(Utc::now());

    // Only a role mismatch is an error; an unreachable store degrades
    match require_founder(&state.repo, &identity).await {
        Ok(_) => {}
        Err(e @ AppError::Forbidden(_)) => return Err(e),
        Err(e) => {
            tracing::warn!("Founder dashboard degraded: {}", e);
            return success(degraded_founder_dashboard(stamp));
        }
    }

    let dashboard = match load_founder_dashboard(&state, stamp).await {
        Ok(dashboard) => dashboard,
        Err(e) => {
            tracing::warn!("Founder dashboard degraded: {}", e);
            degraded_founder_dashboard(stamp)
        }
    };
    success(dashboard)
}

fn degraded_founder_dashboard(stamp: WeekStamp) -> FounderDashboard {
    FounderDashboard {
        week_number: stamp.week,
        year: stamp.year,
        degraded: true,
        ..Default::default()
    }
}

async fn load_founder_dashboard(
    state: &AppState,
    stamp: WeekStamp,
) -> Result<FounderDashboard, AppError> {
    let team = state.repo.list_team_members().await?;
    let weekly_tasks = state.tasks.weekly_tasks(stamp).await?;
    let statistics = state.repo.team_statistics().await?;

    Ok(FounderDashboard {
        team,
        week_number: stamp.week,
        year: stamp.year,
        weekly_tasks,
        statistics,
        degraded: false,
    })
}

/// GET /api/status - Persistence liveness.
pub async fn status(State(state): State<AppState>) -> ApiResult<StatusReport> {
    success(StatusReport {
        database_available: state.repo.is_available().await,
    })
}
