//! Member API endpoints (founder only).

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use validator::Validate;

use super::{error, success, ApiResult};
use crate::auth::{require_founder, Identity};
use crate::errors::AppError;
use crate::models::{
    CreateMemberRequest, MemberChanges, MemberStatus, NewMember, Role, TeamMember,
};
use crate::AppState;

/// GET /api/members - List team members that have not been removed.
pub async fn list_members(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<Vec<TeamMember>> {
    require_founder(&state.repo, &identity).await?;

    match state.repo.list_team_members().await {
        Ok(members) => success(members),
        Err(e) => error(e),
    }
}

/// POST /api/members - Add a member ahead of their first login.
pub async fn create_member(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<CreateMemberRequest>,
) -> ApiResult<TeamMember> {
    require_founder(&state.repo, &identity).await?;

    let request = CreateMemberRequest {
        name: request.name.trim().to_string(),
        email: request.email.trim().to_lowercase(),
    };
    if request.name.is_empty() || request.email.is_empty() {
        return error(AppError::Validation(
            "Name and email are required".to_string(),
        ));
    }
    request.validate()?;

    let now = Utc::now();
    let result = state
        .repo
        .create_member(&NewMember {
            auth_id: format!("member_{}", now.timestamp_millis()),
            email: request.email,
            name: request.name,
            role: Role::Member,
            status: MemberStatus::Active,
            joined_at: now,
            task_completion_streak: 0,
            missed_weeks: 0,
        })
        .await;

    match result {
        Ok(member) => {
            tracing::info!("Added member {} ({})", member.name, member.id);
            success(member)
        }
        Err(e) => error(e),
    }
}

/// PATCH /api/members/{id} - Update status, streak or missed weeks.
pub async fn update_member(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(mut changes): Json<MemberChanges>,
) -> ApiResult<TeamMember> {
    require_founder(&state.repo, &identity).await?;

    if let Some(email) = changes.email.take() {
        let email = email.trim().to_lowercase();
        if !validator::ValidateEmail::validate_email(&email) {
            return error(AppError::Validation("Invalid fields: email".to_string()));
        }
        changes.email = Some(email);
    }
    if changes.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return error(AppError::Validation("Name cannot be empty".to_string()));
    }

    match state.repo.update_member(&id, &changes).await {
        Ok(member) => success(member),
        Err(e) => error(e),
    }
}

/// DELETE /api/members/{id} - Soft-remove a member.
pub async fn remove_member(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<TeamMember> {
    require_founder(&state.repo, &identity).await?;

    match state.repo.get_member(&id).await {
        Ok(Some(member)) if member.is_founder() => {
            return error(AppError::Validation(
                "The founder cannot be removed".to_string(),
            ));
        }
        Ok(Some(_)) => {}
        Ok(None) => return error(AppError::NotFound(format!("Member {} not found", id))),
        Err(e) => return error(e),
    }

    match state.repo.remove_member(&id).await {
        Ok(member) => {
            tracing::info!("Removed member {}", member.id);
            success(member)
        }
        Err(e) => error(e),
    }
}
