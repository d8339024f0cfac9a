//! Leave request endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use super::{error, success, ApiResult};
use crate::auth::{require_founder, Identity};
use crate::errors::AppError;
use crate::models::{
    CreateLeaveRequest, LeaveChanges, LeaveRequest, LeaveStatus, NewLeaveRequest,
    ProcessLeaveRequest,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LeaveQuery {
    pub status: Option<LeaveStatus>,
}

/// POST /api/leave - File a leave request for the caller.
pub async fn create_leave_request(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<CreateLeaveRequest>,
) -> ApiResult<LeaveRequest> {
    if request.end_date < request.start_date {
        return error(AppError::Validation(
            "End date must not precede start date".to_string(),
        ));
    }

    let leave = state
        .repo
        .create_leave_request(&NewLeaveRequest {
            requester_id: identity.user_id,
            reason: request.reason,
            description: request.description.filter(|d| !d.trim().is_empty()),
            start_date: request.start_date,
            end_date: request.end_date,
            status: LeaveStatus::Pending,
            requested_at: Utc::now(),
        })
        .await?;
    success(leave)
}

/// GET /api/leave/mine - Caller's own requests.
pub async fn my_leave_requests(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<Vec<LeaveRequest>> {
    let requests = state
        .repo
        .list_leave_requests(Some(&identity.user_id), None)
        .await?;
    success(requests)
}

/// GET /api/leave - All requests, optionally filtered by status (founder).
pub async fn list_leave_requests(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<LeaveQuery>,
) -> ApiResult<Vec<LeaveRequest>> {
    require_founder(&state.repo, &identity).await?;
    let requests = state.repo.list_leave_requests(None, query.status).await?;
    success(requests)
}

/// PATCH /api/leave/{id} - Approve or deny a request (founder).
pub async fn process_leave_request(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(request): Json<ProcessLeaveRequest>,
) -> ApiResult<LeaveRequest> {
    let founder = require_founder(&state.repo, &identity).await?;

    if state.repo.get_leave_request(&id).await?.is_none() {
        return error(AppError::NotFound(format!(
            "Leave request {} not found",
            id
        )));
    }

    let changes = LeaveChanges {
        status: Some(request.status),
        approved_by: Some(founder.auth_id),
        approval_notes: request.notes,
        processed_at: None,
    };
    let leave = state
        .repo
        .update_leave_request(&id, changes, Utc::now())
        .await?;

    tracing::info!("Leave request {} {}", leave.id, leave.status.as_str());
    success(leave)
}
