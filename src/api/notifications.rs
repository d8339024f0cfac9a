//! Notification endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use super::{success, ApiResult};
use crate::auth::{require_founder, Identity};
use crate::errors::AppError;
use crate::models::{CreateNotificationRequest, NewNotification, Notification};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
}

/// POST /api/notifications - Send a notification to a member (founder).
pub async fn send_notification(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<CreateNotificationRequest>,
) -> ApiResult<Notification> {
    require_founder(&state.repo, &identity).await?;
    request.validate()?;

    let notification = state
        .repo
        .create_notification(&NewNotification {
            user_id: request.user_id,
            notification_type: request.notification_type,
            title: request.title,
            message: request.message,
            is_read: false,
            priority: request.priority,
        })
        .await?;
    success(notification)
}

/// GET /api/notifications - Caller's notifications, newest first.
pub async fn list_notifications(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<NotificationQuery>,
) -> ApiResult<Vec<Notification>> {
    let notifications = state
        .repo
        .list_notifications(&identity.user_id, query.unread_only)
        .await?;
    success(notifications)
}

/// POST /api/notifications/{id}/read
pub async fn mark_notification_read(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ApiResult<Notification> {
    let notification = state
        .repo
        .get_notification(&id)
        .await?
        .filter(|n| n.user_id == identity.user_id)
        .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))?;

    if notification.is_read {
        return success(notification);
    }

    let notification = state
        .repo
        .mark_notification_read(&notification.id, Utc::now())
        .await?;
    success(notification)
}
