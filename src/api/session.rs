//! Session endpoint.

use axum::extract::State;
use chrono::Utc;

use super::{success, ApiResult};
use crate::auth::{self, Identity};
use crate::models::SessionInfo;
use crate::AppState;

/// POST /api/session - Resolve (or create) the caller's member record.
///
/// Never fails once the caller is identified; a store outage yields a degraded session.
pub async fn create_session(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<SessionInfo> {
    let session = auth::login(
        &state.repo,
        &identity,
        state.config.founder_user_id.as_deref(),
        Utc::now(),
    )
    .await;
    success(session)
}
