//! Ask bar and AI interaction history.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use super::{parse_limit, success, tasks::LimitQuery, ApiResult};
use crate::assistant::AskOutcome;
use crate::auth::{require_founder, Identity};
use crate::models::AiInteraction;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub prompt: String,
}

/// POST /api/ask - Founder ask bar.
pub async fn ask(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<AskRequest>,
) -> ApiResult<AskOutcome> {
    let founder = require_founder(&state.repo, &identity).await?;
    let outcome = state
        .assistant
        .ask(&founder.auth_id, &request.prompt, Utc::now())
        .await?;
    success(outcome)
}

/// GET /api/interactions - Caller's own AI history, newest first.
pub async fn list_interactions(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Vec<AiInteraction>> {
    let limit = parse_limit(query.limit)?;
    let interactions = state
        .repo
        .list_interactions(&identity.user_id, limit)
        .await?;
    success(interactions)
}
