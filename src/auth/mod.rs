//! Authentication module.
//!
//! Two layers: an optional pre-shared key guarding `/api/*` (constant-time
//! comparison), and the caller identity forwarded by the upstream auth
//! provider in `x-user-*` headers.

use axum::{
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use subtle::ConstantTimeEq;

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{MemberStatus, NewMember, Role, SessionInfo, TeamMember};

/// Header name for the API key.
pub const API_KEY_HEADER: &str = "x-api-key";
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_NAME_HEADER: &str = "x-user-name";

/// Display name given to members created at first login without a name.
pub const DEFAULT_MEMBER_NAME: &str = "New User";

/// PSK authentication layer function that takes the expected PSK as a parameter.
pub async fn psk_auth_layer(
    expected_psk: Option<String>,
    request: Request,
    next: Next,
) -> Response {
    // If no PSK is configured, allow all requests (dev mode)
    let Some(expected) = expected_psk else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    match provided {
        Some(provided_key) => {
            if constant_time_compare(&provided_key, &expected) {
                next.run(request).await
            } else {
                AppError::Unauthorized("Invalid API key".to_string()).into_response()
            }
        }
        None => {
            // Also accept the key as a bearer token
            let bearer = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
                .map(|s| s.to_string());

            match bearer {
                Some(bearer_key) if constant_time_compare(&bearer_key, &expected) => {
                    next.run(request).await
                }
                _ => AppError::Unauthorized("Missing or invalid API key".to_string())
                    .into_response(),
            }
        }
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// The signed-in caller, as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// External auth id
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl Identity {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let header = |name: &str| {
            // Display names may be UTF-8, which `to_str` rejects
            headers
                .get(name)
                .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let user_id = header(USER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized("Sign in required".to_string()))?;

        Ok(Self {
            user_id,
            email: header(USER_EMAIL_HEADER),
            name: header(USER_NAME_HEADER),
        })
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Identity::from_headers(&parts.headers)
    }
}

/// Role a first-time caller receives.
pub fn role_for(user_id: &str, founder_user_id: Option<&str>) -> Role {
    if founder_user_id == Some(user_id) {
        Role::Founder
    } else {
        Role::Member
    }
}

/// Resolve the caller's member record, creating it on first login.
///
/// A persistence failure does not fail the login: the role is derived from the
/// configured founder id and the session is flagged as degraded.
pub async fn login(
    repo: &Repository,
    identity: &Identity,
    founder_user_id: Option<&str>,
    now: DateTime<Utc>,
) -> SessionInfo {
    match find_or_create_member(repo, identity, founder_user_id, now).await {
        Ok(member) => SessionInfo {
            role: member.role,
            member: Some(member),
            degraded: false,
        },
        Err(e) => {
            tracing::warn!(
                "Could not load member record for {}, continuing degraded: {}",
                identity.user_id,
                e
            );
            SessionInfo {
                member: None,
                role: role_for(&identity.user_id, founder_user_id),
                degraded: true,
            }
        }
    }
}

async fn find_or_create_member(
    repo: &Repository,
    identity: &Identity,
    founder_user_id: Option<&str>,
    now: DateTime<Utc>,
) -> Result<TeamMember, AppError> {
    if let Some(member) = repo.find_member_by_auth_id(&identity.user_id).await? {
        return Ok(member);
    }

    let role = role_for(&identity.user_id, founder_user_id);
    let member = repo
        .create_member(&NewMember {
            auth_id: identity.user_id.clone(),
            email: identity.email.clone().unwrap_or_default(),
            name: identity
                .name
                .clone()
                .unwrap_or_else(|| DEFAULT_MEMBER_NAME.to_string()),
            role,
            status: MemberStatus::Active,
            joined_at: now,
            task_completion_streak: 0,
            missed_weeks: 0,
        })
        .await?;

    tracing::info!(
        "Created {} record for {}",
        member.role.as_str(),
        member.auth_id
    );
    Ok(member)
}

/// Load the caller's record and require the founder role.
pub async fn require_founder(repo: &Repository, identity: &Identity) -> Result<TeamMember, AppError> {
    match repo.find_member_by_auth_id(&identity.user_id).await? {
        Some(member) if member.is_founder() => Ok(member),
        Some(_) => Err(AppError::Forbidden(
            "Only the founder can perform this action".to_string(),
        )),
        None => Err(AppError::Forbidden(
            "No member record for this user; sign in first".to_string(),
        )),
    }
}
