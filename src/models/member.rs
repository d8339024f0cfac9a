//! Team member model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::timestamp;

/// Role of a member within the organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Founder,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Founder => "founder",
            Role::Member => "member",
        }
    }
}

/// Membership status. `Removed` is a soft delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    OnLeave,
    Flagged,
    Removed,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::OnLeave => "on_leave",
            MemberStatus::Flagged => "flagged",
            MemberStatus::Removed => "removed",
        }
    }
}

/// A person on the team, founder or member.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    /// Identity issued by the external auth provider
    pub auth_id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub status: MemberStatus,
    #[serde(serialize_with = "timestamp::serialize")]
    pub joined_at: DateTime<Utc>,
    /// Consecutive on-time completions
    pub task_completion_streak: i64,
    pub missed_weeks: i64,
    #[serde(serialize_with = "timestamp::serialize")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "timestamp::serialize")]
    pub updated_at: DateTime<Utc>,
}

impl TeamMember {
    pub fn is_founder(&self) -> bool {
        self.role == Role::Founder
    }
}

/// Fields of a member record before the store assigns id and timestamps.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    pub auth_id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub status: MemberStatus,
    #[serde(serialize_with = "timestamp::serialize")]
    pub joined_at: DateTime<Utc>,
    pub task_completion_streak: i64,
    pub missed_weeks: i64,
}

/// Request body for adding a member to the team.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
}

/// Partial member update; also the request body of the update endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MemberStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_completion_streak: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missed_weeks: Option<i64>,
}

/// Result of resolving the caller's session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<TeamMember>,
    pub role: Role,
    /// Set when the member record could not be loaded or created
    pub degraded: bool,
}
