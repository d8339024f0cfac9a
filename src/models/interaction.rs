//! Log of prompts sent to the text generator and the replies received.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    AskBar,
    TaskFeedback,
    TaskAssignment,
    ReportGeneration,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInteraction {
    pub id: String,
    pub user_id: String,
    pub interaction_type: InteractionType,
    pub prompt: String,
    pub response: String,
    /// Free-form JSON context captured with the call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(serialize_with = "timestamp::serialize")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInteraction {
    pub user_id: String,
    pub interaction_type: InteractionType,
    pub prompt: String,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}
