//! Ask-bar flow for founders.
//!
//! The generated reply is advisory only and never parsed. Actions are taken
//! from keyword classification of the founder's own prompt.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::Repository;
use crate::errors::AppError;
use crate::generation::{prompts, TextGenerator};
use crate::intent::{self, Classification};
use crate::models::{InteractionType, NewInteraction, Task, TaskCategory, TaskType, TeamMember};
use crate::tasks::TaskManager;

/// Message returned when a bulk assignment fails part way.
pub const ASSIGNMENT_FAILED_MESSAGE: &str = "Failed to assign tasks. Please try again.";

/// What the ask bar did with a prompt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskOutcome {
    /// Advisory reply from the text generator
    pub response: String,
    pub assignment: AssignmentOutcome,
    pub report_requested: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssignmentOutcome {
    NotRequested,
    #[serde(rename_all = "camelCase")]
    Assigned {
        category: TaskCategory,
        task_type: TaskType,
        /// Summary shown to the founder, e.g. "Created 2 grant application tasks ..."
        message: String,
        tasks: Vec<Task>,
    },
    Failed {
        message: String,
    },
}

pub struct Assistant {
    repo: Arc<Repository>,
    generator: Arc<dyn TextGenerator>,
    tasks: TaskManager,
    org_name: String,
}

impl Assistant {
    pub fn new(
        repo: Arc<Repository>,
        generator: Arc<dyn TextGenerator>,
        tasks: TaskManager,
        org_name: String,
    ) -> Self {
        Self {
            repo,
            generator,
            tasks,
            org_name,
        }
    }

    /// Answer a founder prompt and apply any keyword-triggered action.
    pub async fn ask(
        &self,
        founder_id: &str,
        prompt: &str,
        now: DateTime<Utc>,
    ) -> Result<AskOutcome, AppError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(AppError::Validation("Prompt is required".to_string()));
        }

        let members = self.repo.list_team_members().await?;

        let request = prompts::ask_bar_prompt(&self.org_name, prompt, &members);
        let response = self
            .generator
            .generate(&request, prompts::ASK_BAR_MAX_TOKENS)
            .await?;

        self.repo
            .log_interaction(&NewInteraction {
                user_id: founder_id.to_string(),
                interaction_type: InteractionType::AskBar,
                prompt: prompt.to_string(),
                response: response.clone(),
                context: Some(
                    serde_json::json!({ "teamMembersCount": members.len() }).to_string(),
                ),
            })
            .await?;

        let assignment = if intent::wants_assignment(prompt) {
            let classification = intent::classify(prompt);
            self.assign(founder_id, &members, classification, now).await
        } else {
            AssignmentOutcome::NotRequested
        };

        Ok(AskOutcome {
            response,
            assignment,
            report_requested: intent::wants_report(prompt),
        })
    }

    async fn assign(
        &self,
        founder_id: &str,
        members: &[TeamMember],
        classification: Classification,
        now: DateTime<Utc>,
    ) -> AssignmentOutcome {
        let recipients = intent::recipients(members);
        match self
            .tasks
            .bulk_assign(founder_id, &recipients, classification, now)
            .await
        {
            Ok(tasks) => AssignmentOutcome::Assigned {
                category: classification.category,
                task_type: classification.task_type,
                message: assignment_summary(tasks.len(), classification.category),
                tasks,
            },
            Err(e) => {
                tracing::error!("Bulk assignment failed: {}", e);
                AssignmentOutcome::Failed {
                    message: ASSIGNMENT_FAILED_MESSAGE.to_string(),
                }
            }
        }
    }
}

fn assignment_summary(count: usize, category: TaskCategory) -> String {
    format!(
        "Created {} {} tasks for active team members.",
        count,
        category.label()
    )
}
