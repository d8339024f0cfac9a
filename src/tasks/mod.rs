//! Task lifecycle management.
//!
//! Tasks move `pending -> in_progress -> completed`. Nothing moves a task to
//! `overdue`. Every collaborator error is returned to the caller as-is; there
//! is no retry and no compensation for partially applied work.

pub mod week;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;

use crate::db::Repository;
use crate::errors::AppError;
use crate::generation::{prompts, TextGenerator};
use crate::intent::{Classification, TaskTemplate};
use crate::models::{
    InteractionType, NewInteraction, NewSubmission, NewTask, SubmissionOutcome, Task,
    TaskChanges, TaskStatus, TaskSubmission, TeamMember,
};
use week::WeekStamp;

/// Days between assignment and due date.
pub const TASK_DURATION_DAYS: i64 = 7;

#[derive(Clone)]
pub struct TaskManager {
    repo: Arc<Repository>,
    generator: Arc<dyn TextGenerator>,
    org_name: String,
}

impl TaskManager {
    pub fn new(repo: Arc<Repository>, generator: Arc<dyn TextGenerator>, org_name: String) -> Self {
        Self {
            repo,
            generator,
            org_name,
        }
    }

    /// Create one task per recipient, all requests in flight at once.
    ///
    /// Every request runs to completion before the first failure is returned,
    /// so tasks created by the other requests stay.
    pub async fn bulk_assign(
        &self,
        creator_id: &str,
        recipients: &[TeamMember],
        classification: Classification,
        now: DateTime<Utc>,
    ) -> Result<Vec<Task>, AppError> {
        let template = TaskTemplate::for_category(classification.category, &self.org_name);
        let stamp = WeekStamp::of(now);
        let due_date = now + Duration::days(TASK_DURATION_DAYS);

        let creations = recipients.iter().map(|member| {
            let task = NewTask {
                assignee_id: member.auth_id.clone(),
                title: template.title.clone(),
                description: template.description.clone(),
                task_type: classification.task_type,
                category: classification.category,
                status: TaskStatus::Pending,
                due_date,
                assigned_at: now,
                week_number: stamp.week,
                year: stamp.year,
                explanation: Some(template.explanation.clone()),
                created_by: creator_id.to_string(),
            };
            async move { self.repo.create_task(&task).await }
        });

        let tasks = join_all(creations)
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;
        tracing::info!(
            "Assigned {} {} tasks for week {}/{}",
            tasks.len(),
            classification.category.as_str(),
            stamp.week,
            stamp.year
        );
        Ok(tasks)
    }

    /// Record a completion report for a task.
    ///
    /// The submission is written first, then the task is marked completed, then
    /// feedback is generated. Feedback is returned and logged but not stored on
    /// the submission; a failed log write only produces a warning.
    pub async fn submit_completion(
        &self,
        submitter_id: &str,
        task_id: &str,
        details: &str,
        now: DateTime<Utc>,
    ) -> Result<SubmissionOutcome, AppError> {
        let details = details.trim();
        if details.is_empty() {
            return Err(AppError::Validation(
                "Submission details are required".to_string(),
            ));
        }

        let task = self
            .repo
            .get_task(task_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Task {} not found", task_id)))?;

        if task.assignee_id != submitter_id {
            return Err(AppError::Forbidden(
                "Only the assignee can submit this task".to_string(),
            ));
        }
        if task.status == TaskStatus::Completed {
            return Err(AppError::Validation(
                "Task has already been completed".to_string(),
            ));
        }

        let submission = self
            .repo
            .create_submission(&NewSubmission {
                task_id: task.id.clone(),
                submitter_id: submitter_id.to_string(),
                submission_type: task.category,
                details: details.to_string(),
                submitted_at: now,
            })
            .await?;

        let task = self.complete(&task.id, now).await?;

        let prompt = prompts::feedback_prompt(&self.org_name, &task, details);
        let feedback = self
            .generator
            .generate(&prompt, prompts::FEEDBACK_MAX_TOKENS)
            .await?;

        let logged = self
            .repo
            .log_interaction(&NewInteraction {
                user_id: submitter_id.to_string(),
                interaction_type: InteractionType::TaskFeedback,
                prompt,
                response: feedback.clone(),
                context: Some(serde_json::json!({ "taskId": task.id }).to_string()),
            })
            .await;
        if let Err(e) = logged {
            tracing::warn!("Could not log feedback for task {}: {}", task.id, e);
        }

        tracing::info!("Task {} completed by {}", task.id, submitter_id);
        Ok(SubmissionOutcome {
            submission,
            task,
            feedback,
        })
    }

    async fn complete(&self, task_id: &str, now: DateTime<Utc>) -> Result<Task, AppError> {
        let changes = TaskChanges {
            status: Some(TaskStatus::Completed),
            completed_at: Some(now),
            ..Default::default()
        };
        self.repo.update_task(task_id, &changes).await
    }

    /// Partial update. Moving a task to `completed` stamps `completedAt` when
    /// the caller did not supply one.
    pub async fn update_task(
        &self,
        task_id: &str,
        mut changes: TaskChanges,
        now: DateTime<Utc>,
    ) -> Result<Task, AppError> {
        if changes.status == Some(TaskStatus::Completed) && changes.completed_at.is_none() {
            changes.completed_at = Some(now);
        }
        self.repo.update_task(task_id, &changes).await
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<(), AppError> {
        self.repo.delete_task(task_id).await
    }

    pub async fn tasks_for(
        &self,
        assignee_id: &str,
        statuses: &[TaskStatus],
    ) -> Result<Vec<Task>, AppError> {
        self.repo.list_tasks_for_assignee(assignee_id, statuses).await
    }

    pub async fn completed_tasks(
        &self,
        assignee_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Task>, AppError> {
        self.repo.list_completed_tasks(assignee_id, limit).await
    }

    pub async fn weekly_tasks(&self, stamp: WeekStamp) -> Result<Vec<Task>, AppError> {
        self.repo.list_weekly_tasks(stamp.week, stamp.year).await
    }

    pub async fn submissions(&self, task_id: &str) -> Result<Vec<TaskSubmission>, AppError> {
        self.repo.list_submissions(task_id).await
    }
}
