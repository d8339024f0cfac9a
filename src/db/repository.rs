//! Typed repository over a document store.
//!
//! One method per data access the application performs; each maps a record
//! type onto its collection and builds the corresponding query.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::query::{Direction, ListQuery, Predicate};
use super::store::{Collection, DocumentStore};
use crate::errors::AppError;
use crate::models::{
    AiInteraction, LeaveChanges, LeaveRequest, LeaveStatus, MemberChanges, MemberStatus,
    NewInteraction, NewLeaveRequest, NewMember, NewNotification, NewPerformanceLog, NewSubmission,
    NewTask, Notification, PerformanceLog, Role, Task, TaskChanges, TaskStatus, TaskSubmission,
    TeamMember, TeamStatistics,
};

/// Repository handle shared by every component that persists data.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn DocumentStore>,
}

impl Repository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Liveness probe: a one-document read against the members collection.
    pub async fn is_available(&self) -> bool {
        let query = ListQuery::new().limit(Some(1));
        match self.store.list(Collection::Users, &query).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Persistence liveness probe failed: {}", e);
                false
            }
        }
    }

    // ==================== MEMBER OPERATIONS ====================

    /// Find a member by the id issued by the auth provider.
    pub async fn find_member_by_auth_id(
        &self,
        auth_id: &str,
    ) -> Result<Option<TeamMember>, AppError> {
        let query = ListQuery::new()
            .filter(Predicate::eq("authId", auth_id)?)
            .limit(Some(1));
        Ok(self.list(Collection::Users, &query).await?.into_iter().next())
    }

    pub async fn get_member(&self, id: &str) -> Result<Option<TeamMember>, AppError> {
        self.get(Collection::Users, id).await
    }

    pub async fn create_member(&self, member: &NewMember) -> Result<TeamMember, AppError> {
        self.create(Collection::Users, member).await
    }

    pub async fn update_member(
        &self,
        id: &str,
        changes: &MemberChanges,
    ) -> Result<TeamMember, AppError> {
        self.update(Collection::Users, id, changes).await
    }

    /// Members (not founders) that have not been removed, by name.
    pub async fn list_team_members(&self) -> Result<Vec<TeamMember>, AppError> {
        let query = ListQuery::new()
            .filter(Predicate::eq("role", Role::Member.as_str())?)
            .filter(Predicate::not("status", MemberStatus::Removed.as_str())?)
            .order_by("name", Direction::Asc)?;
        self.list(Collection::Users, &query).await
    }

    pub async fn list_members_with_status(
        &self,
        status: MemberStatus,
    ) -> Result<Vec<TeamMember>, AppError> {
        let query = ListQuery::new()
            .filter(Predicate::eq("role", Role::Member.as_str())?)
            .filter(Predicate::eq("status", status.as_str())?)
            .order_by("name", Direction::Asc)?;
        self.list(Collection::Users, &query).await
    }

    /// Soft delete: the record stays but drops out of every team listing.
    pub async fn remove_member(&self, id: &str) -> Result<TeamMember, AppError> {
        let changes = MemberChanges {
            status: Some(MemberStatus::Removed),
            ..Default::default()
        };
        self.update_member(id, &changes).await
    }

    // ==================== TASK OPERATIONS ====================

    /// Tasks assigned to a member, soonest due first. An empty status list means any status.
    pub async fn list_tasks_for_assignee(
        &self,
        assignee_id: &str,
        statuses: &[TaskStatus],
    ) -> Result<Vec<Task>, AppError> {
        let mut query = ListQuery::new().filter(Predicate::eq("assigneeId", assignee_id)?);
        match statuses {
            [] => {}
            [single] => query = query.filter(Predicate::eq("status", single.as_str())?),
            many => {
                query = query.filter(Predicate::any_of(
                    "status",
                    many.iter().map(|s| s.as_str()),
                )?)
            }
        }
        let query = query.order_by("dueDate", Direction::Asc)?;
        self.list(Collection::Tasks, &query).await
    }

    /// Completed tasks of a member, most recently completed first.
    pub async fn list_completed_tasks(
        &self,
        assignee_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Task>, AppError> {
        let query = ListQuery::new()
            .filter(Predicate::eq("assigneeId", assignee_id)?)
            .filter(Predicate::eq("status", TaskStatus::Completed.as_str())?)
            .order_by("completedAt", Direction::Desc)?
            .limit(limit);
        self.list(Collection::Tasks, &query).await
    }

    pub async fn list_weekly_tasks(&self, week: u32, year: i32) -> Result<Vec<Task>, AppError> {
        let query = ListQuery::new()
            .filter(Predicate::eq("weekNumber", week)?)
            .filter(Predicate::eq("year", year)?)
            .order_by("assignedAt", Direction::Desc)?;
        self.list(Collection::Tasks, &query).await
    }

    pub async fn list_all_tasks(&self) -> Result<Vec<Task>, AppError> {
        self.list(Collection::Tasks, &ListQuery::new()).await
    }

    pub async fn get_task(&self, id: &str) -> Result<Option<Task>, AppError> {
        self.get(Collection::Tasks, id).await
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<Task, AppError> {
        self.create(Collection::Tasks, task).await
    }

    pub async fn update_task(&self, id: &str, changes: &TaskChanges) -> Result<Task, AppError> {
        self.update(Collection::Tasks, id, changes).await
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), AppError> {
        self.store.delete(Collection::Tasks, id).await
    }

    // ==================== SUBMISSION OPERATIONS ====================

    pub async fn create_submission(
        &self,
        submission: &NewSubmission,
    ) -> Result<TaskSubmission, AppError> {
        self.create(Collection::TaskSubmissions, submission).await
    }

    pub async fn list_submissions(&self, task_id: &str) -> Result<Vec<TaskSubmission>, AppError> {
        let query = ListQuery::new()
            .filter(Predicate::eq("taskId", task_id)?)
            .order_by("submittedAt", Direction::Desc)?;
        self.list(Collection::TaskSubmissions, &query).await
    }

    // ==================== LEAVE OPERATIONS ====================

    pub async fn create_leave_request(
        &self,
        request: &NewLeaveRequest,
    ) -> Result<LeaveRequest, AppError> {
        self.create(Collection::LeaveRequests, request).await
    }

    pub async fn get_leave_request(&self, id: &str) -> Result<Option<LeaveRequest>, AppError> {
        self.get(Collection::LeaveRequests, id).await
    }

    /// Record a decision; `processedAt` is stamped for any status other than pending.
    pub async fn update_leave_request(
        &self,
        id: &str,
        mut changes: LeaveChanges,
        now: DateTime<Utc>,
    ) -> Result<LeaveRequest, AppError> {
        if changes.status.is_some_and(|s| s != LeaveStatus::Pending) {
            changes.processed_at = Some(now);
        }
        self.update(Collection::LeaveRequests, id, &changes).await
    }

    pub async fn list_leave_requests(
        &self,
        requester_id: Option<&str>,
        status: Option<LeaveStatus>,
    ) -> Result<Vec<LeaveRequest>, AppError> {
        let mut query = ListQuery::new();
        if let Some(requester_id) = requester_id {
            query = query.filter(Predicate::eq("requesterId", requester_id)?);
        }
        if let Some(status) = status {
            query = query.filter(Predicate::eq("status", status.as_str())?);
        }
        let query = query.order_by("requestedAt", Direction::Desc)?;
        self.list(Collection::LeaveRequests, &query).await
    }

    // ==================== AI INTERACTION OPERATIONS ====================

    pub async fn log_interaction(
        &self,
        interaction: &NewInteraction,
    ) -> Result<AiInteraction, AppError> {
        self.create(Collection::AiInteractions, interaction).await
    }

    pub async fn list_interactions(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<AiInteraction>, AppError> {
        let query = ListQuery::new()
            .filter(Predicate::eq("userId", user_id)?)
            .order_by("createdAt", Direction::Desc)?
            .limit(limit);
        self.list(Collection::AiInteractions, &query).await
    }

    // ==================== PERFORMANCE OPERATIONS ====================

    pub async fn create_performance_log(
        &self,
        log: &NewPerformanceLog,
    ) -> Result<PerformanceLog, AppError> {
        self.create(Collection::PerformanceLogs, log).await
    }

    pub async fn list_performance_logs(
        &self,
        member_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<PerformanceLog>, AppError> {
        let query = ListQuery::new()
            .filter(Predicate::eq("memberId", member_id)?)
            .order_by("year", Direction::Desc)?
            .order_by("weekNumber", Direction::Desc)?
            .limit(limit);
        self.list(Collection::PerformanceLogs, &query).await
    }

    // ==================== NOTIFICATION OPERATIONS ====================

    pub async fn create_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, AppError> {
        self.create(Collection::Notifications, notification).await
    }

    pub async fn get_notification(&self, id: &str) -> Result<Option<Notification>, AppError> {
        self.get(Collection::Notifications, id).await
    }

    pub async fn list_notifications(
        &self,
        user_id: &str,
        unread_only: bool,
    ) -> Result<Vec<Notification>, AppError> {
        let mut query = ListQuery::new().filter(Predicate::eq("userId", user_id)?);
        if unread_only {
            query = query.filter(Predicate::eq("isRead", false)?);
        }
        let query = query.order_by("createdAt", Direction::Desc)?;
        self.list(Collection::Notifications, &query).await
    }

    pub async fn mark_notification_read(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<Notification, AppError> {
        let changes = serde_json::json!({
            "isRead": true,
            "readAt": crate::models::timestamp::format(&now),
        });
        let document = self
            .store
            .update(Collection::Notifications, id, changes)
            .await?;
        decode(Collection::Notifications, document)
    }

    // ==================== STATISTICS ====================

    pub async fn team_statistics(&self) -> Result<TeamStatistics, AppError> {
        let active_members = self
            .list_members_with_status(MemberStatus::Active)
            .await?
            .len();
        let flagged_members = self
            .list_members_with_status(MemberStatus::Flagged)
            .await?
            .len();

        let tasks = self.list_all_tasks().await?;
        let completed_tasks = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();

        let pending_leave_requests = self
            .list_leave_requests(None, Some(LeaveStatus::Pending))
            .await?
            .len();

        Ok(TeamStatistics {
            active_members,
            flagged_members,
            total_tasks: tasks.len(),
            completed_tasks,
            completion_rate: TeamStatistics::completion_rate(completed_tasks, tasks.len()),
            pending_leave_requests,
        })
    }

    // ==================== DOCUMENT MAPPING ====================

    async fn list<T: DeserializeOwned>(
        &self,
        collection: Collection,
        query: &ListQuery,
    ) -> Result<Vec<T>, AppError> {
        self.store
            .list(collection, query)
            .await?
            .into_iter()
            .map(|doc| decode(collection, doc))
            .collect()
    }

    async fn get<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<T>, AppError> {
        let query = ListQuery::new()
            .filter(Predicate::eq("id", id)?)
            .limit(Some(1));
        Ok(self.list(collection, &query).await?.into_iter().next())
    }

    async fn create<T: DeserializeOwned, N: Serialize>(
        &self,
        collection: Collection,
        fields: &N,
    ) -> Result<T, AppError> {
        let document = self.store.create(collection, encode(fields)?).await?;
        decode(collection, document)
    }

    async fn update<T: DeserializeOwned, C: Serialize>(
        &self,
        collection: Collection,
        id: &str,
        changes: &C,
    ) -> Result<T, AppError> {
        let document = self
            .store
            .update(collection, id, encode(changes)?)
            .await?;
        decode(collection, document)
    }
}

fn encode<T: Serialize>(fields: &T) -> Result<Value, AppError> {
    serde_json::to_value(fields)
        .map_err(|e| AppError::Internal(format!("Failed to encode record: {}", e)))
}

fn decode<T: DeserializeOwned>(collection: Collection, document: Value) -> Result<T, AppError> {
    serde_json::from_value(document).map_err(|e| {
        AppError::Database(format!(
            "Malformed {} document: {}",
            collection.record_name().to_lowercase(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{TaskCategory, TaskType};

    fn repo() -> Repository {
        Repository::new(Arc::new(MemoryStore::new()))
    }

    fn new_member(auth_id: &str, name: &str, role: Role, status: MemberStatus) -> NewMember {
        NewMember {
            auth_id: auth_id.to_string(),
            email: format!("{}@example.org", auth_id),
            name: name.to_string(),
            role,
            status,
            joined_at: Utc::now(),
            task_completion_streak: 0,
            missed_weeks: 0,
        }
    }

    fn new_task(assignee: &str, status: TaskStatus, due_in_days: i64) -> NewTask {
        let now = Utc::now();
        NewTask {
            assignee_id: assignee.to_string(),
            title: "Weekly Team Task".to_string(),
            description: "Do the work".to_string(),
            task_type: TaskType::Weekly,
            category: TaskCategory::Other,
            status,
            due_date: now + chrono::Duration::days(due_in_days),
            assigned_at: now,
            week_number: 10,
            year: 2024,
            explanation: None,
            created_by: "founder".to_string(),
        }
    }

    #[tokio::test]
    async fn test_team_listing_excludes_founder_and_removed() {
        let repo = repo();
        repo.create_member(&new_member("f", "Founder", Role::Founder, MemberStatus::Active))
            .await
            .unwrap();
        repo.create_member(&new_member("s", "Sarah", Role::Member, MemberStatus::Active))
            .await
            .unwrap();
        repo.create_member(&new_member("m", "Mike", Role::Member, MemberStatus::Flagged))
            .await
            .unwrap();
        let gone = repo
            .create_member(&new_member("g", "Gone", Role::Member, MemberStatus::Active))
            .await
            .unwrap();

        let removed = repo.remove_member(&gone.id).await.unwrap();
        assert_eq!(removed.status, MemberStatus::Removed);

        let team = repo.list_team_members().await.unwrap();
        let names: Vec<_> = team.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Mike", "Sarah"]);

        let active = repo
            .list_members_with_status(MemberStatus::Active)
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Sarah");

        // soft delete keeps the record reachable by id
        assert!(repo.get_member(&gone.id).await.unwrap().is_some());
        assert!(repo.find_member_by_auth_id("g").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_task_status_filters() {
        let repo = repo();
        repo.create_task(&new_task("a", TaskStatus::Pending, 3))
            .await
            .unwrap();
        repo.create_task(&new_task("a", TaskStatus::InProgress, 1))
            .await
            .unwrap();
        repo.create_task(&new_task("a", TaskStatus::Completed, 2))
            .await
            .unwrap();
        repo.create_task(&new_task("b", TaskStatus::Pending, 1))
            .await
            .unwrap();

        let open = repo
            .list_tasks_for_assignee("a", &[TaskStatus::Pending, TaskStatus::InProgress])
            .await
            .unwrap();
        assert_eq!(open.len(), 2);
        assert_eq!(open[0].status, TaskStatus::InProgress, "soonest due first");

        let pending = repo
            .list_tasks_for_assignee("a", &[TaskStatus::Pending])
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);

        let all = repo.list_tasks_for_assignee("a", &[]).await.unwrap();
        assert_eq!(all.len(), 3);

        let weekly = repo.list_weekly_tasks(10, 2024).await.unwrap();
        assert_eq!(weekly.len(), 4);
        assert!(repo.list_weekly_tasks(11, 2024).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_leave_processing_stamps_processed_at() {
        let repo = repo();
        let now = Utc::now();
        let request = repo
            .create_leave_request(&NewLeaveRequest {
                requester_id: "a".to_string(),
                reason: crate::models::LeaveReason::Exam,
                description: None,
                start_date: now,
                end_date: now + chrono::Duration::days(2),
                status: LeaveStatus::Pending,
                requested_at: now,
            })
            .await
            .unwrap();
        assert!(request.processed_at.is_none());

        let approved = repo
            .update_leave_request(
                &request.id,
                LeaveChanges {
                    status: Some(LeaveStatus::Approved),
                    approved_by: Some("founder".to_string()),
                    ..Default::default()
                },
                now,
            )
            .await
            .unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert!(approved.processed_at.is_some());

        let pending = repo
            .list_leave_requests(None, Some(LeaveStatus::Pending))
            .await
            .unwrap();
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn test_statistics() {
        let repo = repo();
        repo.create_member(&new_member("s", "Sarah", Role::Member, MemberStatus::Active))
            .await
            .unwrap();
        repo.create_member(&new_member("m", "Mike", Role::Member, MemberStatus::Flagged))
            .await
            .unwrap();
        repo.create_task(&new_task("s", TaskStatus::Completed, 1))
            .await
            .unwrap();
        repo.create_task(&new_task("s", TaskStatus::Pending, 1))
            .await
            .unwrap();
        repo.create_task(&new_task("m", TaskStatus::Pending, 1))
            .await
            .unwrap();

        let stats = repo.team_statistics().await.unwrap();
        assert_eq!(
            stats,
            TeamStatistics {
                active_members: 1,
                flagged_members: 1,
                total_tasks: 3,
                completed_tasks: 1,
                completion_rate: 33,
                pending_leave_requests: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_liveness_probe_is_stable() {
        let repo = repo();
        assert!(repo.is_available().await);
        assert!(repo.is_available().await);
    }
}
