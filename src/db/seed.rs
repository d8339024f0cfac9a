//! Demo data for a fresh deployment.

use chrono::{DateTime, Duration, Utc};

use super::Repository;
use crate::errors::AppError;
use crate::intent::TaskTemplate;
use crate::models::{
    MemberStatus, NewMember, NewTask, Role, TaskCategory, TaskChanges, TaskStatus, TaskType,
};
use crate::tasks::week::WeekStamp;

/// Populate an empty store with a founder, three members and a few tasks.
///
/// Returns `false` without writing anything when members already exist.
pub async fn seed_demo_data(
    repo: &Repository,
    founder_auth_id: &str,
    org_name: &str,
    now: DateTime<Utc>,
) -> Result<bool, AppError> {
    if repo.find_member_by_auth_id(founder_auth_id).await?.is_some()
        || !repo.list_team_members().await?.is_empty()
    {
        return Ok(false);
    }

    let founder = member(
        founder_auth_id,
        "Founder",
        Role::Founder,
        MemberStatus::Active,
        now,
    );
    repo.create_member(&founder).await?;

    let people = [
        ("demo_alex", "Alex Johnson", MemberStatus::Active, 3, 0),
        ("demo_sarah", "Sarah Chen", MemberStatus::Active, 5, 0),
        ("demo_mike", "Mike Rodriguez", MemberStatus::Flagged, 0, 2),
    ];
    for (auth_id, name, status, streak, missed) in people {
        let mut record = member(auth_id, name, Role::Member, status, now - Duration::days(60));
        record.task_completion_streak = streak;
        record.missed_weeks = missed;
        repo.create_member(&record).await?;
    }

    let stamp = WeekStamp::of(now);
    let tasks = [
        ("demo_alex", TaskCategory::GrantApplication, TaskStatus::Pending),
        ("demo_sarah", TaskCategory::SponsorOutreach, TaskStatus::InProgress),
        ("demo_sarah", TaskCategory::GrantApplication, TaskStatus::Completed),
        ("demo_mike", TaskCategory::Other, TaskStatus::Pending),
    ];
    for (assignee, category, status) in tasks {
        let template = TaskTemplate::for_category(category, org_name);
        let assigned_at = now;
        let task = repo
            .create_task(&NewTask {
                assignee_id: assignee.to_string(),
                title: template.title,
                description: template.description,
                task_type: TaskType::Weekly,
                category,
                status,
                due_date: assigned_at + Duration::days(7),
                assigned_at,
                week_number: stamp.week,
                year: stamp.year,
                explanation: Some(template.explanation),
                created_by: founder_auth_id.to_string(),
            })
            .await?;

        if status == TaskStatus::Completed {
            repo.update_task(
                &task.id,
                &TaskChanges {
                    completed_at: Some(now),
                    ..Default::default()
                },
            )
            .await?;
        }
    }

    tracing::info!("Seeded demo data: 4 members, {} tasks", tasks.len());
    Ok(true)
}

fn member(
    auth_id: &str,
    name: &str,
    role: Role,
    status: MemberStatus,
    joined_at: DateTime<Utc>,
) -> NewMember {
    let slug = name.split_whitespace().next().unwrap_or(name).to_lowercase();
    NewMember {
        auth_id: auth_id.to_string(),
        email: format!("{}@example.org", slug),
        name: name.to_string(),
        role,
        status,
        joined_at,
        task_completion_streak: 0,
        missed_weeks: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use chrono::TimeZone;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_seeded_tasks_share_week_with_assignment() {
        let repo = Repository::new(Arc::new(MemoryStore::new()));
        // Monday of ISO week 2
        let monday = Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap();

        seed_demo_data(&repo, "founder_1", "Test Org", monday)
            .await
            .unwrap();

        let tasks = repo.list_weekly_tasks(2, 2024).await.unwrap();
        assert_eq!(tasks.len(), 4);
        for task in &tasks {
            let stamp = WeekStamp::of(task.assigned_at);
            assert_eq!((task.week_number, task.year), (stamp.week, stamp.year));
            assert!(task.due_date > task.assigned_at);
        }
    }

    #[tokio::test]
    async fn test_seed_runs_once() {
        let repo = Repository::new(Arc::new(MemoryStore::new()));
        let now = Utc::now();

        assert!(seed_demo_data(&repo, "founder_1", "Test Org", now).await.unwrap());
        assert!(!seed_demo_data(&repo, "founder_1", "Test Org", now).await.unwrap());

        let team = repo.list_team_members().await.unwrap();
        assert_eq!(team.len(), 3);
        assert!(repo
            .find_member_by_auth_id("founder_1")
            .await
            .unwrap()
            .is_some_and(|m| m.is_founder()));

        let stamp = WeekStamp::of(now);
        let tasks = repo.list_weekly_tasks(stamp.week, stamp.year).await.unwrap();
        assert_eq!(tasks.len(), 4);

        let completed = repo.list_completed_tasks("demo_sarah", None).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert!(completed[0].completed_at.is_some());
    }
}
