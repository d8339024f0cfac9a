//! Keyword intent classification for founder ask-bar prompts.
//!
//! Every axis is a case-insensitive substring test where the first match wins.
//! Classification never fails: unmatched prompts fall through to `other` and
//! `weekly`. The branch order is part of the observable behavior and must not be
//! reordered.

use serde::Serialize;

use crate::models::{MemberStatus, TaskCategory, TaskType, TeamMember};

/// Category and task type derived from a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub category: TaskCategory,
    pub task_type: TaskType,
}

pub fn classify(prompt: &str) -> Classification {
    let text = prompt.to_lowercase();
    Classification {
        category: category_of(&text),
        task_type: task_type_of(&text),
    }
}

fn category_of(text: &str) -> TaskCategory {
    // "research" is deliberately not matched here
    if text.contains("grant") {
        TaskCategory::GrantApplication
    } else if text.contains("sponsor") {
        TaskCategory::SponsorOutreach
    } else if text.contains("partner") {
        TaskCategory::PartnerContact
    } else {
        TaskCategory::Other
    }
}

fn task_type_of(text: &str) -> TaskType {
    if text.contains("custom") || text.contains("one-time") {
        TaskType::Custom
    } else {
        TaskType::Weekly
    }
}

/// Only prompts mentioning both "assign" and "task" create tasks.
pub fn wants_assignment(prompt: &str) -> bool {
    let text = prompt.to_lowercase();
    text.contains("assign") && text.contains("task")
}

pub fn wants_report(prompt: &str) -> bool {
    let text = prompt.to_lowercase();
    text.contains("report") || text.contains("summary")
}

/// Members that receive bulk assignments: role member, status active.
///
/// Names in the prompt are not parsed; the audience is always the whole active team.
pub fn recipients(members: &[TeamMember]) -> Vec<TeamMember> {
    members
        .iter()
        .filter(|m| !m.is_founder() && m.status == MemberStatus::Active)
        .cloned()
        .collect()
}

/// Fixed title, description and explanation for a task category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTemplate {
    pub title: String,
    pub description: String,
    pub explanation: String,
}

impl TaskTemplate {
    pub fn for_category(category: TaskCategory, org_name: &str) -> Self {
        match category {
            TaskCategory::GrantApplication => Self {
                title: "Weekly Grant Application Task".to_string(),
                description: format!(
                    "Research and apply to at least 2 relevant grants for {}. \
                     Focus on grants that align with our mission and programs.",
                    org_name
                ),
                explanation: "Grant applications are crucial for nonprofit funding. \
                              Research foundations that support causes similar to ours, \
                              read their guidelines carefully, and submit compelling \
                              applications that demonstrate our impact and need."
                    .to_string(),
            },
            TaskCategory::SponsorOutreach => Self {
                title: "Weekly Sponsor Outreach Task".to_string(),
                description: "Contact at least 5 potential sponsors including local \
                              businesses, corporations, or community organizations for \
                              partnership opportunities."
                    .to_string(),
                explanation: "Sponsor outreach helps diversify our funding sources. \
                              Focus on businesses that align with our values, prepare \
                              personalized pitches, and follow up professionally. Track \
                              all contacts and responses."
                    .to_string(),
            },
            _ => Self {
                title: "Weekly Team Task".to_string(),
                description: format!(
                    "Complete assigned weekly responsibilities to support {} operations.",
                    org_name
                ),
                explanation: "This task supports our foundation's ongoing operations. \
                              Please complete it thoroughly and submit your progress by \
                              the due date."
                    .to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use chrono::Utc;

    fn member(name: &str, role: Role, status: MemberStatus) -> TeamMember {
        let now = Utc::now();
        TeamMember {
            id: name.to_lowercase(),
            auth_id: format!("auth_{}", name.to_lowercase()),
            email: format!("{}@example.org", name.to_lowercase()),
            name: name.to_string(),
            role,
            status,
            joined_at: now,
            task_completion_streak: 0,
            missed_weeks: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_grant_assignment_prompt() {
        let prompt = "Assign grant application tasks to all active members";
        let c = classify(prompt);
        assert_eq!(c.category, TaskCategory::GrantApplication);
        assert_eq!(c.task_type, TaskType::Weekly);
        assert!(wants_assignment(prompt));
        assert!(!wants_report(prompt));
    }

    #[test]
    fn test_custom_partner_prompt() {
        let c = classify("Create custom one-time task for partner outreach");
        assert_eq!(c.category, TaskCategory::PartnerContact);
        assert_eq!(c.task_type, TaskType::Custom);
    }

    #[test]
    fn test_first_match_wins() {
        // grant beats sponsor, sponsor beats partner
        assert_eq!(
            classify("sponsor a grant drive").category,
            TaskCategory::GrantApplication
        );
        assert_eq!(
            classify("Sponsor and PARTNER outreach").category,
            TaskCategory::SponsorOutreach
        );
        assert_eq!(classify("ONE-TIME push").task_type, TaskType::Custom);
    }

    #[test]
    fn test_fallbacks() {
        let c = classify("Do some research on donors");
        assert_eq!(c.category, TaskCategory::Other);
        assert_eq!(c.task_type, TaskType::Weekly);
        assert_eq!(classify("").category, TaskCategory::Other);
    }

    #[test]
    fn test_assignment_requires_both_words() {
        assert!(wants_assignment("please ASSIGN a Task"));
        assert!(!wants_assignment("assign grant work to Sarah"));
        assert!(!wants_assignment("create tasks for everyone"));
    }

    #[test]
    fn test_report_keywords() {
        assert!(wants_report("Generate a weekly REPORT"));
        assert!(wants_report("give me a summary"));
        assert!(!wants_report("assign tasks"));
    }

    #[test]
    fn test_recipients_are_active_members_only() {
        let team = vec![
            member("Founder", Role::Founder, MemberStatus::Active),
            member("Alex", Role::Member, MemberStatus::Active),
            member("Mike", Role::Member, MemberStatus::Flagged),
            member("Lee", Role::Member, MemberStatus::OnLeave),
            member("Old", Role::Member, MemberStatus::Removed),
            member("Sarah", Role::Member, MemberStatus::Active),
        ];
        let names: Vec<_> = recipients(&team).into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["Alex", "Sarah"]);
        assert!(recipients(&[]).is_empty());
    }

    #[test]
    fn test_templates() {
        let grant = TaskTemplate::for_category(TaskCategory::GrantApplication, "Acme Fund");
        assert_eq!(grant.title, "Weekly Grant Application Task");
        assert!(grant.description.contains("for Acme Fund."));

        let sponsor = TaskTemplate::for_category(TaskCategory::SponsorOutreach, "Acme Fund");
        assert_eq!(sponsor.title, "Weekly Sponsor Outreach Task");
        assert!(sponsor.description.starts_with("Contact at least 5 potential sponsors"));

        for category in [TaskCategory::PartnerContact, TaskCategory::Other] {
            let fallback = TaskTemplate::for_category(category, "Acme Fund");
            assert_eq!(fallback.title, "Weekly Team Task");
            assert_eq!(
                fallback.description,
                "Complete assigned weekly responsibilities to support Acme Fund operations."
            );
        }
    }
}
