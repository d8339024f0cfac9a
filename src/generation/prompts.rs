//! Prompt builders for the two generation calls the application makes.

use crate::models::{Task, TeamMember};

/// Token budget for the ask-bar reply.
pub const ASK_BAR_MAX_TOKENS: u32 = 500;
/// Token budget for submission feedback.
pub const FEEDBACK_MAX_TOKENS: u32 = 300;

pub fn ask_bar_prompt(org_name: &str, request: &str, members: &[TeamMember]) -> String {
    let names = members
        .iter()
        .map(|m| m.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are an AI assistant for {org}'s team management system. The founder is asking: \"{request}\"\n\
         \n\
         Context: You help manage team tasks, generate reports, assign tasks, and provide insights about team performance. You can:\n\
         1. Assign new tasks to team members (both one-time and recurring)\n\
         2. Generate reports about team performance\n\
         3. Provide insights about specific team members\n\
         4. Create custom task assignments\n\
         5. Analyze team productivity and suggest improvements\n\
         \n\
         Current team members: {names}\n\
         \n\
         Respond as if you're taking action on their request. Be specific about what you're doing and provide actionable next steps. \
         If they're asking you to assign tasks, explain what tasks you're creating and for whom.",
        org = org_name,
        request = request,
        names = names,
    )
}

pub fn feedback_prompt(org_name: &str, task: &Task, submission: &str) -> String {
    format!(
        "You are an AI assistant for {org}. A team member has submitted their task completion report.\n\
         \n\
         Task: {title}\n\
         Task Description: {description}\n\
         Member Submission: {submission}\n\
         \n\
         Please provide constructive feedback on their submission. Rate their work on a scale of 1-5 \
         and provide specific suggestions for improvement if needed. Be encouraging but honest.",
        org = org_name,
        title = task.title,
        description = task.description,
        submission = submission,
    )
}
