//! Aggregate team figures for the founder dashboard.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStatistics {
    pub active_members: usize,
    pub flagged_members: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// Rounded percentage of completed tasks, 0 without tasks
    pub completion_rate: u32,
    pub pending_leave_requests: usize,
}

impl TeamStatistics {
    pub fn completion_rate(completed: usize, total: usize) -> u32 {
        if total == 0 {
            return 0;
        }
        ((completed as f64 / total as f64) * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_rate_rounds() {
        assert_eq!(TeamStatistics::completion_rate(0, 0), 0);
        assert_eq!(TeamStatistics::completion_rate(1, 3), 33);
        assert_eq!(TeamStatistics::completion_rate(2, 3), 67);
        assert_eq!(TeamStatistics::completion_rate(4, 4), 100);
    }
}
