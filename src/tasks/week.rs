//! Week grouping for weekly tasks.

use chrono::{DateTime, Datelike, Utc};

/// ISO-8601 week number paired with the calendar year of the instant.
///
/// The year is not the ISO week-based year: 2023-01-01 is stamped week 52 of 2023.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekStamp {
    pub week: u32,
    pub year: i32,
}

impl WeekStamp {
    pub fn of(at: DateTime<Utc>) -> Self {
        Self {
            week: at.iso_week().week(),
            year: at.year(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stamp(y: i32, m: u32, d: u32) -> WeekStamp {
        WeekStamp::of(Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_monday_starting_a_year_is_week_one() {
        assert_eq!(stamp(2024, 1, 1), WeekStamp { week: 1, year: 2024 });
    }

    #[test]
    fn test_sunday_before_first_thursday_belongs_to_last_week() {
        assert_eq!(stamp(2023, 1, 1), WeekStamp { week: 52, year: 2023 });
    }

    #[test]
    fn test_week_53_and_year_end() {
        // 2020 has 53 ISO weeks
        assert_eq!(stamp(2020, 12, 31).week, 53);
        // 2024-12-30 is a Monday in ISO week 1 of 2025
        assert_eq!(stamp(2024, 12, 30), WeekStamp { week: 1, year: 2024 });
    }
}
