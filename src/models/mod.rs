//! Data models for the TeamDesk backend.
//!
//! Records are stored as camelCase JSON documents and served with the same shape.

mod interaction;
mod leave;
mod member;
mod notification;
mod performance;
mod stats;
mod submission;
mod task;

pub use interaction::*;
pub use leave::*;
pub use member::*;
pub use notification::*;
pub use performance::*;
pub use stats::*;
pub use submission::*;
pub use task::*;

/// Timestamp serialization with a fixed millisecond precision.
///
/// Fixed width keeps lexical and chronological order identical, which the
/// document store relies on when ordering by a timestamp field.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::Serializer;

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format(ts))
    }

    pub fn serialize_option<S: Serializer>(
        ts: &Option<DateTime<Utc>>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => s.serialize_str(&format(ts)),
            None => s.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::timestamp;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_timestamp_has_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7).unwrap();
        let fractional = whole + chrono::Duration::milliseconds(250);

        let a = timestamp::format(&whole);
        let b = timestamp::format(&fractional);

        assert_eq!(a, "2024-03-04T05:06:07.000Z");
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }
}
