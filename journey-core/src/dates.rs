use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::{Milestone, Visit};

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses an ISO-8601 date or date-time. Values without an offset are read
/// as UTC; anything unreadable yields `None` so the caller can treat the
/// record as undated.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Date used to place a visit on the timeline: the completion date when the
/// visit carries one, otherwise its scheduled date.
pub fn effective_date_of(visit: &Visit) -> Option<DateTime<Utc>> {
    let raw = visit
        .completed_date
        .as_deref()
        .or(visit.scheduled_date.as_deref())?;

    let parsed = parse_date(raw);
    if parsed.is_none() {
        tracing::warn!(visit_id = %visit.id, value = raw, "unparseable visit date, placing as undated");
    }
    parsed
}

pub fn milestone_date_of(milestone: &Milestone) -> Option<DateTime<Utc>> {
    let parsed = parse_date(&milestone.date);
    if parsed.is_none() {
        tracing::warn!(
            milestone_id = %milestone.id,
            value = %milestone.date,
            "unparseable milestone date, placing as undated"
        );
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MilestoneType, VisitStatus, VisitType};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn parses_plain_dates_as_utc_midnight() {
        assert_eq!(parse_date("2025-03-01"), Some(utc(2025, 3, 1, 0, 0)));
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        assert_eq!(
            parse_date("2025-03-01T09:30:00-08:00"),
            Some(utc(2025, 3, 1, 17, 30))
        );
        assert_eq!(
            parse_date("2025-03-01T09:30:00.250Z").map(|dt| dt.timestamp_millis() % 1000),
            Some(250)
        );
    }

    #[test]
    fn parses_naive_datetimes_as_utc() {
        assert_eq!(parse_date("2025-03-01T09:30:00"), Some(utc(2025, 3, 1, 9, 30)));
        assert_eq!(parse_date("2025-03-01T09:30"), Some(utc(2025, 3, 1, 9, 30)));
        assert_eq!(parse_date("  2025-03-01  "), Some(utc(2025, 3, 1, 0, 0)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("soon"), None);
        assert_eq!(parse_date("2025-13-40"), None);
    }

    #[test]
    fn completed_date_takes_precedence() {
        let visit = Visit::new("v1", VisitType::Initial, VisitStatus::Completed)
            .scheduled("2025-01-10")
            .completed("2025-01-12");
        assert_eq!(effective_date_of(&visit), Some(utc(2025, 1, 12, 0, 0)));
    }

    #[test]
    fn falls_back_to_scheduled_date() {
        let visit = Visit::new("v1", VisitType::Initial, VisitStatus::Scheduled)
            .scheduled("2025-01-10");
        assert_eq!(effective_date_of(&visit), Some(utc(2025, 1, 10, 0, 0)));
    }

    #[test]
    fn visit_without_dates_is_undated() {
        let visit = Visit::new("v1", VisitType::Initial, VisitStatus::Available);
        assert_eq!(effective_date_of(&visit), None);
    }

    #[test]
    fn malformed_completed_date_does_not_fall_through() {
        let visit = Visit::new("v1", VisitType::Initial, VisitStatus::Completed)
            .scheduled("2025-01-10")
            .completed("not-a-date");
        assert_eq!(effective_date_of(&visit), None);
    }

    #[test]
    fn malformed_milestone_date_is_undated() {
        let milestone = Milestone::new("m1", MilestoneType::Custom, "Shower", "next spring");
        assert_eq!(milestone_date_of(&milestone), None);
    }
}
