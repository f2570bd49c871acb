//! Week boundary math and duration formatting.
//!
//! The whole accountability model hangs on one convention: a week starts
//! Monday 00:00:00.000 and ends Sunday 23:59:59.999. All functions here are
//! pure and take an explicit instant, so callers (and tests) control "now".

use chrono::{DateTime, Datelike, Duration, NaiveTime, Timelike, Utc, Weekday};

/// Monday 00:00:00.000 of the week containing `date`.
///
/// Sunday counts as day 6 of the week that started the preceding Monday,
/// never day -1.
pub fn week_start(date: DateTime<Utc>) -> DateTime<Utc> {
    let days_from_monday = date.weekday().num_days_from_monday() as i64;
    let monday = date.date_naive() - Duration::days(days_from_monday);
    monday.and_time(NaiveTime::MIN).and_utc()
}

/// Sunday 23:59:59.999 of the week containing `date`.
pub fn week_end(date: DateTime<Utc>) -> DateTime<Utc> {
    week_start(date) + Duration::days(7) - Duration::milliseconds(1)
}

/// Stable identifier for the week containing `date`: the calendar date of
/// its Monday, e.g. `"2024-03-18"`.
///
/// Used as the penalty-ledger key and as the grouping key for history
/// aggregation. Any two dates in the same Monday-to-Sunday span yield the
/// same id.
pub fn week_id(date: DateTime<Utc>) -> String {
    week_start(date).format("%Y-%m-%d").to_string()
}

/// Render a minute count for display: `45` → "45 min", `60` → "1h",
/// `90` → "1h 30m", `0` → "0 min".
pub fn format_minutes(minutes: u32) -> String {
    if minutes < 60 {
        return format!("{minutes} min");
    }
    let hours = minutes / 60;
    let remaining = minutes % 60;
    if remaining == 0 {
        format!("{hours}h")
    } else {
        format!("{hours}h {remaining}m")
    }
}

/// True iff `now` falls on Sunday at or after 18:00.
///
/// Drives the "last chance" banner and the failed/pending display
/// distinction. Re-evaluated on every poll; never cached.
pub fn is_reminder_window(now: DateTime<Utc>) -> bool {
    now.weekday() == Weekday::Sun && now.hour() >= 18
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn week_start_is_monday_midnight() {
        // 2024-03-20 is a Wednesday.
        let start = week_start(at(2024, 3, 20, 15, 30));
        assert_eq!(start, at(2024, 3, 18, 0, 0));
        assert_eq!(start.weekday(), Weekday::Mon);
    }

    #[test]
    fn sunday_belongs_to_the_preceding_monday() {
        // 2024-03-24 is a Sunday; its week started 2024-03-18.
        let start = week_start(at(2024, 3, 24, 10, 0));
        assert_eq!(start, at(2024, 3, 18, 0, 0));
    }

    #[test]
    fn week_end_is_sunday_last_millisecond() {
        let end = week_end(at(2024, 3, 20, 15, 30));
        assert_eq!(
            end,
            Utc.with_ymd_and_hms(2024, 3, 24, 23, 59, 59).unwrap()
                + Duration::milliseconds(999)
        );
    }

    #[test]
    fn week_id_matches_across_the_span() {
        let monday = at(2024, 3, 18, 0, 0);
        let sunday = at(2024, 3, 24, 23, 59);
        assert_eq!(week_id(monday), "2024-03-18");
        assert_eq!(week_id(sunday), "2024-03-18");
        assert_ne!(week_id(at(2024, 3, 25, 0, 0)), "2024-03-18");
    }

    #[test]
    fn format_minutes_table() {
        assert_eq!(format_minutes(0), "0 min");
        assert_eq!(format_minutes(45), "45 min");
        assert_eq!(format_minutes(60), "1h");
        assert_eq!(format_minutes(90), "1h 30m");
        assert_eq!(format_minutes(120), "2h");
    }

    #[test]
    fn reminder_window_is_sunday_evening_only() {
        assert!(is_reminder_window(at(2024, 3, 24, 18, 0)));
        assert!(is_reminder_window(at(2024, 3, 24, 23, 59)));
        assert!(!is_reminder_window(at(2024, 3, 24, 17, 59)));
        assert!(!is_reminder_window(at(2024, 3, 23, 20, 0)));
        assert!(!is_reminder_window(at(2024, 3, 25, 20, 0)));
    }

    proptest! {
        #[test]
        fn week_brackets_its_dates(secs in 0i64..4_000_000_000) {
            let d = Utc.timestamp_opt(secs, 0).unwrap();
            prop_assert!(week_start(d) <= d);
            prop_assert!(d <= week_end(d));
            prop_assert_eq!(
                week_end(d) - week_start(d),
                Duration::days(7) - Duration::milliseconds(1)
            );
        }

        #[test]
        fn same_week_same_id(secs in 0i64..4_000_000_000, offset_h in 0i64..24) {
            let d = Utc.timestamp_opt(secs, 0).unwrap();
            let other = week_start(d) + Duration::hours(offset_h * 7);
            if other <= week_end(d) {
                prop_assert_eq!(week_id(d), week_id(other));
            }
        }
    }
}
