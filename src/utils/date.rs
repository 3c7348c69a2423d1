//! Date helpers for schedule days.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

fn local_millis(naive: NaiveDateTime) -> Option<i64> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
}

/// Parse a backend day key into epoch milliseconds.
///
/// Date-only keys are read as local midnight. Unparseable keys yield 0,
/// which sorts them first and keeps them through past-day pruning.
pub fn day_timestamp(raw: &str) -> i64 {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.timestamp_millis();
    }

    let parsed = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        });

    parsed.and_then(local_millis).unwrap_or(0)
}

/// Epoch milliseconds of local midnight on the day of `now`.
pub fn local_midnight(now: DateTime<Local>) -> i64 {
    local_millis(now.date_naive().and_time(NaiveTime::MIN))
        .unwrap_or_else(|| now.timestamp_millis())
}

/// Whether a day should be kept: undated, or today and later.
pub fn is_current_day(raw: &str, midnight: i64) -> bool {
    let ts = day_timestamp(raw);
    ts == 0 || ts >= midnight
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(offset: i64) -> String {
        (Local::now().date_naive() + Duration::days(offset))
            .format("%Y-%m-%d")
            .to_string()
    }

    #[test]
    fn unparseable_is_zero() {
        assert_eq!(day_timestamp("понедельник"), 0);
        assert_eq!(day_timestamp(""), 0);
    }

    #[test]
    fn formats_agree() {
        let iso = day_timestamp("2026-10-16");
        assert_ne!(iso, 0);
        assert_eq!(day_timestamp("16.10.2026"), iso);
        assert_eq!(day_timestamp("2026-10-16T00:00:00"), iso);
        assert!(day_timestamp("2026-10-17") > iso);
    }

    #[test]
    fn rfc3339_is_absolute() {
        assert_eq!(day_timestamp("1970-01-01T00:00:01Z"), 1000);
    }

    #[test]
    fn today_is_current_yesterday_is_not() {
        let midnight = local_midnight(Local::now());
        assert!(is_current_day(&day(0), midnight));
        assert!(is_current_day(&day(3), midnight));
        assert!(!is_current_day(&day(-1), midnight));
        assert!(is_current_day("garbage", midnight));
    }
}
