//! India Standard Time helpers.
//!
//! Snapshot dates are either bare ISO dates (`2021-10-30`), which mean
//! midnight IST, or full timestamps. Everything is rendered in IST.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use covid_map_snapshot_models::{Snapshot, TOTAL_REGION_CODE};

/// India Standard Time, UTC+05:30.
pub const IST: FixedOffset = match FixedOffset::east_opt(5 * 3600 + 30 * 60) {
    Some(offset) => offset,
    None => panic!("invalid IST offset"),
};

/// Timestamp formats accepted in addition to RFC 3339, read as IST.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Current time in IST.
#[must_use]
pub fn india_now() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&IST)
}

/// Parses a snapshot date or timestamp into IST.
#[must_use]
pub fn parse_india_date(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0)?.and_local_timezone(IST).single();
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(s) {
        return Some(timestamp.with_timezone(&IST));
    }
    NAIVE_FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(s, format)
            .ok()?
            .and_local_timezone(IST)
            .single()
    })
}

/// Formats a snapshot date in IST with a chrono pattern. Empty when the
/// input is missing or unparseable.
#[must_use]
pub fn format_date(s: Option<&str>, pattern: &str) -> String {
    s.and_then(parse_india_date)
        .map(|date| date.format(pattern).to_string())
        .unwrap_or_default()
}

/// Latest of the country's case, testing and vaccination dates, as an IST
/// calendar date.
#[must_use]
pub fn last_data_date(snapshot: &Snapshot) -> Option<NaiveDate> {
    let meta = snapshot.get(TOTAL_REGION_CODE)?.meta.as_ref()?;
    [
        meta.date.as_deref(),
        meta.tested.as_ref().and_then(|t| t.date.as_deref()),
        meta.vaccinated.as_ref().and_then(|v| v.date.as_deref()),
    ]
    .into_iter()
    .flatten()
    .filter_map(parse_india_date)
    .max()
    .map(|date| date.date_naive())
}

/// Human distance between a snapshot timestamp and `now`, e.g.
/// `"about 2 hours"`. `None` when the timestamp cannot be parsed.
#[must_use]
pub fn format_last_updated(timestamp: &str, now: DateTime<FixedOffset>) -> Option<String> {
    let then = parse_india_date(timestamp)?;
    let seconds = (now - then).num_seconds().unsigned_abs();
    Some(format_distance_seconds(seconds))
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// Rounded integer division.
const fn div_round(n: u64, d: u64) -> u64 {
    (n + d / 2) / d
}

fn format_distance_seconds(seconds: u64) -> String {
    const HOUR: u64 = 60;
    const DAY: u64 = 24 * HOUR;
    const MONTH: u64 = 30 * DAY;

    let minutes = div_round(seconds, 60);
    match minutes {
        0 => "less than a minute".to_string(),
        m if m < 45 => plural(m, "minute"),
        m if m < 90 => "about 1 hour".to_string(),
        m if m < DAY => format!("about {}", plural(div_round(m, HOUR), "hour")),
        m if m < 42 * HOUR => "1 day".to_string(),
        m if m < MONTH => plural(div_round(m, DAY), "day"),
        m if m < 2 * MONTH => format!("about {}", plural(div_round(m, MONTH), "month")),
        m => {
            let months = div_round(m, MONTH);
            if months < 12 {
                return plural(months, "month");
            }
            let years = months / 12;
            match months % 12 {
                0..3 => format!("about {}", plural(years, "year")),
                3..9 => format!("over {}", plural(years, "year")),
                _ => format!("almost {}", plural(years + 1, "year")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike as _, TimeDelta, Timelike as _};

    use super::*;

    #[test]
    fn bare_date_is_midnight_ist() {
        let date = parse_india_date("2021-10-30").unwrap();
        assert_eq!(date.to_rfc3339(), "2021-10-30T00:00:00+05:30");
    }

    #[test]
    fn rfc3339_is_converted_to_ist() {
        let date = parse_india_date("2021-10-31T03:42:32Z").unwrap();
        assert_eq!(date.hour(), 9);
        assert_eq!(date.minute(), 12);
    }

    #[test]
    fn naive_timestamp_is_read_as_ist() {
        let date = parse_india_date("2021-10-31 09:12:32").unwrap();
        assert_eq!(date.to_rfc3339(), "2021-10-31T09:12:32+05:30");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_india_date("yesterday").is_none());
        assert_eq!(format_date(Some("yesterday"), "%d %b"), "");
        assert_eq!(format_date(None, "%d %b"), "");
    }

    #[test]
    fn formats_header_date() {
        assert_eq!(
            format_date(Some("2021-10-31T09:12:32+05:30"), "%d %b, %-I:%M %p"),
            "31 Oct, 9:12 AM"
        );
    }

    #[test]
    fn last_data_date_takes_latest() {
        let snapshot: Snapshot = serde_json::from_str(
            r#"{"TT": {"meta": {
                "date": "2021-10-30",
                "tested": {"date": "2021-10-29"},
                "vaccinated": {"date": "2021-10-31"}
            }}}"#,
        )
        .unwrap();
        let date = last_data_date(&snapshot).unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2021, 10, 31));
    }

    #[test]
    fn last_data_date_missing() {
        let snapshot: Snapshot = serde_json::from_str(r#"{"TT": {}, "MH": {}}"#).unwrap();
        assert!(last_data_date(&snapshot).is_none());
        assert!(last_data_date(&Snapshot::new()).is_none());
    }

    #[test]
    fn distance_wording() {
        let now = parse_india_date("2021-10-31T12:00:00+05:30").unwrap();
        let cases = [
            (TimeDelta::seconds(20), "less than a minute"),
            (TimeDelta::minutes(1), "1 minute"),
            (TimeDelta::minutes(5), "5 minutes"),
            (TimeDelta::minutes(60), "about 1 hour"),
            (TimeDelta::hours(3), "about 3 hours"),
            (TimeDelta::hours(30), "1 day"),
            (TimeDelta::days(3), "3 days"),
            (TimeDelta::days(40), "about 1 month"),
            (TimeDelta::days(150), "5 months"),
            (TimeDelta::days(400), "about 1 year"),
            (TimeDelta::days(600), "over 1 year"),
            (TimeDelta::days(700), "almost 2 years"),
        ];
        for (ago, expected) in cases {
            let then = (now - ago).to_rfc3339();
            assert_eq!(
                format_last_updated(&then, now).as_deref(),
                Some(expected),
                "{ago:?} ago"
            );
        }
    }
}
