//! Flexible date parsing for `--since`, `--until` and the since prompt.
//!
//! Accepts keywords (`today`, `yesterday`, `now`), relative forms
//! (`3d ago`, `2 weeks`, `last month`, `this week`), bare spans (`7d`) and a
//! handful of absolute formats. Every function takes `now` explicitly so
//! results are reproducible.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Zone;
use crate::error::{PulseError, Result};

static SPAN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)([smhdwy])$").expect("valid span regex")
});

static COUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\s+(day|days|week|weeks|month|months|year|years)$")
        .expect("valid count regex")
});

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%b %d, %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"];

/// Parse a flexible date expression relative to `now`.
pub fn parse_flexible(
    input: &str,
    now: DateTime<FixedOffset>,
    zone: &Zone,
) -> Result<DateTime<FixedOffset>> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();
    if lower.is_empty() {
        return Err(PulseError::validation("empty date input"));
    }
    let fail = || PulseError::DateParse {
        input: lower.clone(),
    };

    match lower.as_str() {
        "today" => return Ok(zone.start_of_day(now)),
        "yesterday" => return Ok(zone.start_of_day(now - Duration::days(1))),
        "tomorrow" => return Ok(zone.start_of_day(now + Duration::days(1))),
        "now" => return Ok(now),
        _ => {}
    }

    let span = lower.strip_suffix(" ago").map_or(lower.as_str(), str::trim);
    if let Some(duration) = parse_span(span) {
        return now.checked_sub_signed(duration).ok_or_else(fail);
    }

    if let Some(period) = lower.strip_prefix("last ") {
        let shifted = match period {
            "day" => Some(now - Duration::days(1)),
            "week" => Some(now - Duration::days(7)),
            "month" => now.checked_sub_months(Months::new(1)),
            "year" => now.checked_sub_months(Months::new(12)),
            _ => None,
        };
        if let Some(at) = shifted {
            return Ok(at);
        }
    }

    if let Some(period) = lower.strip_prefix("this ") {
        match period {
            "week" => {
                let back = i64::from(now.weekday().number_from_monday()) - 1;
                return Ok(now - Duration::days(back));
            }
            "month" => return first_of_month(now, zone).ok_or_else(fail),
            "year" => {
                let date = NaiveDate::from_ymd_opt(now.year(), 1, 1).ok_or_else(fail)?;
                return Ok(zone.midnight(date));
            }
            _ => {}
        }
    }

    if let Some(caps) = COUNT_RE.captures(&lower) {
        let count: u32 = caps[1].parse().map_err(|_| fail())?;
        let at = match &caps[2] {
            "day" | "days" => Duration::try_days(i64::from(count))
                .and_then(|d| now.checked_sub_signed(d)),
            "week" | "weeks" => Duration::try_weeks(i64::from(count))
                .and_then(|d| now.checked_sub_signed(d)),
            "month" | "months" => now.checked_sub_months(Months::new(count)),
            _ => now.checked_sub_months(Months::new(count.saturating_mul(12))),
        };
        return at.ok_or_else(fail);
    }

    if let Ok(at) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(zone.localize(at.with_timezone(&Utc)));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(zone.wall_clock(naive));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(zone.midnight(date));
        }
    }

    Err(fail())
}

/// `30m`, `2h`, `7d`, `1w`, `1y` (365 days).
fn parse_span(input: &str) -> Option<Duration> {
    let caps = SPAN_RE.captures(input)?;
    let count: i64 = caps[1].parse().ok()?;
    match &caps[2] {
        "s" => Duration::try_seconds(count),
        "m" => Duration::try_minutes(count),
        "h" => Duration::try_hours(count),
        "d" => Duration::try_days(count),
        "w" => Duration::try_weeks(count),
        "y" => Duration::try_days(count.checked_mul(365)?),
        _ => None,
    }
}

fn first_of_month(now: DateTime<FixedOffset>, zone: &Zone) -> Option<DateTime<FixedOffset>> {
    NaiveDate::from_ymd_opt(now.year(), now.month(), 1).map(|d| zone.midnight(d))
}

/// A named date range for `pulse list --preset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Today, midnight to midnight.
    Today,
    /// The previous calendar day.
    Yesterday,
    /// The current Monday-start week.
    Week,
    /// The current calendar month.
    Month,
    /// The current calendar year.
    Year,
    /// Midnight seven days ago until now.
    Last7Days,
    /// Midnight thirty days ago until now.
    Last30Days,
    /// Midnight ninety days ago until now.
    Last90Days,
}

impl Preset {
    /// Parse a preset name; hyphenated spellings are accepted.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "yesterday" => Ok(Self::Yesterday),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            "last7days" | "last-7-days" => Ok(Self::Last7Days),
            "last30days" | "last-30-days" => Ok(Self::Last30Days),
            "last90days" | "last-90-days" => Ok(Self::Last90Days),
            other => Err(PulseError::InvalidArgument {
                name: "preset".to_string(),
                reason: format!("unknown date preset: {other}"),
            }),
        }
    }

    /// Concrete `[start, end)` bounds relative to `now`.
    pub fn range(
        self,
        now: DateTime<FixedOffset>,
        zone: &Zone,
    ) -> (DateTime<FixedOffset>, DateTime<FixedOffset>) {
        let today = now.date_naive();
        let days_back = |n: i64| zone.midnight(today - Duration::days(n));
        match self {
            Self::Today => (zone.midnight(today), zone.midnight(today + Duration::days(1))),
            Self::Yesterday => (days_back(1), zone.midnight(today)),
            Self::Week => {
                let monday =
                    today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
                (zone.midnight(monday), zone.midnight(monday + Duration::days(7)))
            }
            Self::Month => {
                let first = today.with_day(1).unwrap_or(today);
                let next = first.checked_add_months(Months::new(1)).unwrap_or(first);
                (zone.midnight(first), zone.midnight(next))
            }
            Self::Year => {
                let first = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                let next = NaiveDate::from_ymd_opt(today.year() + 1, 1, 1).unwrap_or(today);
                (zone.midnight(first), zone.midnight(next))
            }
            Self::Last7Days => (days_back(7), now),
            Self::Last30Days => (days_back(30), now),
            Self::Last90Days => (days_back(90), now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// Wednesday 2025-06-11 14:30 UTC.
    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2025-06-11T14:30:00+00:00").unwrap()
    }

    fn parse(input: &str) -> String {
        parse_flexible(input, now(), &Zone::utc())
            .unwrap()
            .to_rfc3339()
    }

    #[rstest]
    #[case("today", "2025-06-11T00:00:00+00:00")]
    #[case("  Yesterday ", "2025-06-10T00:00:00+00:00")]
    #[case("tomorrow", "2025-06-12T00:00:00+00:00")]
    #[case("now", "2025-06-11T14:30:00+00:00")]
    #[case("2h ago", "2025-06-11T12:30:00+00:00")]
    #[case("7d", "2025-06-04T14:30:00+00:00")]
    #[case("1w ago", "2025-06-04T14:30:00+00:00")]
    #[case("last month", "2025-05-11T14:30:00+00:00")]
    #[case("this week", "2025-06-09T14:30:00+00:00")]
    #[case("this month", "2025-06-01T00:00:00+00:00")]
    #[case("this year", "2025-01-01T00:00:00+00:00")]
    #[case("3 days", "2025-06-08T14:30:00+00:00")]
    #[case("2 months", "2025-04-11T14:30:00+00:00")]
    #[case("2025-01-02", "2025-01-02T00:00:00+00:00")]
    #[case("2025/01/02", "2025-01-02T00:00:00+00:00")]
    #[case("Jan 2, 2025", "2025-01-02T00:00:00+00:00")]
    #[case("2 January 2025", "2025-01-02T00:00:00+00:00")]
    #[case("2025-01-02 15:04", "2025-01-02T15:04:00+00:00")]
    #[case("2025-01-02T10:00:00+02:00", "2025-01-02T08:00:00+00:00")]
    fn test_parse_flexible(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(parse(input), expected);
    }

    #[test]
    fn test_us_format_wins_over_european() {
        assert_eq!(parse("03/04/2025"), "2025-03-04T00:00:00+00:00");
        // Day 13 cannot be a month, so the European reading applies.
        assert_eq!(parse("13/04/2025"), "2025-04-13T00:00:00+00:00");
    }

    #[test]
    fn test_rejects_garbage() {
        let err = parse_flexible("whenever", now(), &Zone::utc()).unwrap_err();
        assert_eq!(err.to_string(), "unable to parse date: whenever");
        assert!(parse_flexible("   ", now(), &Zone::utc()).is_err());
    }

    #[test]
    fn test_presets() {
        let zone = Zone::utc();
        let (start, end) = Preset::parse("week").unwrap().range(now(), &zone);
        assert_eq!(start.to_rfc3339(), "2025-06-09T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-06-16T00:00:00+00:00");

        let (start, end) = Preset::parse("last-7-days").unwrap().range(now(), &zone);
        assert_eq!(start.to_rfc3339(), "2025-06-04T00:00:00+00:00");
        assert_eq!(end, now());

        let (start, end) = Preset::Month.range(now(), &zone);
        assert_eq!(start.to_rfc3339(), "2025-06-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-07-01T00:00:00+00:00");

        assert!(Preset::parse("fortnight").is_err());
    }
}
