//! Time windows for the timeline.

use std::fmt;

use chrono::{DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, Utc};

use crate::config::Zone;

/// Which slice of history the timeline shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scope {
    /// Since local midnight.
    #[default]
    Today,
    /// The previous local day.
    Yesterday,
    /// Since the most recent Sunday.
    ThisWeek,
    /// The Sunday-start week before this one.
    LastWeek,
    /// Since the first of the month.
    ThisMonth,
    /// The previous calendar month.
    LastMonth,
    /// Everything.
    All,
    /// From a user-supplied instant onwards.
    Since(DateTime<Utc>),
}

impl Scope {
    /// The `t` key cycle: Today, This Week, This Month, All Time, back to Today.
    pub fn cycle(self) -> Self {
        match self {
            Self::Today => Self::ThisWeek,
            Self::ThisWeek => Self::ThisMonth,
            Self::ThisMonth => Self::All,
            _ => Self::Today,
        }
    }

    /// Scope bound to a number key.
    pub fn from_digit(key: char) -> Option<Self> {
        match key {
            '1' => Some(Self::Today),
            '2' => Some(Self::Yesterday),
            '3' => Some(Self::ThisWeek),
            '4' => Some(Self::LastWeek),
            '5' => Some(Self::ThisMonth),
            '6' => Some(Self::LastMonth),
            '0' => Some(Self::All),
            _ => None,
        }
    }

    /// Lower bound for the timeline. The timeline never applies an upper
    /// bound, so `Yesterday` also shows everything logged since.
    pub fn start(&self, now: DateTime<FixedOffset>, zone: &Zone) -> DateTime<Utc> {
        self.bounds(now, zone).0
    }

    /// Concrete `[start, end)` bounds in UTC for the time reports;
    /// `end = None` is open-ended.
    pub fn bounds(
        &self,
        now: DateTime<FixedOffset>,
        zone: &Zone,
    ) -> (DateTime<Utc>, Option<DateTime<Utc>>) {
        let today = now.date_naive();
        let midnight = |date: NaiveDate| zone.midnight(date).with_timezone(&Utc);
        let sunday = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
        let first_of_month = today.with_day(1).unwrap_or(today);

        match self {
            Self::Today => (midnight(today), None),
            Self::Yesterday => (midnight(today - Duration::days(1)), Some(midnight(today))),
            Self::ThisWeek => (midnight(sunday), None),
            Self::LastWeek => (midnight(sunday - Duration::days(7)), Some(midnight(sunday))),
            Self::ThisMonth => (midnight(first_of_month), None),
            Self::LastMonth => {
                let previous = first_of_month
                    .checked_sub_months(Months::new(1))
                    .unwrap_or(first_of_month);
                (midnight(previous), Some(midnight(first_of_month)))
            }
            Self::All => (DateTime::<Utc>::UNIX_EPOCH, None),
            Self::Since(since) => (*since, None),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Today => f.write_str("Today"),
            Self::Yesterday => f.write_str("Yesterday"),
            Self::ThisWeek => f.write_str("This Week"),
            Self::LastWeek => f.write_str("Last Week"),
            Self::ThisMonth => f.write_str("This Month"),
            Self::LastMonth => f.write_str("Last Month"),
            Self::All => f.write_str("All Time"),
            Self::Since(since) => write!(f, "Since {}", since.format("%Y-%m-%d %H:%M")),
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

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[rstest]
    #[case(Scope::Today, "2025-06-11T00:00:00Z", None)]
    #[case(Scope::Yesterday, "2025-06-10T00:00:00Z", Some("2025-06-11T00:00:00Z"))]
    #[case(Scope::ThisWeek, "2025-06-08T00:00:00Z", None)]
    #[case(Scope::LastWeek, "2025-06-01T00:00:00Z", Some("2025-06-08T00:00:00Z"))]
    #[case(Scope::ThisMonth, "2025-06-01T00:00:00Z", None)]
    #[case(Scope::LastMonth, "2025-05-01T00:00:00Z", Some("2025-06-01T00:00:00Z"))]
    #[case(Scope::All, "1970-01-01T00:00:00Z", None)]
    fn test_bounds(#[case] scope: Scope, #[case] start: &str, #[case] end: Option<&str>) {
        let (s, e) = scope.bounds(now(), &Zone::utc());
        assert_eq!(s, ts(start));
        assert_eq!(e, end.map(ts));
    }

    #[test]
    fn test_bounds_follow_zone() {
        let zone = Zone::resolve("America/New_York");
        let now = zone.localize(ts("2025-06-11T02:00:00Z"));
        // Still the 10th in New York.
        let (start, _) = Scope::Today.bounds(now, &zone);
        assert_eq!(start, ts("2025-06-10T04:00:00Z"));
    }

    #[test]
    fn test_cycle_and_digits() {
        assert_eq!(Scope::Today.cycle(), Scope::ThisWeek);
        assert_eq!(Scope::All.cycle(), Scope::Today);
        assert_eq!(Scope::Yesterday.cycle(), Scope::Today);
        assert_eq!(Scope::from_digit('4'), Some(Scope::LastWeek));
        assert_eq!(Scope::from_digit('9'), None);
        assert_eq!(Scope::All.to_string(), "All Time");
    }

    #[test]
    fn test_start_matches_lower_bound() {
        assert_eq!(Scope::Yesterday.start(now(), &Zone::utc()), ts("2025-06-10T00:00:00Z"));
        assert_eq!(Scope::LastMonth.start(now(), &Zone::utc()), ts("2025-05-01T00:00:00Z"));
    }
}
