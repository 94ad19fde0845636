//! Timezone resolution.
//!
//! All wall-clock math (scope boundaries, display times, reminder instants)
//! goes through [`Zone`], which wraps either the host's local zone or a named
//! IANA zone. Results are expressed as `DateTime<FixedOffset>` so callers do
//! not need to be generic over `chrono::TimeZone`.

use chrono::{
    DateTime, Duration, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
    Offset, TimeZone, Utc,
};
use chrono_tz::Tz;

/// A resolved timezone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Zone {
    /// The host's local timezone.
    #[default]
    Local,
    /// A named IANA timezone.
    Named(Tz),
}

impl Zone {
    /// Resolve a configured name. Empty or unknown names fall back to local.
    pub fn resolve(name: &str) -> Self {
        let name = name.trim();
        if name.is_empty() {
            return Self::Local;
        }
        match name.parse::<Tz>() {
            Ok(tz) => Self::Named(tz),
            Err(_) => {
                tracing::warn!(timezone = name, "unknown timezone, using local time");
                Self::Local
            }
        }
    }

    /// UTC, mostly for tests.
    pub const fn utc() -> Self {
        Self::Named(chrono_tz::UTC)
    }

    /// Human-readable name.
    pub fn name(&self) -> String {
        match self {
            Self::Local => "Local".to_string(),
            Self::Named(tz) => tz.name().to_string(),
        }
    }

    /// Current instant in this zone.
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.localize(Utc::now())
    }

    /// Convert a UTC instant into this zone.
    pub fn localize(&self, utc: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            Self::Local => utc.with_timezone(&Local).fixed_offset(),
            Self::Named(tz) => utc.with_timezone(tz).fixed_offset(),
        }
    }

    /// Interpret a wall-clock time in this zone.
    ///
    /// Ambiguous times take the earlier instant. Times skipped by a DST
    /// transition are moved forward by the gap.
    pub fn wall_clock(&self, naive: NaiveDateTime) -> DateTime<FixedOffset> {
        match self {
            Self::Local => resolve_local(&Local, naive),
            Self::Named(tz) => resolve_local(tz, naive),
        }
    }

    /// Midnight at the start of `date` in this zone.
    pub fn midnight(&self, date: NaiveDate) -> DateTime<FixedOffset> {
        self.wall_clock(date.and_time(NaiveTime::MIN))
    }

    /// Midnight at the start of the day containing `at`.
    pub fn start_of_day(&self, at: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        self.midnight(at.date_naive())
    }
}

fn resolve_local<T: TimeZone>(tz: &T, naive: NaiveDateTime) -> DateTime<FixedOffset> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.fixed_offset(),
        LocalResult::Ambiguous(early, _) => early.fixed_offset(),
        LocalResult::None => {
            // Inside a spring-forward gap; an hour later always exists.
            let shifted = naive + Duration::hours(1);
            match tz.from_local_datetime(&shifted).earliest() {
                Some(dt) => dt.fixed_offset(),
                None => {
                    let offset = tz.offset_from_utc_datetime(&naive).fix();
                    DateTime::from_naive_utc_and_offset(naive - offset, offset)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        assert_eq!(Zone::resolve(""), Zone::Local);
        assert_eq!(Zone::resolve("Not/AZone"), Zone::Local);
        assert_eq!(
            Zone::resolve("Asia/Kolkata"),
            Zone::Named(chrono_tz::Asia::Kolkata)
        );
    }

    #[test]
    fn test_midnight_in_named_zone() {
        let zone = Zone::resolve("Asia/Kolkata");
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let midnight = zone.midnight(date);
        assert_eq!(midnight.to_rfc3339(), "2025-03-10T00:00:00+05:30");
        assert_eq!(
            midnight.with_timezone(&Utc).to_rfc3339(),
            "2025-03-09T18:30:00+00:00"
        );
    }

    #[test]
    fn test_dst_gap_moves_forward() {
        let zone = Zone::resolve("America/New_York");
        let naive = NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        let resolved = zone.wall_clock(naive);
        assert_eq!(resolved.to_rfc3339(), "2025-03-09T03:30:00-04:00");
    }
}
