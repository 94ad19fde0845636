//! Daily reminder scheduling.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime};

use super::{ReminderConfig, Zone};

/// Fallback reminder time when the configured one does not parse.
const DEFAULT_TIME: (u32, u32) = (17, 0);

/// Upper bound on days scanned before giving up (no workday configured).
const MAX_SCAN_DAYS: u32 = 366;

/// Next reminder instant strictly after `now` that falls on a workday and is
/// not a holiday. Returns `None` when no day qualifies within a year.
pub fn next_at(
    now: DateTime<FixedOffset>,
    reminder: &ReminderConfig,
    zone: &Zone,
) -> Option<DateTime<FixedOffset>> {
    let time = NaiveTime::parse_from_str(reminder.time.trim(), "%H:%M")
        .ok()
        .or_else(|| NaiveTime::from_hms_opt(DEFAULT_TIME.0, DEFAULT_TIME.1, 0))?;

    let mut day = now.date_naive();
    let mut candidate = zone.wall_clock(day.and_time(time));
    if now >= candidate {
        day += Duration::days(1);
    }

    for _ in 0..MAX_SCAN_DAYS {
        candidate = zone.wall_clock(day.and_time(time));
        let weekday = super::weekday_abbrev(day.weekday());
        let is_workday = reminder.workdays.iter().any(|d| d == weekday);
        let is_holiday = reminder
            .holidays
            .iter()
            .any(|h| h.trim() == day.format("%Y-%m-%d").to_string());
        if is_workday && !is_holiday {
            return Some(candidate);
        }
        day += Duration::days(1);
    }
    None
}
