//! Range reads that feed summaries, analytics and the calendar.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::params;
use serde::Serialize;

use super::{entry_columns, entry_from_row, format_ts, parse_ts, EntryStore};
use crate::config::Zone;
use crate::error::{PulseError, Result};
use crate::model::Entry;

/// Item count and logged minutes for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    /// Lowercased category.
    pub category: String,
    /// Number of entries.
    pub items: usize,
    /// Sum of `duration_minutes`.
    pub minutes: i64,
}

impl EntryStore {
    /// Entries in `[since, until)`, oldest first. `until = None` is open-ended.
    pub fn entries_between(
        &self,
        since: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
    ) -> Result<Vec<Entry>> {
        let until = until.map(format_ts).unwrap_or_else(|| "9999".to_string());
        let sql = format!(
            "SELECT {} FROM entries WHERE ts >= ?1 AND ts < ?2 ORDER BY ts ASC, id ASC",
            entry_columns("")
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params![format_ts(since), until], entry_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| PulseError::store("failed to load entries in range", e))
    }

    /// Per-category counts and minutes for `[since, until)`, busiest first.
    pub fn category_summary(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<CategorySummary>> {
        let mut stmt = self.conn().prepare(
            "SELECT lower(category) AS c, COUNT(*), COALESCE(SUM(duration_minutes), 0)
             FROM entries WHERE ts >= ?1 AND ts < ?2
             GROUP BY c ORDER BY COUNT(*) DESC, c ASC",
        )?;
        let rows = stmt.query_map(params![format_ts(since), format_ts(until)], |row| {
            let items: i64 = row.get(1)?;
            Ok(CategorySummary {
                category: row.get(0)?,
                items: items.max(0) as usize,
                minutes: row.get(2)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| PulseError::store("failed to summarize categories", e))
    }

    /// Entry counts per local calendar date within `[start, end)`.
    pub fn entry_counts_by_date(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        zone: &Zone,
    ) -> Result<BTreeMap<NaiveDate, usize>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT ts FROM entries WHERE ts >= ?1 AND ts < ?2")?;
        let rows = stmt.query_map(params![format_ts(start), format_ts(end)], |row| {
            row.get::<_, String>(0)
        })?;
        let mut counts = BTreeMap::new();
        for raw in rows {
            let raw = raw.map_err(|e| PulseError::store("failed to count entries by date", e))?;
            if let Some(ts) = parse_ts(&raw) {
                *counts.entry(zone.localize(ts).date_naive()).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewEntry;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
    }

    fn seeded() -> EntryStore {
        let store = EntryStore::open_in_memory().unwrap();
        store.insert(&NewEntry::new("Task", "a").at(at(10, 9))).unwrap();
        store
            .insert(&NewEntry::new("timer", "b").duration(30).at(at(10, 23)))
            .unwrap();
        store
            .insert(&NewEntry::new("timer", "c").duration(15).at(at(11, 1)))
            .unwrap();
        store.insert(&NewEntry::new("task", "d").at(at(12, 8))).unwrap();
        store
    }

    #[test]
    fn test_entries_between() {
        let store = seeded();
        let texts: Vec<String> = store
            .entries_between(at(10, 12), Some(at(12, 0)))
            .unwrap()
            .into_iter()
            .map(|e| e.text)
            .collect();
        assert_eq!(texts, vec!["b", "c"]);
        assert_eq!(store.entries_between(at(10, 0), None).unwrap().len(), 4);
    }

    #[test]
    fn test_category_summary() {
        let summary = seeded().category_summary(at(10, 0), at(13, 0)).unwrap();
        assert_eq!(
            summary,
            vec![
                CategorySummary {
                    category: "task".into(),
                    items: 2,
                    minutes: 0
                },
                CategorySummary {
                    category: "timer".into(),
                    items: 2,
                    minutes: 45
                },
            ]
        );
    }

    #[test]
    fn test_counts_use_local_dates() {
        let store = seeded();
        let zone = Zone::resolve("Asia/Kolkata");
        let counts = store.entry_counts_by_date(at(1, 0), at(30, 0), &zone).unwrap();
        let day = |d| NaiveDate::from_ymd_opt(2025, 6, d).unwrap();
        // 23:00 UTC on the 10th is already the 11th in Kolkata.
        assert_eq!(counts.get(&day(10)), Some(&1));
        assert_eq!(counts.get(&day(11)), Some(&2));
        assert_eq!(counts.get(&day(12)), Some(&1));
    }
}
