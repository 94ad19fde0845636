//! Running timers: `timer` entries tagged `active` until stopped.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::{entry_columns, entry_from_row, format_ts, EntryStore};
use crate::error::{PulseError, Result};
use crate::model::{join_tags, Entry, NewEntry, ACTIVE_TAG};

const TIMER_CATEGORY: &str = "timer";

const ACTIVE_CLAUSE: &str =
    "category = 'timer' AND instr(',' || REPLACE(COALESCE(tags, ''), ', ', ',') || ',', ',active,') > 0";

impl EntryStore {
    /// Start a timer at `now`. Fails when another timer is running unless
    /// `allow_multiple` is set.
    pub fn start_timer(
        &self,
        text: &str,
        project: &str,
        tags: &str,
        allow_multiple: bool,
        now: DateTime<Utc>,
    ) -> Result<Entry> {
        if !allow_multiple && !self.active_timers()?.is_empty() {
            return Err(PulseError::validation(
                "an active timer already exists (use --allow-multiple to override)",
            ));
        }
        let mut tags = crate::model::split_tags(tags);
        tags.retain(|t| t != ACTIVE_TAG);
        tags.push(ACTIVE_TAG.to_string());

        let id = self.insert(
            &NewEntry::new(TIMER_CATEGORY, text)
                .project(project)
                .tags(tags)
                .at(now),
        )?;
        tracing::info!(id, "timer started");
        self.get(id)
    }

    /// Stop timer `id`, or the most recently started active timer.
    ///
    /// Records whole elapsed minutes (never negative), drops the `active`
    /// tag and appends `Stop note: …` when a note is given.
    pub fn stop_timer(
        &self,
        id: Option<i64>,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Entry> {
        let timer = match id {
            Some(id) => {
                let timer = self.get(id).ok().filter(|e| e.category == TIMER_CATEGORY);
                let timer = timer
                    .ok_or_else(|| PulseError::validation(format!("timer #{id} not found")))?;
                if !timer.has_tag(ACTIVE_TAG) {
                    return Err(PulseError::validation(format!("timer #{id} is not active")));
                }
                timer
            }
            None => self
                .latest_active_timer()?
                .ok_or_else(|| PulseError::validation("no active timers"))?,
        };

        let minutes = (now - timer.timestamp).num_minutes().max(0);
        let tags: Vec<String> = timer
            .tags
            .iter()
            .filter(|t| t.as_str() != ACTIVE_TAG)
            .cloned()
            .collect();
        let mut text = timer.text.clone();
        if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
            let sep = if text.contains('\n') { "\n\n" } else { "\n" };
            text = format!("{text}{sep}Stop note: {note}");
        }

        let tags = if tags.is_empty() {
            None
        } else {
            Some(join_tags(&tags))
        };
        self.conn()
            .execute(
                "UPDATE entries SET duration_minutes = ?1, tags = ?2, text = ?3 WHERE id = ?4",
                params![minutes, tags, text, timer.id],
            )
            .map_err(|e| PulseError::store(format!("failed to stop timer {}", timer.id), e))?;
        tracing::info!(id = timer.id, minutes, "timer stopped");
        self.get(timer.id)
    }

    /// Running timers, newest first.
    pub fn active_timers(&self) -> Result<Vec<Entry>> {
        let sql = format!(
            "SELECT {} FROM entries WHERE {ACTIVE_CLAUSE} ORDER BY ts DESC, id DESC",
            entry_columns("")
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map([], entry_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| PulseError::store("failed to load active timers", e))
    }

    fn latest_active_timer(&self) -> Result<Option<Entry>> {
        let sql = format!(
            "SELECT {} FROM entries WHERE {ACTIVE_CLAUSE} ORDER BY ts DESC, id DESC LIMIT 1",
            entry_columns("")
        );
        self.conn()
            .query_row(&sql, [], entry_from_row)
            .optional()
            .map_err(|e| PulseError::store("failed to load active timer", e))
    }

    /// Log a completed timer entry (used by the pomodoro auto-log).
    pub fn log_timer(&self, text: &str, minutes: i64, now: DateTime<Utc>) -> Result<i64> {
        tracing::debug!(at = %format_ts(now), minutes, "logging timer entry");
        self.insert(
            &NewEntry::new(TIMER_CATEGORY, text)
                .duration(minutes)
                .at(now),
        )
    }
}
