//! Synthetic entry data for integration tests.
//!
//! Every generator works relative to a pinned instant so scope and window
//! boundaries are reproducible.

#![allow(dead_code)]

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use pulse::config::Zone;
use pulse::model::NewEntry;
use pulse::store::EntryStore;

/// Wednesday 2025-06-11 14:30 UTC.
pub fn pinned_utc() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 11, 14, 30, 0).unwrap()
}

/// [`pinned_utc`] in UTC.
pub fn pinned_now() -> DateTime<FixedOffset> {
    Zone::utc().localize(pinned_utc())
}

/// Minutes before [`pinned_utc`].
pub fn ago(minutes: i64) -> DateTime<Utc> {
    pinned_utc() - Duration::minutes(minutes)
}

/// One root entry to seed.
#[derive(Debug, Clone)]
pub struct Seed {
    /// Category label.
    pub category: &'static str,
    /// Entry text.
    pub text: &'static str,
    /// Project, blank for none.
    pub project: &'static str,
    /// Comma-separated tags.
    pub tags: &'static str,
    /// Minutes before the pinned instant.
    pub minutes_ago: i64,
    /// Logged duration.
    pub duration: Option<i64>,
}

impl Seed {
    /// A seed with no project, tags or duration.
    pub const fn new(category: &'static str, text: &'static str, minutes_ago: i64) -> Self {
        Self {
            category,
            text,
            project: "",
            tags: "",
            minutes_ago,
            duration: None,
        }
    }

    /// Set the project.
    pub const fn project(mut self, project: &'static str) -> Self {
        self.project = project;
        self
    }

    /// Set the tags.
    pub const fn tags(mut self, tags: &'static str) -> Self {
        self.tags = tags;
        self
    }

    /// Set the duration.
    pub const fn duration(mut self, minutes: i64) -> Self {
        self.duration = Some(minutes);
        self
    }

    fn to_new_entry(&self) -> NewEntry {
        let entry = NewEntry::new(self.category, self.text)
            .project(self.project)
            .tags_csv(self.tags)
            .at(ago(self.minutes_ago));
        match self.duration {
            Some(minutes) => entry.duration(minutes),
            None => entry,
        }
    }
}

/// Insert `seed` and return its id.
pub fn insert(store: &EntryStore, seed: &Seed) -> i64 {
    store.insert(&seed.to_new_entry()).unwrap()
}

/// Insert a reply to `parent` in thread `root`, `minutes_ago` before the
/// pinned instant.
pub fn reply(store: &EntryStore, root: i64, parent: i64, text: &str, minutes_ago: i64) -> i64 {
    let parent_entry = store.get(parent).unwrap();
    store
        .insert(
            &NewEntry::new(parent_entry.category.clone(), text)
                .project(parent_entry.project_str())
                .tags(parent_entry.tags.clone())
                .reply_to(root, parent)
                .at(ago(minutes_ago)),
        )
        .unwrap()
}

/// A realistic week of entries.
///
/// | id | category | when             | notes                       |
/// |----|----------|------------------|-----------------------------|
/// | 1  | task     | today 09:00      | project api, tags bug,auth  |
/// | 2  | meeting  | today 10:00      | project api, 30 minutes     |
/// | 3  | note     | yesterday 16:00  | no project                  |
/// | 4  | timer    | Monday 11:00     | project web, 90 minutes     |
/// | 5  | task     | last month       | project web, tag bug        |
/// | 6  | reply to 3, today 13:00                                  |
pub fn seeded_week() -> EntryStore {
    let store = EntryStore::open_in_memory().unwrap();
    let seeds = [
        Seed::new("task", "fix login redirect", 330)
            .project("api")
            .tags("bug, auth"),
        Seed::new("meeting", "sprint planning", 270)
            .project("api")
            .duration(30),
        Seed::new("note", "read the sqlite docs", 60 * 22 + 30),
        Seed::new("timer", "frontend polish", 60 * 51 + 30)
            .project("web")
            .duration(90),
        Seed::new("task", "archive old builds", 60 * 24 * 20)
            .project("web")
            .tags("bug"),
    ];
    for seed in &seeds {
        insert(&store, seed);
    }
    reply(&store, 3, 3, "fts5 supports prefix queries", 90);
    store
}
