//! Timeline aggregation: flat entry rows reshaped into threaded blocks.
//!
//! [`load_blocks`] resolves a [`Scope`] and a [`Filter`] into a predicate,
//! discovers the thread roots with at least one matching member, and then
//! loads every member of each qualifying thread. A reply that matches pulls
//! in its whole conversation; the newest member decides block order.
//!
//! [`load_facets`] reports project, category and tag usage across the whole
//! store for the sidebar.

mod layout;
mod scope;

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::debug;

use crate::config::Zone;
use crate::error::Result;
use crate::model::Entry;
use crate::store::{EntryFilter, EntryStore, Facets, TagMode};

pub use layout::{
    flat_index, flatten, kanban_columns, position_of, sort_blocks, KanbanColumn, SortKey,
    UNCATEGORIZED,
};
pub use scope::Scope;

/// A thread: root first, replies in ascending timestamp order.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Id of the root entry.
    pub root_id: i64,
    /// Category of the root entry.
    pub category: String,
    /// Members, root first.
    pub entries: Vec<Entry>,
    /// Newest member timestamp.
    pub latest: DateTime<Utc>,
}

impl Block {
    /// Build a block from a thread's members. Returns `None` when empty.
    pub fn from_thread(entries: Vec<Entry>) -> Option<Self> {
        let root = entries.first()?;
        let latest = entries.iter().map(|e| e.timestamp).max()?;
        Some(Self {
            root_id: root.root_id(),
            category: root.category.clone(),
            latest,
            entries,
        })
    }

    /// The root entry.
    pub fn root(&self) -> Option<&Entry> {
        self.entries.first()
    }

    /// Number of replies.
    pub fn reply_count(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }
}

/// Active timeline filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    /// Case-insensitive substring over text, project and tags.
    pub text: String,
    /// Single selected project.
    pub project: Option<String>,
    /// Single selected category.
    pub category: Option<String>,
    /// Selected tags.
    pub tags: BTreeSet<String>,
    /// Whether any selected tag suffices (otherwise all are required).
    pub any_tags: bool,
}

impl Filter {
    /// Whether nothing narrows the timeline.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
            && self.project.is_none()
            && self.category.is_none()
            && self.tags.is_empty()
    }

    /// Select `project`, or clear it when it is already selected.
    pub fn toggle_project(&mut self, project: &str) {
        toggle_single(&mut self.project, project);
    }

    /// Select `category`, or clear it when it is already selected.
    pub fn toggle_category(&mut self, category: &str) {
        toggle_single(&mut self.category, category);
    }

    /// Add or remove a tag from the selection.
    pub fn toggle_tag(&mut self, tag: &str) {
        if !self.tags.remove(tag) {
            self.tags.insert(tag.to_string());
        }
    }

    /// Store predicate for this filter from `since` onwards.
    pub fn to_entry_filter(&self, since: DateTime<Utc>) -> EntryFilter {
        let text = self.text.trim();
        EntryFilter {
            since: Some(since),
            until: None,
            text: (!text.is_empty()).then(|| text.to_string()),
            projects: self.project.iter().cloned().collect(),
            categories: self.category.iter().cloned().collect(),
            tags: self.tags.iter().cloned().collect(),
            tag_mode: if self.any_tags {
                TagMode::Any
            } else {
                TagMode::All
            },
        }
    }
}

fn toggle_single(slot: &mut Option<String>, value: &str) {
    if slot.as_deref() == Some(value) {
        *slot = None;
    } else {
        *slot = Some(value.to_string());
    }
}

/// Load the blocks visible under `scope` and `filter`, most recently active
/// thread first.
pub fn load_blocks(
    store: &EntryStore,
    zone: &Zone,
    now: DateTime<FixedOffset>,
    scope: &Scope,
    filter: &Filter,
) -> Result<Vec<Block>> {
    let predicate = filter.to_entry_filter(scope.start(now, zone));
    let roots = store.query_roots(&predicate)?;

    let mut blocks = Vec::with_capacity(roots.len());
    for (root_id, _) in roots {
        let thread = store.query_thread(root_id)?;
        // A root deleted between the two queries yields nothing.
        if let Some(block) = Block::from_thread(thread) {
            blocks.push(block);
        }
    }
    blocks.sort_by(|a, b| b.latest.cmp(&a.latest));

    debug!(scope = %scope, blocks = blocks.len(), "loaded timeline");
    Ok(blocks)
}

/// Project, category and tag usage across the whole store.
pub fn load_facets(store: &EntryStore) -> Result<Facets> {
    store.query_facets()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewEntry;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<FixedOffset> {
        Zone::utc().localize(Utc.with_ymd_and_hms(2025, 6, 11, 14, 0, 0).unwrap())
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 11, h, m, 0).unwrap()
    }

    #[test]
    fn test_reply_match_pulls_whole_thread() {
        let store = EntryStore::open_in_memory().unwrap();
        let root = store
            .insert(&NewEntry::new("note", "planning").at(at(9, 0)))
            .unwrap();
        store
            .insert(&NewEntry::new("note", "needle here").reply_to(root, root).at(at(10, 0)))
            .unwrap();
        store
            .insert(&NewEntry::new("note", "unrelated").at(at(9, 30)))
            .unwrap();

        let filter = Filter {
            text: "NEEDLE".into(),
            ..Filter::default()
        };
        let blocks = load_blocks(&store, &Zone::utc(), now(), &Scope::Today, &filter).unwrap();
        assert_eq!(blocks.len(), 1);
        let texts: Vec<&str> = blocks[0].entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["planning", "needle here"]);
        assert_eq!(blocks[0].latest, at(10, 0));
    }

    #[test]
    fn test_blocks_sorted_by_latest_member() {
        let store = EntryStore::open_in_memory().unwrap();
        let a = store.insert(&NewEntry::new("note", "a").at(at(8, 0))).unwrap();
        let b = store.insert(&NewEntry::new("task", "b").at(at(9, 0))).unwrap();
        store
            .insert(&NewEntry::new("note", "a2").reply_to(a, a).at(at(11, 0)))
            .unwrap();

        let blocks =
            load_blocks(&store, &Zone::utc(), now(), &Scope::Today, &Filter::default()).unwrap();
        let roots: Vec<i64> = blocks.iter().map(|b| b.root_id).collect();
        assert_eq!(roots, vec![a, b]);
        assert_eq!(blocks[1].category, "task");
    }

    #[test]
    fn test_filter_toggles() {
        let mut filter = Filter::default();
        filter.toggle_project("api");
        filter.toggle_project("web");
        assert_eq!(filter.project.as_deref(), Some("web"));
        filter.toggle_project("web");
        assert_eq!(filter.project, None);

        filter.toggle_tag("a");
        filter.toggle_tag("b");
        filter.toggle_tag("a");
        assert_eq!(filter.tags.iter().collect::<Vec<_>>(), vec!["b"]);
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_empty_store() {
        let store = EntryStore::open_in_memory().unwrap();
        let blocks =
            load_blocks(&store, &Zone::utc(), now(), &Scope::All, &Filter::default()).unwrap();
        assert!(blocks.is_empty());
    }
}
