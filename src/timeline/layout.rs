//! Reshaping blocks for the flat and columnar views.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use super::Block;
use crate::model::Entry;

/// Column label for entries without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Every entry in block order, paired with its `(block, entry)` position.
pub fn flatten(blocks: &[Block]) -> Vec<((usize, usize), &Entry)> {
    blocks
        .iter()
        .enumerate()
        .flat_map(|(b, block)| {
            block
                .entries
                .iter()
                .enumerate()
                .map(move |(e, entry)| ((b, e), entry))
        })
        .collect()
}

/// Flat index of a `(block, entry)` cursor.
pub fn flat_index(blocks: &[Block], block: usize, entry: usize) -> usize {
    blocks
        .iter()
        .take(block)
        .map(|b| b.entries.len())
        .sum::<usize>()
        + entry
}

/// `(block, entry)` position of a flat index, clamped to the last entry.
pub fn position_of(blocks: &[Block], flat: usize) -> (usize, usize) {
    let mut remaining = flat;
    for (b, block) in blocks.iter().enumerate() {
        if remaining < block.entries.len() {
            return (b, remaining);
        }
        remaining -= block.entries.len();
    }
    match blocks.iter().rposition(|b| !b.entries.is_empty()) {
        Some(last) => (last, blocks[last].entries.len() - 1),
        None => (0, 0),
    }
}

/// A kanban column: one category's entries in flattened order.
#[derive(Debug, Clone, PartialEq)]
pub struct KanbanColumn<'a> {
    /// Category label.
    pub category: String,
    /// Entries in the column.
    pub entries: Vec<&'a Entry>,
}

/// Group the flattened entries by category, columns sorted alphabetically.
pub fn kanban_columns(blocks: &[Block]) -> Vec<KanbanColumn<'_>> {
    let mut groups: BTreeMap<String, Vec<&Entry>> = BTreeMap::new();
    for (_, entry) in flatten(blocks) {
        let category = entry.category.trim().to_lowercase();
        let category = if category.is_empty() {
            UNCATEGORIZED.to_string()
        } else {
            category
        };
        groups.entry(category).or_default().push(entry);
    }
    groups
        .into_iter()
        .map(|(category, entries)| KanbanColumn { category, entries })
        .collect()
}

/// Block ordering selected with `o`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Most recent activity.
    #[default]
    Date,
    /// Root category, then recency.
    Category,
    /// Root project, then recency.
    Project,
}

impl SortKey {
    /// Next key in the `o` cycle.
    pub fn cycle(self) -> Self {
        match self {
            Self::Date => Self::Category,
            Self::Category => Self::Project,
            Self::Project => Self::Date,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Date => "date",
            Self::Category => "category",
            Self::Project => "project",
        })
    }
}

/// Reorder blocks in place. `descending` flips the primary key; recency
/// always breaks ties newest first.
pub fn sort_blocks(blocks: &mut [Block], key: SortKey, descending: bool) {
    let primary = |a: &Block, b: &Block| -> Ordering {
        match key {
            SortKey::Date => a.latest.cmp(&b.latest),
            SortKey::Category => a.category.to_lowercase().cmp(&b.category.to_lowercase()),
            SortKey::Project => root_project(a).cmp(root_project(b)),
        }
    };
    blocks.sort_by(|a, b| {
        let ord = primary(a, b);
        let ord = if descending { ord.reverse() } else { ord };
        ord.then_with(|| b.latest.cmp(&a.latest))
    });
}

fn root_project(block: &Block) -> &str {
    block.root().map(Entry::project_str).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn entry(id: i64, category: &str, minutes: i64) -> Entry {
        Entry {
            id,
            timestamp: Utc.with_ymd_and_hms(2025, 6, 11, 9, 0, 0).unwrap()
                + Duration::minutes(minutes),
            category: category.into(),
            text: format!("e{id}"),
            project: None,
            tags: Vec::new(),
            duration_minutes: None,
            thread_id: None,
            parent_id: None,
        }
    }

    fn blocks() -> Vec<Block> {
        vec![
            Block::from_thread(vec![entry(1, "task", 30), entry(2, "task", 40)]).unwrap(),
            Block::from_thread(vec![entry(3, "", 20)]).unwrap(),
            Block::from_thread(vec![entry(4, "note", 10), entry(5, "note", 15)]).unwrap(),
        ]
    }

    #[test]
    fn test_flat_index_round_trip() {
        let blocks = blocks();
        assert_eq!(flat_index(&blocks, 2, 1), 4);
        assert_eq!(position_of(&blocks, 4), (2, 1));
        assert_eq!(position_of(&blocks, 2), (1, 0));
        assert_eq!(position_of(&blocks, 99), (2, 1));
        assert_eq!(position_of(&[], 3), (0, 0));
        assert_eq!(flatten(&blocks).len(), 5);
    }

    #[test]
    fn test_kanban_columns() {
        let blocks = blocks();
        let columns = kanban_columns(&blocks);
        let names: Vec<&str> = columns.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec![UNCATEGORIZED, "note", "task"]);
        assert_eq!(columns[2].entries.len(), 2);
    }

    #[test]
    fn test_kanban_folds_category_case() {
        let blocks = vec![
            Block::from_thread(vec![entry(1, "Task", 10)]).unwrap(),
            Block::from_thread(vec![entry(2, " TASK ", 20)]).unwrap(),
            Block::from_thread(vec![entry(3, "task", 30)]).unwrap(),
        ];
        let columns = kanban_columns(&blocks);
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].category, "task");
        assert_eq!(columns[0].entries.len(), 3);
    }

    #[test]
    fn test_sort_blocks() {
        let mut blocks = blocks();
        sort_blocks(&mut blocks, SortKey::Category, false);
        let cats: Vec<&str> = blocks.iter().map(|b| b.category.as_str()).collect();
        assert_eq!(cats, vec!["", "note", "task"]);

        sort_blocks(&mut blocks, SortKey::Date, true);
        let roots: Vec<i64> = blocks.iter().map(|b| b.root_id).collect();
        assert_eq!(roots, vec![1, 3, 4]);

        sort_blocks(&mut blocks, SortKey::Date, false);
        let roots: Vec<i64> = blocks.iter().map(|b| b.root_id).collect();
        assert_eq!(roots, vec![4, 3, 1]);
        assert_eq!(SortKey::Project.cycle(), SortKey::Date);
    }
}
