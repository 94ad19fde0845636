//! Core data types: logged entries and the write-side requests for them.
//!
//! An [`Entry`] is one timestamped unit of activity. Replies point at their
//! thread root through `thread_id` and at their immediate parent through
//! `parent_id`; an entry without a `thread_id` is a root.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PulseError, Result};

/// Categories with dedicated display conventions.
pub const CANONICAL_CATEGORIES: [&str; 4] = ["note", "task", "meeting", "timer"];

/// Category assigned when none is given.
pub const DEFAULT_CATEGORY: &str = "note";

/// Tag that marks a running timer.
pub const ACTIVE_TAG: &str = "active";

/// A persisted entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Store-assigned identifier.
    pub id: i64,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Free-form category label, lowercased by convention.
    pub category: String,
    /// Primary content.
    pub text: String,
    /// Optional project label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    /// Tag set in insertion order.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Elapsed minutes for timer entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
    /// Root of the thread this entry replies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<i64>,
    /// Immediate parent in a reply chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

impl Entry {
    /// The thread root: `thread_id` when set, otherwise the entry itself.
    pub fn root_id(&self) -> i64 {
        match self.thread_id {
            Some(root) if root > 0 => root,
            _ => self.id,
        }
    }

    /// Whether this entry is a reply within a thread.
    pub fn is_reply(&self) -> bool {
        self.root_id() != self.id
    }

    /// Project label or an empty string.
    pub fn project_str(&self) -> &str {
        self.project.as_deref().unwrap_or("")
    }

    /// Tags joined with commas, as stored.
    pub fn tags_csv(&self) -> String {
        join_tags(&self.tags)
    }

    /// Whether the entry carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A request to insert a new entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewEntry {
    /// Category label; defaults to [`DEFAULT_CATEGORY`] when blank.
    pub category: String,
    /// Content; must be non-empty.
    pub text: String,
    /// Optional project.
    pub project: Option<String>,
    /// Tags.
    pub tags: Vec<String>,
    /// Thread root for replies.
    pub thread_id: Option<i64>,
    /// Immediate parent for replies.
    pub parent_id: Option<i64>,
    /// Explicit timestamp; the store uses the current time when absent.
    pub timestamp: Option<DateTime<Utc>>,
    /// Elapsed minutes.
    pub duration_minutes: Option<i64>,
}

impl NewEntry {
    /// Start a request with category and text.
    pub fn new(category: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set the project; blank values clear it.
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = non_empty(project.into());
        self
    }

    /// Set tags from a comma-separated string.
    pub fn tags_csv(mut self, tags: &str) -> Self {
        self.tags = split_tags(tags);
        self
    }

    /// Set tags.
    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = normalize_tags(tags);
        self
    }

    /// Make this a reply.
    pub fn reply_to(mut self, root: i64, parent: i64) -> Self {
        self.thread_id = Some(root);
        self.parent_id = Some(parent);
        self
    }

    /// Set an explicit timestamp.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set the duration.
    pub fn duration(mut self, minutes: i64) -> Self {
        self.duration_minutes = Some(minutes.max(0));
        self
    }

    /// Trim fields, apply defaults and reject empty text.
    pub fn validated(mut self) -> Result<Self> {
        self.text = self.text.trim().to_string();
        if self.text.is_empty() {
            return Err(PulseError::validation("Text cannot be empty"));
        }
        self.category = normalize_category(&self.category);
        self.project = self.project.and_then(non_empty);
        self.tags = normalize_tags(std::mem::take(&mut self.tags));
        Ok(self)
    }
}

/// A partial update. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryUpdate {
    /// New text.
    pub text: Option<String>,
    /// New project.
    pub project: Option<String>,
    /// New tags.
    pub tags: Option<Vec<String>>,
    /// New category.
    pub category: Option<String>,
    /// New duration.
    pub duration_minutes: Option<i64>,
}

impl EntryUpdate {
    /// Build an update from form-style inputs where an empty string means
    /// "leave unchanged".
    pub fn from_overrides(text: &str, project: &str, tags: &str, category: &str) -> Self {
        Self {
            text: non_empty(text.to_string()),
            project: non_empty(project.to_string()),
            tags: non_empty(tags.to_string()).map(|t| split_tags(&t)),
            category: non_empty(category.to_string()).map(|c| normalize_category(&c)),
            duration_minutes: None,
        }
    }

    /// Whether no field would change.
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.project.is_none()
            && self.tags.is_none()
            && self.category.is_none()
            && self.duration_minutes.is_none()
    }
}

/// A full-text search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// The matching entry.
    pub entry: Entry,
    /// BM25 relevance; lower is better.
    pub rank: f64,
    /// Text excerpt with matches wrapped in `[` `]`.
    pub snippet: String,
}

/// A label with its usage count, used for sidebar filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetItem {
    /// Project, category or tag name.
    pub label: String,
    /// Number of entries carrying the label.
    pub count: usize,
}

impl FacetItem {
    /// Create a facet item.
    pub fn new(label: impl Into<String>, count: usize) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Lowercase and trim; blank becomes [`DEFAULT_CATEGORY`].
pub fn normalize_category(category: &str) -> String {
    let category = category.trim().to_lowercase();
    if category.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        category
    }
}

/// Require one of the canonical categories, as the CLI editor does.
pub fn validate_category(category: &str) -> Result<String> {
    let normalized = category.trim().to_lowercase();
    if CANONICAL_CATEGORIES.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(PulseError::validation(format!(
            "invalid category '{category}'. Valid categories: {}",
            CANONICAL_CATEGORIES.join(", ")
        )))
    }
}

/// Split a comma-separated tag string, trimming and dropping blanks and
/// duplicates.
pub fn split_tags(csv: &str) -> Vec<String> {
    normalize_tags(csv.split(',').map(str::to_string).collect())
}

/// Trim tags and drop blanks and duplicates, keeping first occurrence order.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Join tags for storage.
pub fn join_tags(tags: &[String]) -> String {
    tags.join(",")
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(id: i64, thread_id: Option<i64>) -> Entry {
        Entry {
            id,
            timestamp: Utc::now(),
            category: "note".into(),
            text: "x".into(),
            project: None,
            tags: Vec::new(),
            duration_minutes: None,
            thread_id,
            parent_id: thread_id,
        }
    }

    #[test]
    fn test_root_id() {
        assert_eq!(entry(5, None).root_id(), 5);
        assert_eq!(entry(7, Some(5)).root_id(), 5);
        assert_eq!(entry(7, Some(0)).root_id(), 7);
        assert!(entry(7, Some(5)).is_reply());
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags(" design, doc ,,design"), vec!["design", "doc"]);
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn test_validated() {
        let new = NewEntry::new("  Task ", "  write changelog ")
            .project(" ")
            .tags_csv("a,b")
            .validated()
            .unwrap();
        assert_eq!(new.category, "task");
        assert_eq!(new.text, "write changelog");
        assert_eq!(new.project, None);
        assert!(NewEntry::new("note", "   ").validated().is_err());
        assert_eq!(NewEntry::new("", "x").validated().unwrap().category, "note");
    }

    #[test]
    fn test_validate_category() {
        assert_eq!(validate_category("Meeting").unwrap(), "meeting");
        let err = validate_category("lunch").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid category 'lunch'. Valid categories: note, task, meeting, timer"
        );
    }

    #[test]
    fn test_update_from_overrides() {
        let update = EntryUpdate::from_overrides("new text", "", "", "");
        assert_eq!(update.text.as_deref(), Some("new text"));
        assert!(update.project.is_none());
        assert!(update.tags.is_none());
        assert!(EntryUpdate::from_overrides(" ", "", "", "").is_empty());
    }
}
