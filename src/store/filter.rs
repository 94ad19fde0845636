//! Entry predicates shared by listing, root discovery and search.

use chrono::{DateTime, Utc};
use rusqlite::types::Value;

use super::format_ts;

/// How multiple tag filters combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagMode {
    /// Every tag must be present.
    #[default]
    All,
    /// At least one tag must be present.
    Any,
}

/// A predicate over entries. Empty fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFilter {
    /// Inclusive lower bound.
    pub since: Option<DateTime<Utc>>,
    /// Exclusive upper bound.
    pub until: Option<DateTime<Utc>>,
    /// Case-insensitive substring of text, project or tags.
    pub text: Option<String>,
    /// Accepted projects (exact match, any of).
    pub projects: Vec<String>,
    /// Accepted categories (case-insensitive, any of).
    pub categories: Vec<String>,
    /// Required tags, combined per [`EntryFilter::tag_mode`].
    pub tags: Vec<String>,
    /// Tag combination mode.
    pub tag_mode: TagMode,
}

impl EntryFilter {
    /// Entries at or after `since`.
    pub fn since(since: DateTime<Utc>) -> Self {
        Self {
            since: Some(since),
            ..Self::default()
        }
    }

    /// Render as a SQL condition over columns qualified with `alias`
    /// (pass `""` for unqualified columns) plus its bound values.
    pub(crate) fn to_sql(&self, alias: &str) -> (String, Vec<Value>) {
        let col = |name: &str| {
            if alias.is_empty() {
                name.to_string()
            } else {
                format!("{alias}.{name}")
            }
        };
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(since) = self.since {
            clauses.push(format!("{} >= ?", col("ts")));
            values.push(Value::Text(format_ts(since)));
        }
        if let Some(until) = self.until {
            clauses.push(format!("{} < ?", col("ts")));
            values.push(Value::Text(format_ts(until)));
        }
        if let Some(text) = self.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let needle = text.to_lowercase();
            clauses.push(format!(
                "(instr(fold_case({t}), ?) > 0 OR instr(fold_case(COALESCE({p}, '')), ?) > 0 \
                 OR instr(fold_case(COALESCE({g}, '')), ?) > 0)",
                t = col("text"),
                p = col("project"),
                g = col("tags"),
            ));
            for _ in 0..3 {
                values.push(Value::Text(needle.clone()));
            }
        }
        if !self.projects.is_empty() {
            let marks = vec!["?"; self.projects.len()].join(", ");
            clauses.push(format!("{} IN ({marks})", col("project")));
            values.extend(self.projects.iter().cloned().map(Value::Text));
        }
        if !self.categories.is_empty() {
            let marks = vec!["?"; self.categories.len()].join(", ");
            clauses.push(format!("lower({}) IN ({marks})", col("category")));
            values.extend(
                self.categories
                    .iter()
                    .map(|c| Value::Text(c.trim().to_lowercase())),
            );
        }
        if !self.tags.is_empty() {
            let tag_match = format!(
                "instr(',' || REPLACE(COALESCE({}, ''), ', ', ',') || ',', ',' || ? || ',') > 0",
                col("tags")
            );
            let joiner = match self.tag_mode {
                TagMode::All => " AND ",
                TagMode::Any => " OR ",
            };
            let parts = vec![tag_match.as_str(); self.tags.len()].join(joiner);
            clauses.push(format!("({parts})"));
            values.extend(self.tags.iter().map(|t| Value::Text(t.trim().to_string())));
        }

        if clauses.is_empty() {
            ("1 = 1".to_string(), values)
        } else {
            (clauses.join(" AND "), values)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_matches_all() {
        let (sql, values) = EntryFilter::default().to_sql("");
        assert_eq!(sql, "1 = 1");
        assert!(values.is_empty());
    }

    #[test]
    fn test_tag_mode_joiner() {
        let mut filter = EntryFilter {
            tags: vec!["a".into(), "b".into()],
            ..EntryFilter::default()
        };
        let (sql, values) = filter.to_sql("e");
        assert!(sql.contains(" AND instr"));
        assert!(sql.contains("e.tags"));
        assert_eq!(values.len(), 2);

        filter.tag_mode = TagMode::Any;
        let (sql, _) = filter.to_sql("");
        assert!(sql.contains(" OR instr"));
    }

    #[test]
    fn test_blank_text_is_ignored() {
        let filter = EntryFilter {
            text: Some("   ".into()),
            ..EntryFilter::default()
        };
        assert_eq!(filter.to_sql("").0, "1 = 1");
    }
}
