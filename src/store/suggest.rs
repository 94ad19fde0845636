//! Completion candidates for the project, category and tag inputs.
//!
//! Matching is a case-folded substring test. Exact matches rank first,
//! then prefix matches, then the most recently used.

use rusqlite::params;

use super::EntryStore;
use crate::error::Result;
use crate::model::split_tags;

/// Which column a completion draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuggestSource {
    /// Distinct projects.
    Projects,
    /// Individual tags.
    Tags,
    /// Distinct categories, lowercased.
    Categories,
}

impl EntryStore {
    /// Completions for `query` from `source`, at most `limit`. A blank
    /// query yields nothing.
    pub fn suggest(&self, source: SuggestSource, query: &str, limit: usize) -> Result<Vec<String>> {
        match source {
            SuggestSource::Projects => self.suggest_projects(query, limit),
            SuggestSource::Tags => self.suggest_tags(query, limit),
            SuggestSource::Categories => self.suggest_categories(query, limit),
        }
    }

    /// Projects containing `query`.
    pub fn suggest_projects(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        self.suggest_column(
            "SELECT project FROM entries
             WHERE project IS NOT NULL AND TRIM(project) != ''
               AND instr(fold_case(project), ?1) > 0
             GROUP BY project
             ORDER BY CASE
                 WHEN fold_case(project) = ?1 THEN 0
                 WHEN instr(fold_case(project), ?1) = 1 THEN 1
                 ELSE 2 END,
               MAX(ts) DESC, project ASC
             LIMIT ?2",
            query,
            limit,
        )
    }

    /// Categories containing `query`.
    pub fn suggest_categories(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        self.suggest_column(
            "SELECT lower(category) AS c FROM entries
             WHERE instr(fold_case(category), ?1) > 0
             GROUP BY c
             ORDER BY CASE WHEN c = ?1 THEN 0 WHEN instr(c, ?1) = 1 THEN 1 ELSE 2 END,
               MAX(ts) DESC, c ASC
             LIMIT ?2",
            query,
            limit,
        )
    }

    /// Individual tags containing `query`, newest use first within a rank.
    pub fn suggest_tags(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(
            "SELECT tags FROM entries
             WHERE tags IS NOT NULL AND instr(fold_case(tags), ?1) > 0
             ORDER BY ts DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![needle], |row| row.get::<_, String>(0))?;

        let mut found: Vec<(u8, String)> = Vec::new();
        for tags in rows {
            for tag in split_tags(&tags?) {
                let folded = tag.to_lowercase();
                if !folded.contains(&needle) || found.iter().any(|(_, t)| *t == tag) {
                    continue;
                }
                let rank = if folded == needle {
                    0
                } else if folded.starts_with(&needle) {
                    1
                } else {
                    2
                };
                found.push((rank, tag));
            }
        }
        // Stable, so recency order survives within each rank.
        found.sort_by_key(|(rank, _)| *rank);
        Ok(found.into_iter().take(limit).map(|(_, tag)| tag).collect())
    }

    fn suggest_column(&self, sql: &str, query: &str, limit: usize) -> Result<Vec<String>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params![needle, limit], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewEntry;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn store() -> EntryStore {
        let store = EntryStore::open_in_memory().unwrap();
        let rows = [
            ("task", "Backend", "api, backlog", 8),
            ("note", "api", "apple", 9),
            ("Meeting", "rapid", "api", 10),
            ("task", "Backend", "zebra", 11),
        ];
        for (category, project, tags, hour) in rows {
            store
                .insert(
                    &NewEntry::new(category, "x")
                        .project(project)
                        .tags_csv(tags)
                        .at(Utc.with_ymd_and_hms(2025, 6, 11, hour, 0, 0).unwrap()),
                )
                .unwrap();
        }
        store
    }

    #[test]
    fn test_projects_rank_exact_then_prefix_then_recent() {
        let store = store();
        assert_eq!(store.suggest_projects("API", 5).unwrap(), vec!["api", "rapid"]);
        assert_eq!(store.suggest_projects("ba", 5).unwrap(), vec!["Backend"]);
        // "rapid" and "Backend" tie on rank; Backend was used more recently.
        assert_eq!(store.suggest_projects("a", 2).unwrap(), vec!["api", "Backend"]);
    }

    #[test]
    fn test_tags_are_split_and_deduplicated() {
        let store = store();
        assert_eq!(store.suggest_tags("ap", 5).unwrap(), vec!["api", "apple"]);
        assert_eq!(store.suggest_tags("api", 5).unwrap(), vec!["api"]);
        assert_eq!(store.suggest_tags("b", 5).unwrap(), vec!["backlog", "zebra"]);
    }

    #[test]
    fn test_categories_are_lowercased() {
        let store = store();
        assert_eq!(
            store.suggest(SuggestSource::Categories, "MEE", 5).unwrap(),
            vec!["meeting"]
        );
    }

    #[test]
    fn test_blank_query_suggests_nothing() {
        let store = store();
        assert!(store.suggest_projects("  ", 5).unwrap().is_empty());
        assert!(store.suggest_tags("", 5).unwrap().is_empty());
    }
}
