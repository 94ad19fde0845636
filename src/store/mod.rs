//! The entry store: an embedded SQLite database with a full-text index.
//!
//! [`EntryStore`] owns one connection. Every mutation is a single statement
//! or a single transaction, so a reload that follows a write always sees
//! committed state. Background readers open their own connection through
//! [`EntryStore::reopen`].
//!
//! # Example
//!
//! ```
//! use pulse::model::NewEntry;
//! use pulse::store::{EntryFilter, EntryStore};
//!
//! let store = EntryStore::open_in_memory()?;
//! let id = store.insert(&NewEntry::new("task", "write docs").project("pulse"))?;
//! let roots = store.query_roots(&EntryFilter::default())?;
//! assert_eq!(roots[0].0, id);
//! # Ok::<(), pulse::PulseError>(())
//! ```

mod filter;
mod schema;
mod stats;
mod suggest;
mod templates;
mod timers;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::error::{PulseError, Result};
use crate::model::{join_tags, split_tags, Entry, EntryUpdate, FacetItem, NewEntry, SearchHit};

pub use filter::{EntryFilter, TagMode};
pub use schema::SCHEMA_VERSION;
pub use stats::CategorySummary;
pub use suggest::SuggestSource;
pub use templates::TemplateRecord;

/// Distinct projects, categories and tags with usage counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    /// Non-blank projects, most used first.
    pub projects: Vec<FacetItem>,
    /// Lowercased categories, most used first.
    pub categories: Vec<FacetItem>,
    /// Individual tags, most used first, ties alphabetical.
    pub tags: Vec<FacetItem>,
}

/// Handle to the entries database.
pub struct EntryStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for EntryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl EntryStore {
    /// Open (creating if needed) the database at `path` and apply migrations.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                PulseError::io(format!("failed to create {}", parent.display()), e)
            })?;
        }
        let conn = Connection::open(path)
            .map_err(|e| PulseError::store(format!("failed to open {}", path.display()), e))?;
        apply_pragmas(&conn, true)?;
        schema::migrate(&conn)?;
        debug!(path = %path.display(), "opened entry store");
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open the database at the default data location.
    pub fn open_default() -> Result<Self> {
        Self::open(&crate::config::default_db_path()?)
    }

    /// An empty in-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| PulseError::store("failed to open in-memory database", e))?;
        apply_pragmas(&conn, false)?;
        schema::migrate(&conn)?;
        Ok(Self { conn, path: None })
    }

    /// Database file, if this store is backed by one.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Open a second connection to the same file, for background readers.
    /// In-memory stores cannot be shared and return `None`.
    pub fn reopen(&self) -> Option<Result<Self>> {
        self.path.as_deref().map(Self::open)
    }

    // ----- writes --------------------------------------------------------

    /// Insert an entry and return its id.
    pub fn insert(&self, entry: &NewEntry) -> Result<i64> {
        let entry = entry.clone().validated()?;
        let ts = format_ts(entry.timestamp.unwrap_or_else(Utc::now));
        let tags = tags_column(&entry.tags);
        self.conn
            .execute(
                "INSERT INTO entries (ts, category, text, project, tags, duration_minutes, thread_id, parent_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    ts,
                    entry.category,
                    entry.text,
                    entry.project,
                    tags,
                    entry.duration_minutes,
                    entry.thread_id,
                    entry.parent_id
                ],
            )
            .map_err(|e| PulseError::store("failed to insert entry", e))?;
        let id = self.conn.last_insert_rowid();
        debug!(id, category = %entry.category, "inserted entry");
        Ok(id)
    }

    /// Reply to `parent_id`. The reply joins the parent's thread, takes the
    /// parent's category, and inherits project and tags when the overrides
    /// are blank.
    pub fn reply(&self, parent_id: i64, text: &str, project: &str, tags: &str) -> Result<i64> {
        let parent = self.get(parent_id)?;
        let project = if project.trim().is_empty() {
            parent.project_str().to_string()
        } else {
            project.to_string()
        };
        let tags = if tags.trim().is_empty() {
            parent.tags.clone()
        } else {
            split_tags(tags)
        };
        let reply = NewEntry::new(parent.category.to_lowercase(), text)
            .project(project)
            .tags(tags)
            .reply_to(parent.root_id(), parent.id);
        self.insert(&reply)
    }

    /// Copy an entry as a new root with ` (copy)` appended to its text.
    pub fn duplicate(&self, id: i64) -> Result<i64> {
        let original = self.get(id)?;
        let mut copy = NewEntry::new(original.category.clone(), format!("{} (copy)", original.text))
            .project(original.project_str())
            .tags(original.tags.clone());
        copy.duration_minutes = original.duration_minutes;
        self.insert(&copy)
    }

    /// Apply a partial update. Unset fields keep their stored values.
    pub fn update(&self, id: i64, update: &EntryUpdate) -> Result<()> {
        if update.is_empty() {
            return Err(PulseError::validation(
                "nothing to update - specify at least one field to edit",
            ));
        }
        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(text) = &update.text {
            let text = text.trim();
            if text.is_empty() {
                return Err(PulseError::validation("Text cannot be empty"));
            }
            sets.push("text = ?");
            values.push(Value::Text(text.to_string()));
        }
        if let Some(project) = &update.project {
            sets.push("project = ?");
            values.push(nullable_text(project.trim()));
        }
        if let Some(tags) = &update.tags {
            sets.push("tags = ?");
            values.push(tags_column(tags).map_or(Value::Null, Value::Text));
        }
        if let Some(category) = &update.category {
            sets.push("category = ?");
            values.push(Value::Text(crate::model::normalize_category(category)));
        }
        if let Some(minutes) = update.duration_minutes {
            sets.push("duration_minutes = ?");
            values.push(Value::Integer(minutes.max(0)));
        }
        values.push(Value::Integer(id));

        let sql = format!("UPDATE entries SET {} WHERE id = ?", sets.join(", "));
        let changed = self
            .conn
            .execute(&sql, params_from_iter(values))
            .map_err(|e| PulseError::store(format!("failed to update entry {id}"), e))?;
        if changed == 0 {
            return Err(PulseError::not_found("entry", id));
        }
        debug!(id, fields = sets.len(), "updated entry");
        Ok(())
    }

    /// Delete an entry, keeping its thread reachable.
    ///
    /// Deleting a root that has replies promotes the oldest reply to root;
    /// its id is returned. Deleting a reply moves its children onto its
    /// own parent.
    pub fn delete(&self, id: i64) -> Result<Option<i64>> {
        let entry = self.get(id)?;
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| PulseError::store("failed to begin delete", e))?;

        let mut promoted = None;
        if entry.is_reply() {
            let new_parent = entry.parent_id.unwrap_or_else(|| entry.root_id());
            tx.execute(
                "UPDATE entries SET parent_id = ?1 WHERE parent_id = ?2",
                params![new_parent, id],
            )?;
        } else {
            let successor: Option<i64> = tx
                .query_row(
                    "SELECT id FROM entries WHERE thread_id = ?1 ORDER BY ts ASC, id ASC LIMIT 1",
                    [id],
                    |row| row.get(0),
                )
                .optional()?;
            if let Some(successor) = successor {
                tx.execute(
                    "UPDATE entries SET thread_id = NULL, parent_id = NULL WHERE id = ?1",
                    [successor],
                )?;
                tx.execute(
                    "UPDATE entries SET thread_id = ?1 WHERE thread_id = ?2",
                    params![successor, id],
                )?;
                tx.execute(
                    "UPDATE entries SET parent_id = ?1 WHERE parent_id = ?2 AND id != ?1",
                    params![successor, id],
                )?;
                promoted = Some(successor);
            }
        }

        tx.execute("DELETE FROM entries WHERE id = ?1", [id])?;
        tx.commit()
            .map_err(|e| PulseError::store(format!("failed to delete entry {id}"), e))?;
        match promoted {
            Some(root) => info!(id, promoted = root, "deleted thread root, promoted oldest reply"),
            None => debug!(id, "deleted entry"),
        }
        Ok(promoted)
    }

    // ----- reads ---------------------------------------------------------

    /// Fetch one entry.
    pub fn get(&self, id: i64) -> Result<Entry> {
        let sql = format!("SELECT {} FROM entries WHERE id = ?1", entry_columns(""));
        self.conn
            .query_row(&sql, [id], entry_from_row)
            .optional()
            .map_err(|e| PulseError::store(format!("failed to load entry {id}"), e))?
            .ok_or_else(|| PulseError::not_found("entry", id))
    }

    /// Distinct thread roots with a matching member, paired with the newest
    /// matching timestamp, most recent first.
    pub fn query_roots(&self, filter: &EntryFilter) -> Result<Vec<(i64, DateTime<Utc>)>> {
        let (clause, values) = filter.to_sql("");
        let sql = format!(
            "SELECT COALESCE(thread_id, id) AS root, MAX(ts) AS latest
             FROM entries WHERE {clause}
             GROUP BY root ORDER BY latest DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), |row| {
            Ok((row.get::<_, i64>(0)?, parse_ts_column(row, 1)?))
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| PulseError::store("failed to query thread roots", e))
    }

    /// Every entry of a thread, ordered by timestamp then id.
    pub fn query_thread(&self, root_id: i64) -> Result<Vec<Entry>> {
        let sql = format!(
            "SELECT {} FROM entries WHERE id = ?1 OR thread_id = ?1 ORDER BY ts ASC, id ASC",
            entry_columns("")
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([root_id], entry_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| PulseError::store(format!("failed to load thread {root_id}"), e))
    }

    /// Usage counts over the whole store, ignoring any time window.
    pub fn query_facets(&self) -> Result<Facets> {
        let projects = self.count_pairs(
            "SELECT project, COUNT(*) AS n FROM entries
             WHERE project IS NOT NULL AND TRIM(project) != ''
             GROUP BY project ORDER BY n DESC, project ASC",
        )?;
        let categories = self.count_pairs(
            "SELECT lower(category) AS c, COUNT(*) AS n FROM entries
             GROUP BY c ORDER BY n DESC, c ASC",
        )?;

        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut stmt = self
            .conn
            .prepare("SELECT tags FROM entries WHERE tags IS NOT NULL AND tags != ''")?;
        let raw = stmt.query_map([], |row| row.get::<_, String>(0))?;
        for tags in raw {
            for tag in split_tags(&tags?) {
                *counts.entry(tag).or_default() += 1;
            }
        }
        let mut tags: Vec<FacetItem> = counts
            .into_iter()
            .map(|(label, count)| FacetItem { label, count })
            .collect();
        tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));

        Ok(Facets {
            projects,
            categories,
            tags,
        })
    }

    fn count_pairs(&self, sql: &str) -> Result<Vec<FacetItem>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| {
            let count: i64 = row.get(1)?;
            Ok(FacetItem::new(row.get::<_, String>(0)?, count.max(0) as usize))
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| PulseError::store("failed to load facets", e))
    }

    /// Full-text search over text and tags, best match first.
    pub fn full_text_search(
        &self,
        query: &str,
        filter: &EntryFilter,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        let Some(match_expr) = fts_query(query) else {
            return Ok(Vec::new());
        };
        let (clause, mut values) = filter.to_sql("e");
        let sql = format!(
            "SELECT {}, bm25(entries_fts) AS rank,
                    snippet(entries_fts, 0, '[', ']', '…', 8) AS snip
             FROM entries_fts JOIN entries e ON e.id = entries_fts.rowid
             WHERE entries_fts MATCH ? AND {clause}
             ORDER BY rank ASC, e.ts DESC
             LIMIT ?",
            entry_columns("e")
        );
        values.insert(0, Value::Text(match_expr));
        values.push(Value::Integer(limit as i64));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), |row| {
            Ok(SearchHit {
                entry: entry_from_row(row)?,
                rank: row.get(9)?,
                snippet: row.get(10)?,
            })
        })?;
        let hits = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| PulseError::store("search failed", e))?;
        debug!(query, hits = hits.len(), "full-text search");
        Ok(hits)
    }

    /// A page of entries, newest first.
    pub fn list(&self, filter: &EntryFilter, limit: usize, offset: usize) -> Result<Vec<Entry>> {
        let (clause, mut values) = filter.to_sql("");
        let sql = format!(
            "SELECT {} FROM entries WHERE {clause} ORDER BY ts DESC, id DESC LIMIT ? OFFSET ?",
            entry_columns("")
        );
        values.push(Value::Integer(limit as i64));
        values.push(Value::Integer(offset as i64));
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), entry_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| PulseError::store("failed to list entries", e))
    }

    /// Number of entries matching `filter`.
    pub fn count(&self, filter: &EntryFilter) -> Result<usize> {
        let (clause, values) = filter.to_sql("");
        let sql = format!("SELECT COUNT(*) FROM entries WHERE {clause}");
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(values), |row| row.get(0))
            .map_err(|e| PulseError::store("failed to count entries", e))?;
        Ok(count.max(0) as usize)
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}

fn apply_pragmas(conn: &Connection, file_backed: bool) -> Result<()> {
    let mut pragma_sql = String::from("PRAGMA foreign_keys=ON;\n");
    if file_backed {
        pragma_sql.push_str("PRAGMA journal_mode=WAL;\nPRAGMA synchronous=NORMAL;\n");
    }
    conn.execute_batch(&pragma_sql)
        .map_err(|e| PulseError::store("failed to apply pragmas", e))?;
    conn.busy_timeout(std::time::Duration::from_millis(5000))
        .map_err(|e| PulseError::store("failed to set busy timeout", e))?;
    register_functions(conn)
}

/// SQLite's built-in `lower()` folds ASCII only; `fold_case()` folds the
/// full Unicode range so filters agree with Rust's `to_lowercase`.
fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "fold_case",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|v| v.to_lowercase()))
        },
    )
    .map_err(|e| PulseError::store("failed to register fold_case", e))
}

/// Storage format for timestamps: RFC 3339 UTC, second precision.
pub(crate) fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a stored timestamp. Older rows may use SQLite's `YYYY-MM-DD HH:MM:SS`.
pub(crate) fn parse_ts(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

fn parse_ts_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_ts(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("invalid timestamp: {raw}").into(),
        )
    })
}

pub(crate) fn entry_columns(alias: &str) -> String {
    const COLUMNS: [&str; 9] = [
        "id",
        "ts",
        "category",
        "text",
        "project",
        "tags",
        "duration_minutes",
        "thread_id",
        "parent_id",
    ];
    if alias.is_empty() {
        COLUMNS.join(", ")
    } else {
        COLUMNS
            .iter()
            .map(|c| format!("{alias}.{c}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Map a row selected with [`entry_columns`].
pub(crate) fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<Entry> {
    let project: Option<String> = row.get(4)?;
    let tags: Option<String> = row.get(5)?;
    Ok(Entry {
        id: row.get(0)?,
        timestamp: parse_ts_column(row, 1)?,
        category: row.get(2)?,
        text: row.get(3)?,
        project: project.filter(|p| !p.trim().is_empty()),
        tags: tags.as_deref().map(split_tags).unwrap_or_default(),
        duration_minutes: row.get(6)?,
        thread_id: row.get(7)?,
        parent_id: row.get(8)?,
    })
}

fn tags_column(tags: &[String]) -> Option<String> {
    if tags.is_empty() {
        None
    } else {
        Some(join_tags(tags))
    }
}

fn nullable_text(value: &str) -> Value {
    if value.is_empty() {
        Value::Null
    } else {
        Value::Text(value.to_string())
    }
}

/// Quote each word as an FTS5 prefix term so user input never hits the
/// query syntax. Returns `None` for blank input.
fn fts_query(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split_whitespace()
        .filter(|word| word.chars().any(char::is_alphanumeric))
        .map(|word| format!("\"{}\"*", word.replace('"', "\"\"")))
        .collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}
