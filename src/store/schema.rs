//! Schema migrations.
//!
//! Each entry in [`MIGRATIONS`] is applied once, in order, and recorded in
//! SQLite's `user_version`. Existing databases are upgraded in place.

use rusqlite::Connection;

use crate::error::{PulseError, Result};

/// Entries, their indexes and the external-content FTS5 index.
const V1_ENTRIES: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    id INTEGER PRIMARY KEY,
    ts TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
    category TEXT NOT NULL,
    text TEXT NOT NULL,
    project TEXT,
    tags TEXT,
    duration_minutes INTEGER,
    thread_id INTEGER,
    parent_id INTEGER
);

CREATE INDEX IF NOT EXISTS idx_entries_ts ON entries(ts);
CREATE INDEX IF NOT EXISTS idx_entries_thread ON entries(thread_id);
CREATE INDEX IF NOT EXISTS idx_entries_parent ON entries(parent_id);

CREATE VIRTUAL TABLE IF NOT EXISTS entries_fts USING fts5(
    text,
    tags,
    content='entries',
    content_rowid='id'
);

CREATE TRIGGER IF NOT EXISTS entries_ai AFTER INSERT ON entries BEGIN
    INSERT INTO entries_fts(rowid, text, tags)
    VALUES (new.id, new.text, COALESCE(new.tags, ''));
END;

CREATE TRIGGER IF NOT EXISTS entries_ad AFTER DELETE ON entries BEGIN
    INSERT INTO entries_fts(entries_fts, rowid, text, tags)
    VALUES ('delete', old.id, old.text, COALESCE(old.tags, ''));
END;

CREATE TRIGGER IF NOT EXISTS entries_au AFTER UPDATE OF text, tags ON entries BEGIN
    INSERT INTO entries_fts(entries_fts, rowid, text, tags)
    VALUES ('delete', old.id, old.text, COALESCE(old.tags, ''));
    INSERT INTO entries_fts(rowid, text, tags)
    VALUES (new.id, new.text, COALESCE(new.tags, ''));
END;
"#;

/// User-defined templates.
const V2_TEMPLATES: &str = r#"
CREATE TABLE IF NOT EXISTS templates (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    category TEXT NOT NULL,
    content TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    usage_count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
);
"#;

/// Ordered migration list; the index plus one is the resulting `user_version`.
const MIGRATIONS: &[&str] = &[V1_ENTRIES, V2_TEMPLATES];

/// Current schema version.
pub const SCHEMA_VERSION: i32 = MIGRATIONS.len() as i32;

/// Apply pending migrations.
pub fn migrate(conn: &Connection) -> Result<()> {
    let current: i32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| PulseError::store("failed to read schema version", e))?;

    if current > SCHEMA_VERSION {
        return Err(PulseError::unsupported(format!(
            "database schema version {current} is newer than this build ({SCHEMA_VERSION})"
        )));
    }

    for (index, sql) in MIGRATIONS.iter().enumerate().skip(current.max(0) as usize) {
        let version = index + 1;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| PulseError::store("failed to begin migration", e))?;
        tx.execute_batch(sql)
            .map_err(|e| PulseError::store(format!("migration {version} failed"), e))?;
        tx.execute_batch(&format!("PRAGMA user_version = {version}"))
            .map_err(|e| PulseError::store("failed to record schema version", e))?;
        tx.commit()
            .map_err(|e| PulseError::store("failed to commit migration", e))?;
        tracing::debug!(version, "applied schema migration");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        let version: i32 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_upgrades_from_v1() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(V1_ENTRIES).unwrap();
        conn.execute_batch("PRAGMA user_version = 1").unwrap();
        migrate(&conn).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM templates", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_rejects_newer_schema() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA user_version = 99").unwrap();
        assert!(migrate(&conn).is_err());
    }

    #[test]
    fn test_fts_follows_updates() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn.execute(
            "INSERT INTO entries (category, text, tags) VALUES ('note', 'alpha', 'x')",
            [],
        )
        .unwrap();
        conn.execute("UPDATE entries SET text = 'beta' WHERE id = 1", [])
            .unwrap();
        let hits = |q: &str| -> i64 {
            conn.query_row(
                "SELECT COUNT(*) FROM entries_fts WHERE entries_fts MATCH ?1",
                [q],
                |row| row.get(0),
            )
            .unwrap()
        };
        assert_eq!(hits("alpha"), 0);
        assert_eq!(hits("beta"), 1);
        conn.execute("DELETE FROM entries WHERE id = 1", []).unwrap();
        assert_eq!(hits("beta"), 0);
    }
}
