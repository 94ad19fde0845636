//! User-defined templates persisted next to entries.

use chrono::{DateTime, Utc};
use rusqlite::params;
use serde::Serialize;

use super::{format_ts, parse_ts, EntryStore};
use crate::error::{PulseError, Result};

/// A stored user template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateRecord {
    /// Slug derived from the name.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Library category the template is listed under.
    pub category: String,
    /// Body with `{{variable}}` placeholders.
    pub content: String,
    /// Short description.
    pub description: String,
    /// Times the template was used.
    pub usage_count: i64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl TemplateRecord {
    /// Build a new record; the id is the lowercased name with spaces
    /// replaced by underscores.
    pub fn new(name: &str, category: &str, content: &str, description: &str) -> Result<Self> {
        let name = name.trim();
        let category = category.trim();
        if name.is_empty() {
            return Err(PulseError::validation("template name cannot be empty"));
        }
        if category.is_empty() {
            return Err(PulseError::validation("template category cannot be empty"));
        }
        if content.trim().is_empty() {
            return Err(PulseError::validation("template content cannot be empty"));
        }
        Ok(Self {
            id: name.to_lowercase().replace(' ', "_"),
            name: name.to_string(),
            category: category.to_string(),
            content: content.to_string(),
            description: description.trim().to_string(),
            usage_count: 0,
            created_at: Utc::now(),
        })
    }
}

impl EntryStore {
    /// All user templates, ordered by category then name.
    pub fn list_templates(&self) -> Result<Vec<TemplateRecord>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, category, content, description, usage_count, created_at
             FROM templates ORDER BY category ASC, name ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            let created: String = row.get(6)?;
            Ok(TemplateRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                category: row.get(2)?,
                content: row.get(3)?,
                description: row.get(4)?,
                usage_count: row.get(5)?,
                created_at: parse_ts(&created).unwrap_or_default(),
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| PulseError::store("failed to load templates", e))
    }

    /// Persist a new template. Ids must be unique.
    pub fn create_template(&self, template: &TemplateRecord) -> Result<()> {
        let inserted = self
            .conn()
            .execute(
                "INSERT OR IGNORE INTO templates
                 (id, name, category, content, description, usage_count, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    template.id,
                    template.name,
                    template.category,
                    template.content,
                    template.description,
                    template.usage_count,
                    format_ts(template.created_at)
                ],
            )
            .map_err(|e| PulseError::store("failed to create template", e))?;
        if inserted == 0 {
            return Err(PulseError::validation(format!(
                "template '{}' already exists",
                template.id
            )));
        }
        tracing::debug!(id = %template.id, "created template");
        Ok(())
    }

    /// Bump a template's usage counter. Unknown ids are ignored so built-in
    /// templates can share the call site.
    pub fn record_template_usage(&self, id: &str) -> Result<()> {
        self.conn()
            .execute(
                "UPDATE templates SET usage_count = usage_count + 1 WHERE id = ?1",
                [id],
            )
            .map_err(|e| PulseError::store("failed to record template usage", e))?;
        Ok(())
    }

    /// Remove a user template.
    pub fn delete_template(&self, id: &str) -> Result<()> {
        let removed = self
            .conn()
            .execute("DELETE FROM templates WHERE id = ?1", [id])
            .map_err(|e| PulseError::store("failed to delete template", e))?;
        if removed == 0 {
            return Err(PulseError::not_found("template", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_validation() {
        assert_eq!(
            TemplateRecord::new(" ", "Work", "x", "").unwrap_err().to_string(),
            "template name cannot be empty"
        );
        assert_eq!(
            TemplateRecord::new("n", "", "x", "").unwrap_err().to_string(),
            "template category cannot be empty"
        );
        assert_eq!(
            TemplateRecord::new("n", "Work", "  ", "").unwrap_err().to_string(),
            "template content cannot be empty"
        );
        assert_eq!(
            TemplateRecord::new("Weekly Retro", "Work", "x", "").unwrap().id,
            "weekly_retro"
        );
    }

    #[test]
    fn test_crud() {
        let store = EntryStore::open_in_memory().unwrap();
        let record = TemplateRecord::new("Weekly Retro", "Work", "## Wins\n", "retro").unwrap();
        store.create_template(&record).unwrap();
        assert!(store.create_template(&record).is_err());

        store.record_template_usage("weekly_retro").unwrap();
        store.record_template_usage("builtin_only").unwrap();
        let all = store.list_templates().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].usage_count, 1);

        store.delete_template("weekly_retro").unwrap();
        assert!(store.delete_template("weekly_retro").is_err());
    }
}
