//! Markdown export for entries and threads.

use std::io::Write;

use crate::config::Zone;
use crate::error::Result;
use crate::model::Entry;
use crate::timeline::Block;

use super::{ExportOptions, Exporter};

/// Markdown exporter: one section per entry, separated by rules.
#[derive(Debug, Clone)]
pub struct MarkdownExporter {
    /// Document title.
    title: String,
}

impl Default for MarkdownExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownExporter {
    /// Create a new Markdown exporter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "Pulse Export".to_string(),
        }
    }

    /// Set the document title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    fn export_entry<W: Write>(&self, entry: &Entry, writer: &mut W, zone: &Zone) -> Result<()> {
        let when = zone.localize(entry.timestamp).format("%Y-%m-%d %H:%M");
        writeln!(writer, "## Entry #{} - {when}\n", entry.id)?;
        writeln!(writer, "**Category:** {}", entry.category.to_uppercase())?;
        if let Some(project) = entry.project.as_deref().filter(|p| !p.trim().is_empty()) {
            writeln!(writer, "**Project:** {project}")?;
        }
        if !entry.tags.is_empty() {
            writeln!(writer, "**Tags:** {}", hashtags(&entry.tags))?;
        }
        writeln!(writer, "\n{}\n", entry.text)?;
        writeln!(writer, "---\n")?;
        Ok(())
    }
}

impl Exporter for MarkdownExporter {
    fn export_entries<W: Write>(
        &self,
        entries: &[Entry],
        writer: &mut W,
        options: &ExportOptions,
    ) -> Result<()> {
        writeln!(writer, "# {}\n", self.title)?;
        writeln!(
            writer,
            "Exported on: {}\n",
            options.exported_at.format("%Y-%m-%d %H:%M:%S")
        )?;
        for entry in entries {
            self.export_entry(entry, writer, &options.zone)?;
        }
        Ok(())
    }
}

/// A thread as a markdown transcript: a heading per entry with its time and
/// metadata, followed by the text.
pub fn thread_markdown(block: &Block, zone: &Zone) -> String {
    let mut out = format!("# Thread {}\n\n", block.root_id);
    for entry in &block.entries {
        let when = zone.localize(entry.timestamp).format("%Y-%m-%d %I:%M %p");
        let mut meta = vec![entry.category.to_uppercase()];
        if let Some(project) = entry.project.as_deref().filter(|p| !p.trim().is_empty()) {
            meta.push(format!("[{project}]"));
        }
        if !entry.tags.is_empty() {
            meta.push(hashtags(&entry.tags));
        }
        out.push_str(&format!("## #{}  {when}  - {}\n\n", entry.id, meta.join("  ")));
        if !entry.text.trim().is_empty() {
            out.push_str(&entry.text);
            out.push_str("\n\n");
        }
    }
    out
}

fn hashtags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| format!("#{t}"))
        .collect::<Vec<_>>()
        .join(" ")
}
