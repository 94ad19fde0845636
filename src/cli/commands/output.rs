//! Output rendering for `list` and `search`.
//!
//! Both commands build an [`EntryList`] and hand it to a [`Renderer`] for
//! the requested [`OutputFormat`]. Colors come from `console` and switch off
//! automatically when stdout is not a terminal.

use std::io::Write;

use chrono::{DateTime, FixedOffset};
use console::{Style, Term};
use indexmap::IndexMap;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::config::Zone;
use crate::error::Result;
use crate::model::{Entry, SearchHit};
use crate::util::pagination::Pagination;
use crate::util::truncate;

const MAX_RULE_WIDTH: usize = 120;
const TABLE_TEXT_WIDTH: usize = 50;
const COMPACT_TEXT_WIDTH: usize = 80;

/// One entry as presented on the command line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListedEntry {
    /// Entry id.
    pub id: i64,
    /// Creation time in the display zone.
    pub timestamp: DateTime<FixedOffset>,
    /// Category label.
    pub category: String,
    /// Full text.
    pub text: String,
    /// Project or empty.
    pub project: String,
    /// Comma-separated tags.
    pub tags: String,
    /// Elapsed minutes for timers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
    /// BM25 relevance for search hits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_rank: Option<f64>,
    /// Highlighted excerpt for search hits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_snippet: Option<String>,
}

impl ListedEntry {
    /// Present a stored entry in `zone`.
    pub fn from_entry(entry: &Entry, zone: &Zone) -> Self {
        Self {
            id: entry.id,
            timestamp: zone.localize(entry.timestamp),
            category: entry.category.clone(),
            text: entry.text.clone(),
            project: entry.project_str().to_string(),
            tags: entry.tags_csv(),
            duration_minutes: entry.duration_minutes,
            search_rank: None,
            search_snippet: None,
        }
    }

    /// Present a search hit in `zone`.
    pub fn from_hit(hit: &SearchHit, zone: &Zone) -> Self {
        Self {
            search_rank: Some(hit.rank),
            search_snippet: Some(hit.snippet.clone()),
            ..Self::from_entry(&hit.entry, zone)
        }
    }

    fn single_line_text(&self) -> String {
        self.text.replace('\n', " ")
    }
}

/// A page of entries plus the context needed to describe it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryList {
    /// Entries on this page.
    pub entries: Vec<ListedEntry>,
    /// Matches across all pages.
    pub total: usize,
    /// Current page, 1-based.
    pub page: usize,
    /// Page size.
    pub per_page: usize,
    /// Number of pages.
    pub total_pages: usize,
    /// Search query, when this is a search result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Human-readable description of the applied filters.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub filters: IndexMap<String, String>,
}

impl EntryList {
    /// A paginated listing.
    pub fn page(entries: Vec<ListedEntry>, pagination: &Pagination) -> Self {
        Self {
            entries,
            total: pagination.total,
            page: pagination.current,
            per_page: pagination.per_page,
            total_pages: pagination.total_pages,
            query: None,
            filters: IndexMap::new(),
        }
    }

    /// A single page of search results.
    pub fn search(entries: Vec<ListedEntry>, query: &str, limit: usize) -> Self {
        let total = entries.len();
        Self {
            entries,
            total,
            page: 1,
            per_page: limit,
            total_pages: 1,
            query: Some(query.to_string()),
            filters: IndexMap::new(),
        }
    }

    /// Record a filter for the header and JSON output.
    #[must_use]
    pub fn filter(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.filters.insert(name.to_string(), value);
        }
        self
    }

    fn pagination(&self) -> Pagination {
        Pagination::new(self.total, self.per_page, self.page)
    }
}

struct Styles {
    base: Style,
    title: Style,
    rule: Style,
    meta: Style,
    project: Style,
    tags: Style,
    highlight: Style,
}

impl Styles {
    /// Terminal-detected styling, or none at all when `color` is off.
    fn new(color: bool) -> Self {
        let base = if color {
            Style::new()
        } else {
            Style::new().force_styling(false)
        };
        Self {
            title: base.clone().green().bold(),
            rule: base.clone().black().bright(),
            meta: base.clone().dim(),
            project: base.clone().blue(),
            tags: base.clone().magenta().dim(),
            highlight: base.clone().yellow().bold(),
            base,
        }
    }

    fn category(&self, category: &str) -> Style {
        let style = self.base.clone().bold();
        match category.to_lowercase().as_str() {
            "task" => style.yellow(),
            "meeting" => style.magenta(),
            "timer" => style.green(),
            "note" => style.blue(),
            _ => style.cyan(),
        }
    }
}

/// Writes an [`EntryList`] in one [`OutputFormat`].
pub struct Renderer {
    format: OutputFormat,
    width: usize,
    styles: Styles,
}

impl Renderer {
    /// A renderer sized to the current terminal.
    pub fn new(format: OutputFormat) -> Self {
        let width = Term::stdout()
            .size_checked()
            .map_or(100, |(_, cols)| usize::from(cols));
        Self {
            format,
            width: width.clamp(40, MAX_RULE_WIDTH),
            styles: Styles::new(true),
        }
    }

    /// Drop all styling, whatever the terminal supports.
    #[must_use]
    pub fn without_color(mut self) -> Self {
        self.styles = Styles::new(false);
        self
    }

    /// Write `list` to `out`.
    pub fn render<W: Write>(&self, list: &EntryList, out: &mut W) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                writeln!(out, "{}", serde_json::to_string_pretty(list)?)?;
            }
            OutputFormat::Csv => self.render_csv(list, out)?,
            OutputFormat::Table => self.render_table(list, out)?,
            OutputFormat::Compact => self.render_compact(list, out)?,
            OutputFormat::Quiet => {
                for entry in &list.entries {
                    writeln!(out, "{}", entry.single_line_text())?;
                }
            }
            OutputFormat::Default => self.render_default(list, out)?,
        }
        Ok(())
    }

    fn rule(&self) -> String {
        self.styles.rule.apply_to("─".repeat(self.width)).to_string()
    }

    fn render_default<W: Write>(&self, list: &EntryList, out: &mut W) -> Result<()> {
        let s = &self.styles;
        match &list.query {
            Some(query) => writeln!(
                out,
                "{}  {}{query}",
                s.title.apply_to("Search Results"),
                s.rule.apply_to("query: ")
            )?,
            None => {
                let mut header = s.title.apply_to("Recent Entries").to_string();
                if let Some(since) = list.filters.get("since") {
                    header.push_str(&format!(
                        "  {}{}",
                        s.rule.apply_to("since "),
                        s.meta.apply_to(since)
                    ));
                }
                writeln!(out, "{header}")?;
            }
        }
        writeln!(out, "{}", self.rule())?;

        if list.entries.is_empty() {
            let message = if list.query.is_some() {
                "no results"
            } else {
                "No entries found."
            };
            writeln!(out, "{}", s.meta.apply_to(message))?;
            return Ok(());
        }

        let pagination = list.pagination();
        if list.total_pages > 1 {
            writeln!(out, "{}", s.meta.apply_to(pagination.format_summary()))?;
            writeln!(out, "{}", self.rule())?;
        }

        for entry in &list.entries {
            self.render_entry(entry, out)?;
            writeln!(out, "{}", self.rule())?;
        }

        let navigation = pagination.format_navigation();
        if !navigation.is_empty() {
            writeln!(out, "{}", s.meta.apply_to(navigation))?;
        }
        Ok(())
    }

    fn render_entry<W: Write>(&self, entry: &ListedEntry, out: &mut W) -> Result<()> {
        let s = &self.styles;
        let mut meta = vec![
            s.meta.apply_to(format!("[{}]", entry.id)).to_string(),
            s.meta
                .apply_to(entry.timestamp.format("%I:%M %p").to_string())
                .to_string(),
            s.meta
                .apply_to(entry.timestamp.format("%Y-%m-%d").to_string())
                .to_string(),
            self.styles.category(&entry.category)
                .apply_to(&entry.category)
                .to_string(),
        ];
        if !entry.project.is_empty() {
            meta.push(s.project.apply_to(format!("[{}]", entry.project)).to_string());
        }
        if !entry.tags.is_empty() {
            meta.push(s.tags.apply_to(hashtags(&entry.tags)).to_string());
        }
        writeln!(out, "{}", meta.join("  "))?;

        match &entry.search_snippet {
            Some(snippet) => writeln!(out, "  {}", self.highlight(snippet))?,
            None => {
                for line in entry.text.lines() {
                    writeln!(out, "  {line}")?;
                }
            }
        }

        let mut extra = Vec::new();
        if let Some(minutes) = entry.duration_minutes.filter(|m| *m > 0) {
            extra.push(format!("duration: {minutes}m"));
        }
        if let Some(rank) = entry.search_rank {
            extra.push(format!("rank: {rank:.2}"));
        }
        if !extra.is_empty() {
            writeln!(out, "{}", s.meta.apply_to(format!("  {}", extra.join(" | "))))?;
        }
        Ok(())
    }

    /// Style the `[match]` markers the search index puts around hits.
    fn highlight(&self, snippet: &str) -> String {
        let mut out = String::with_capacity(snippet.len());
        let mut rest = snippet;
        while let Some(start) = rest.find('[') {
            let Some(len) = rest[start..].find(']') else {
                break;
            };
            out.push_str(&rest[..start]);
            out.push_str(
                &self
                    .styles
                    .highlight
                    .apply_to(&rest[start..=start + len])
                    .to_string(),
            );
            rest = &rest[start + len + 1..];
        }
        out.push_str(rest);
        out
    }

    fn render_csv<W: Write>(&self, list: &EntryList, out: &mut W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        let mut header = vec![
            "id",
            "timestamp",
            "category",
            "text",
            "project",
            "tags",
            "duration_minutes",
        ];
        if list.query.is_some() {
            header.extend(["search_rank", "search_snippet"]);
        }
        writer.write_record(&header)?;

        for entry in &list.entries {
            let mut record = vec![
                entry.id.to_string(),
                entry.timestamp.to_rfc3339(),
                entry.category.clone(),
                entry.text.clone(),
                entry.project.clone(),
                entry.tags.clone(),
                entry.duration_minutes.unwrap_or(0).to_string(),
            ];
            if list.query.is_some() {
                record.push(format!("{:.2}", entry.search_rank.unwrap_or_default()));
                record.push(entry.search_snippet.clone().unwrap_or_default());
            }
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn render_table<W: Write>(&self, list: &EntryList, out: &mut W) -> Result<()> {
        writeln!(out, "ID\tTime\tCategory\tProject\tTags\tText")?;
        writeln!(out, "{}", "-".repeat(self.width))?;
        for entry in &list.entries {
            writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}\t{}",
                entry.id,
                entry.timestamp.format("%H:%M"),
                entry.category,
                entry.project,
                if entry.tags.is_empty() {
                    String::new()
                } else {
                    hashtags(&entry.tags)
                },
                truncate(&entry.single_line_text(), TABLE_TEXT_WIDTH)
            )?;
        }
        Ok(())
    }

    fn render_compact<W: Write>(&self, list: &EntryList, out: &mut W) -> Result<()> {
        for entry in &list.entries {
            let mut line = format!(
                "{} {} {}",
                self.styles.meta.apply_to(entry.timestamp.format("%H:%M")),
                self.styles.category(&entry.category).apply_to(&entry.category),
                truncate(&entry.single_line_text(), COMPACT_TEXT_WIDTH)
            );
            if !entry.project.is_empty() {
                line.push(' ');
                line.push_str(
                    &self
                        .styles
                        .project
                        .apply_to(format!("[{}]", entry.project))
                        .to_string(),
                );
            }
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

}

fn hashtags(tags_csv: &str) -> String {
    tags_csv
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!("#{t}"))
        .collect::<Vec<_>>()
        .join(" ")
}
