//! Export of logged entries to files.
//!
//! Two shapes are supported:
//! - A single thread as a markdown transcript ([`export_thread`]), written
//!   from the timeline with `x`.
//! - A bulk dump of every loaded entry as Markdown, JSON or CSV
//!   ([`export_to_file`]), written from the export dialog.
//!
//! All files are written atomically into the exports directory.

mod csv;
mod json;
mod markdown;

pub use self::csv::CsvExporter;
pub use json::JsonExporter;
pub use markdown::{thread_markdown, MarkdownExporter};

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use tracing::info;

use crate::config::Zone;
use crate::error::{PulseError, Result};
use crate::model::Entry;
use crate::timeline::Block;
use crate::util::atomic_write_with;

/// Settings shared by every exporter.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Zone used for human-readable timestamps.
    pub zone: Zone,
    /// The moment of export, recorded in file headers and names.
    pub exported_at: DateTime<FixedOffset>,
}

impl ExportOptions {
    /// Options for an export happening at `exported_at`.
    pub fn new(zone: Zone, exported_at: DateTime<FixedOffset>) -> Self {
        Self { zone, exported_at }
    }
}

/// Bulk export format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// Markdown document.
    #[default]
    Markdown,
    /// Pretty-printed JSON.
    Json,
    /// Comma separated values.
    Csv,
}

impl ExportFormat {
    /// Get the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// Format bound to a number key in the export dialog.
    pub fn from_digit(key: char) -> Option<Self> {
        match key {
            '1' => Some(Self::Markdown),
            '2' => Some(Self::Json),
            '3' => Some(Self::Csv),
            _ => None,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Markdown => "Markdown",
            Self::Json => "JSON",
            Self::Csv => "CSV",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(PulseError::InvalidArgument {
                name: "format".to_string(),
                reason: format!("unknown export format: {other}"),
            }),
        }
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Export entries to the writer.
    fn export_entries<W: Write>(
        &self,
        entries: &[Entry],
        writer: &mut W,
        options: &ExportOptions,
    ) -> Result<()>;
}

/// File name for a bulk export made at `at`.
pub fn export_filename(format: ExportFormat, at: DateTime<FixedOffset>) -> String {
    format!(
        "pulse-export-{}.{}",
        at.format("%Y%m%d-%H%M%S"),
        format.extension()
    )
}

/// Export entries to a file.
///
/// Content is rendered into memory first and then written atomically, so a
/// failed export never leaves a truncated file behind.
pub fn export_to_file(
    entries: &[Entry],
    path: impl AsRef<Path>,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<()> {
    let path = path.as_ref();
    let content = export_to_string(entries, format, options)?;
    atomic_write_with(path, |w| w.write_all(content.as_bytes()))?;
    info!(path = %path.display(), entries = entries.len(), %format, "exported entries");
    Ok(())
}

/// Export entries to a string.
pub fn export_to_string(
    entries: &[Entry],
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<String> {
    let mut buffer = Vec::new();

    match format {
        ExportFormat::Markdown => {
            MarkdownExporter::new().export_entries(entries, &mut buffer, options)?;
        }
        ExportFormat::Json => {
            JsonExporter::new().export_entries(entries, &mut buffer, options)?;
        }
        ExportFormat::Csv => {
            CsvExporter::new().export_entries(entries, &mut buffer, options)?;
        }
    }

    String::from_utf8(buffer).map_err(|e| PulseError::ExportError {
        message: "export produced invalid UTF-8".to_string(),
        source: Some(Box::new(e)),
    })
}

/// Write `entries` into `dir` as a timestamped bulk export and return the
/// path of the new file.
pub fn export_into_dir(
    entries: &[Entry],
    dir: &Path,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<PathBuf> {
    let path = dir.join(export_filename(format, options.exported_at));
    export_to_file(entries, &path, format, options)?;
    Ok(path)
}

/// Write one thread as `thread-{root}-{stamp}.md` into `dir` and return the
/// path of the new file.
pub fn export_thread(block: &Block, dir: &Path, options: &ExportOptions) -> Result<PathBuf> {
    let path = dir.join(format!(
        "thread-{}-{}.md",
        block.root_id,
        options.exported_at.format("%Y%m%d-%H%M%S")
    ));
    let content = thread_markdown(block, &options.zone);
    atomic_write_with(&path, |w| w.write_all(content.as_bytes()))?;
    info!(path = %path.display(), root = block.root_id, "exported thread");
    Ok(path)
}
