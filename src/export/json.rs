//! JSON export: an envelope with the export date and the entry list.

use std::io::Write;

use chrono::SecondsFormat;
use serde::Serialize;

use crate::error::Result;
use crate::model::Entry;

use super::{ExportOptions, Exporter};

/// JSON exporter.
#[derive(Debug, Clone)]
pub struct JsonExporter {
    /// Pretty-print the JSON output.
    pretty: bool,
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    export_date: String,
    entries: Vec<ExportEntry<'a>>,
}

#[derive(Serialize)]
struct ExportEntry<'a> {
    id: i64,
    timestamp: String,
    category: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    tags: &'a [String],
    text: &'a str,
}

impl JsonExporter {
    /// Create a new JSON exporter. Output is pretty-printed by default.
    #[must_use]
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Enable or disable pretty-printing.
    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Exporter for JsonExporter {
    fn export_entries<W: Write>(
        &self,
        entries: &[Entry],
        writer: &mut W,
        options: &ExportOptions,
    ) -> Result<()> {
        let envelope = Envelope {
            export_date: options
                .exported_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            entries: entries
                .iter()
                .map(|e| ExportEntry {
                    id: e.id,
                    timestamp: options
                        .zone
                        .localize(e.timestamp)
                        .to_rfc3339_opts(SecondsFormat::Secs, true),
                    category: &e.category,
                    project: e.project.as_deref().filter(|p| !p.trim().is_empty()),
                    tags: &e.tags,
                    text: &e.text,
                })
                .collect(),
        };

        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, &envelope)?;
        } else {
            serde_json::to_writer(&mut *writer, &envelope)?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{options, sample_entries};
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_json_envelope() {
        let mut out = Vec::new();
        JsonExporter::new()
            .export_entries(&sample_entries(), &mut out, &options())
            .unwrap();
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["export_date"], "2025-06-12T08:00:30Z");
        let entries = value["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["project"], "pulse");
        assert_eq!(entries[0]["tags"][1], "doc");
        assert_eq!(entries[0]["timestamp"], "2025-06-11T09:05:00Z");
        assert!(entries[1].get("project").is_none());
        assert!(entries[1].get("tags").is_none());
    }

    #[test]
    fn test_compact_output_is_single_line() {
        let mut out = Vec::new();
        JsonExporter::new()
            .pretty(false)
            .export_entries(&sample_entries(), &mut out, &options())
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
