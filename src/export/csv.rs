//! CSV export for spreadsheet analysis.

use std::io::Write;

use chrono::SecondsFormat;

use crate::error::Result;
use crate::model::Entry;

use super::{ExportOptions, Exporter};

/// CSV exporter. Tags are joined with `;` so the column stays a single field.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    /// Include header row.
    include_header: bool,
    /// Field delimiter.
    delimiter: u8,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvExporter {
    /// Create a new CSV exporter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            include_header: true,
            delimiter: b',',
        }
    }

    /// Include or exclude header row.
    #[must_use]
    pub fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Set the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl Exporter for CsvExporter {
    fn export_entries<W: Write>(
        &self,
        entries: &[Entry],
        writer: &mut W,
        options: &ExportOptions,
    ) -> Result<()> {
        let mut out = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        if self.include_header {
            out.write_record(["ID", "Timestamp", "Category", "Project", "Tags", "Text"])?;
        }
        for entry in entries {
            let timestamp = options
                .zone
                .localize(entry.timestamp)
                .to_rfc3339_opts(SecondsFormat::Secs, true);
            out.write_record([
                entry.id.to_string().as_str(),
                timestamp.as_str(),
                entry.category.as_str(),
                entry.project_str(),
                entry.tags.join(";").as_str(),
                entry.text.as_str(),
            ])?;
        }
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{options, sample_entries};
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_csv_quoting() {
        let mut out = Vec::new();
        CsvExporter::new()
            .export_entries(&sample_entries(), &mut out, &options())
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ID,Timestamp,Category,Project,Tags,Text");
        assert_eq!(
            lines[1],
            "1,2025-06-11T09:05:00Z,task,pulse,design;doc,\"write \"\"export\"\" code\""
        );
        assert_eq!(lines[2], "2,2025-06-11T14:30:00Z,note,,,\"follow-up, with comma\"");
    }

    #[test]
    fn test_csv_without_header() {
        let mut out = Vec::new();
        CsvExporter::new()
            .with_header(false)
            .with_delimiter(b'\t')
            .export_entries(&sample_entries()[..1], &mut out, &options())
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("1\t2025-06-11T09:05:00Z\ttask"));
    }
}
