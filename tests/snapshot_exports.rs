//! Snapshot tests for export formats using insta.
//!
//! These tests verify that export output remains consistent across changes.
//! Run `cargo insta review` to update snapshots after intentional changes.

use chrono::{TimeZone, Utc};
use insta::assert_snapshot;
use pulse::config::Zone;
use pulse::export::{
    export_to_string, thread_markdown, CsvExporter, ExportFormat, ExportOptions, Exporter,
};
use pulse::model::Entry;
use pulse::timeline::Block;

fn entry(id: i64, hour: u32, minute: u32, category: &str, text: &str) -> Entry {
    Entry {
        id,
        timestamp: Utc.with_ymd_and_hms(2025, 6, 11, hour, minute, 0).unwrap(),
        category: category.to_string(),
        text: text.to_string(),
        project: None,
        tags: Vec::new(),
        duration_minutes: None,
        thread_id: None,
        parent_id: None,
    }
}

/// A task with a reply, and an unrelated meeting.
fn sample_entries() -> Vec<Entry> {
    let mut notes = entry(1, 9, 5, "task", "write release notes");
    notes.project = Some("pulse".to_string());
    notes.tags = vec!["docs".to_string(), "release".to_string()];

    let mut retro = entry(2, 11, 40, "meeting", "retro, with \"quotes\"");
    retro.duration_minutes = Some(45);

    let mut published = entry(3, 13, 15, "task", "published");
    published.project = Some("pulse".to_string());
    published.tags = vec!["docs".to_string()];
    published.thread_id = Some(1);
    published.parent_id = Some(1);

    vec![notes, retro, published]
}

/// Fixed export options for consistent snapshots.
fn options() -> ExportOptions {
    let zone = Zone::utc();
    let at = zone.localize(Utc.with_ymd_and_hms(2025, 6, 12, 8, 0, 30).unwrap());
    ExportOptions::new(zone, at)
}

// =============================================================================
// Bulk exports
// =============================================================================

#[test]
fn csv_bulk() {
    let output = export_to_string(&sample_entries(), ExportFormat::Csv, &options()).unwrap();
    assert_snapshot!(output, @r##"
    ID,Timestamp,Category,Project,Tags,Text
    1,2025-06-11T09:05:00Z,task,pulse,docs;release,write release notes
    2,2025-06-11T11:40:00Z,meeting,,,"retro, with ""quotes"""
    3,2025-06-11T13:15:00Z,task,pulse,docs,published
    "##);
}

#[test]
fn csv_semicolon_without_header() {
    let mut buffer = Vec::new();
    CsvExporter::new()
        .with_header(false)
        .with_delimiter(b';')
        .export_entries(&sample_entries()[..1], &mut buffer, &options())
        .unwrap();
    let output = String::from_utf8(buffer).unwrap();
    assert_snapshot!(output, @r##"1;2025-06-11T09:05:00Z;task;pulse;"docs;release";write release notes"##);
}

#[test]
fn markdown_bulk() {
    let output =
        export_to_string(&sample_entries()[..2], ExportFormat::Markdown, &options()).unwrap();
    assert_snapshot!(output, @r##"
    # Pulse Export

    Exported on: 2025-06-12 08:00:30

    ## Entry #1 - 2025-06-11 09:05

    **Category:** TASK
    **Project:** pulse
    **Tags:** #docs #release

    write release notes

    ---

    ## Entry #2 - 2025-06-11 11:40

    **Category:** MEETING

    retro, with "quotes"

    ---
    "##);
}

#[test]
fn json_bulk() {
    let output =
        export_to_string(&sample_entries()[..2], ExportFormat::Json, &options()).unwrap();
    assert_snapshot!(output, @r##"
    {
      "export_date": "2025-06-12T08:00:30Z",
      "entries": [
        {
          "id": 1,
          "timestamp": "2025-06-11T09:05:00Z",
          "category": "task",
          "project": "pulse",
          "tags": [
            "docs",
            "release"
          ],
          "text": "write release notes"
        },
        {
          "id": 2,
          "timestamp": "2025-06-11T11:40:00Z",
          "category": "meeting",
          "text": "retro, with \"quotes\""
        }
      ]
    }
    "##);
}

// =============================================================================
// Thread transcripts
// =============================================================================

#[test]
fn thread_in_named_zone() {
    let entries = sample_entries();
    let block = Block::from_thread(vec![entries[0].clone(), entries[2].clone()]).unwrap();
    let output = thread_markdown(&block, &Zone::resolve("America/New_York"));
    assert_snapshot!(output, @r##"
    # Thread 1

    ## #1  2025-06-11 05:05 AM  - TASK  [pulse]  #docs #release

    write release notes

    ## #3  2025-06-11 09:15 AM  - TASK  [pulse]  #docs

    published
    "##);
}
