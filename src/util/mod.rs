//! Utility functions shared across the crate:
//! - Atomic file writes for config and exports
//! - Flexible date parsing ([`dateparse`])
//! - Page arithmetic for listings ([`pagination`])
//! - Text truncation and wrapping for fixed-width output
//! - Relative and clock time formatting

pub mod dateparse;
pub mod pagination;

use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, FixedOffset, Utc};
use tempfile::NamedTempFile;

use crate::error::{PulseError, Result};

/// Atomically write content to a file.
///
/// The bytes go to a temporary file in the target's directory which is then
/// renamed over the target, so readers never observe a partial file.
///
/// # Example
///
/// ```rust,no_run
/// use pulse::util::atomic_write;
///
/// atomic_write("config.toml", b"theme = \"dark\"").unwrap();
/// ```
pub fn atomic_write(path: impl AsRef<Path>, content: &[u8]) -> Result<()> {
    atomic_write_with(path, |writer| writer.write_all(content))
}

/// Atomically write a file using a writer callback.
///
/// The parent directory is created when missing. If the callback fails the
/// target is left untouched.
pub fn atomic_write_with<F>(path: impl AsRef<Path>, write_fn: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let path = path.as_ref();

    let parent = path.parent().ok_or_else(|| PulseError::IoError {
        context: format!("Cannot determine parent directory for: {}", path.display()),
        source: io::Error::new(io::ErrorKind::InvalidInput, "No parent directory"),
    })?;
    // A bare file name has an empty parent; write next to the cwd.
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };

    if !parent.exists() {
        std::fs::create_dir_all(parent).map_err(|e| {
            PulseError::io(format!("Failed to create directory: {}", parent.display()), e)
        })?;
    }

    let mut temp_file = NamedTempFile::new_in(parent).map_err(|e| {
        PulseError::io(
            format!("Failed to create temporary file in: {}", parent.display()),
            e,
        )
    })?;

    write_fn(&mut temp_file)
        .and_then(|()| temp_file.flush())
        .map_err(|e| PulseError::io(format!("Failed to write content for: {}", path.display()), e))?;

    temp_file.persist(path).map_err(|e| {
        PulseError::io(
            format!("Failed to atomically write file: {}", path.display()),
            e.error,
        )
    })?;

    Ok(())
}

/// Truncate to at most `max` characters, ending in `...` when shortened.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let mut out: String = text.chars().take(max - 3).collect();
    out.push_str("...");
    out
}

/// Pad with spaces (or cut) to exactly `width` characters.
pub fn pad_right(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.chars().take(width).collect()
    } else {
        format!("{text}{}", " ".repeat(width - len))
    }
}

/// Greedy word wrap. Words longer than `width` are split across lines.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            if word.is_empty() {
                continue;
            }
            let needed = if current_len == 0 { word.len() } else { current_len + 1 + word.len() };
            if needed > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(word.iter());
            current_len += word.len();
        }
        lines.push(current);
    }
    lines
}

/// Compact age of `ts` relative to `now`: `just now`, `45s ago`, `3m ago`,
/// `2h ago`, `4d ago`, `2w ago`, `3mo ago`, `1y ago`.
pub fn format_relative_time(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = now.signed_duration_since(ts).num_seconds();
    if secs < 60 {
        return if secs <= 1 {
            "just now".to_string()
        } else {
            format!("{secs}s ago")
        };
    }
    if secs < 3600 {
        return format!("{}m ago", secs / 60);
    }
    if secs < 86_400 {
        return format!("{}h ago", secs / 3600);
    }
    let days = secs / 86_400;
    if days < 7 {
        return format!("{days}d ago");
    }
    let weeks = days / 7;
    if weeks < 5 {
        return format!("{weeks}w ago");
    }
    let months = (days as f64 / 30.4) as i64;
    if months < 12 {
        return format!("{}mo ago", months.max(1));
    }
    format!("{}y ago", months / 12)
}

/// Clock time for `ts`, with the date added when it is not on `now`'s day.
pub fn format_clock_time(ts: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> String {
    if ts.date_naive() == now.date_naive() {
        ts.format("%I:%M %p").to_string()
    } else {
        ts.format("%b %d %I:%M %p").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.txt");

        atomic_write(&path, b"Hello, world!").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Hello, world!");
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("test.txt");

        atomic_write(&path, b"Nested content").unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_atomic_write_with_closure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("closure.txt");

        atomic_write_with(&path, |w| {
            writeln!(w, "Line 1")?;
            writeln!(w, "Line 2")
        })
        .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Line 1\nLine 2\n");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer sentence", 10), "a much ...");
        assert_eq!(truncate("abcdef", 2), "ab");
    }

    #[test]
    fn test_pad_right() {
        assert_eq!(pad_right("ab", 4), "ab  ");
        assert_eq!(pad_right("abcdef", 4), "abcd");
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_text("a\nb", 10), vec!["a", "b"]);
        assert_eq!(wrap_text("", 10), vec![""]);
    }

    #[test]
    fn test_format_relative_time() {
        let now = DateTime::parse_from_rfc3339("2025-06-11T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let ago = |secs: i64| format_relative_time(now - chrono::Duration::seconds(secs), now);
        assert_eq!(ago(0), "just now");
        assert_eq!(ago(-30), "just now");
        assert_eq!(ago(45), "45s ago");
        assert_eq!(ago(180), "3m ago");
        assert_eq!(ago(7200), "2h ago");
        assert_eq!(ago(86_400 * 4), "4d ago");
        assert_eq!(ago(86_400 * 14), "2w ago");
        assert_eq!(ago(86_400 * 95), "3mo ago");
        assert_eq!(ago(86_400 * 400), "1y ago");
    }

    #[test]
    fn test_format_clock_time() {
        let now = DateTime::parse_from_rfc3339("2025-06-11T15:00:00+00:00").unwrap();
        let same_day = DateTime::parse_from_rfc3339("2025-06-11T09:05:00+00:00").unwrap();
        let earlier = DateTime::parse_from_rfc3339("2025-06-02T21:30:00+00:00").unwrap();
        assert_eq!(format_clock_time(same_day, now), "09:05 AM");
        assert_eq!(format_clock_time(earlier, now), "Jun 02 09:30 PM");
    }
}
