//! List command implementation.
//!
//! Lists recent entries, newest first, one page at a time.

use std::io::Write;

use chrono::{DateTime, Duration, FixedOffset, Utc};

use crate::cli::ListArgs;
use crate::error::Result;
use crate::model::split_tags;
use crate::store::EntryFilter;
use crate::util::dateparse::{parse_flexible, Preset};
use crate::util::pagination::Pagination;

use super::output::{EntryList, ListedEntry, Renderer};
use super::Context;

/// Page size used when `--limit` is out of range.
pub const DEFAULT_LIMIT: usize = 50;

/// Largest accepted `--limit`.
pub const MAX_LIMIT: i64 = 1000;

/// Run the list command.
pub fn run<W: Write>(args: &ListArgs, ctx: &Context, out: &mut W) -> Result<()> {
    let (since, until) = date_range(args, ctx)?;
    let filter = EntryFilter {
        since: Some(since.with_timezone(&Utc)),
        until: until.map(|u| u.with_timezone(&Utc)),
        projects: split_list(&args.projects),
        categories: split_list(&args.categories),
        tags: split_tags(&args.tags),
        ..EntryFilter::default()
    };

    let total = ctx.store.count(&filter)?;
    let pagination = Pagination::new(total, page_size(args.limit), args.page);
    let entries = ctx
        .store
        .list(&filter, pagination.per_page, pagination.offset)?
        .iter()
        .map(|e| ListedEntry::from_entry(e, &ctx.zone))
        .collect();
    tracing::debug!(total, page = pagination.current, "listing entries");

    let list = EntryList::page(entries, &pagination)
        .filter("since", since.format("%Y-%m-%d %I:%M %p %:z").to_string())
        .filter(
            "until",
            until.map_or_else(String::new, |u| {
                u.format("%Y-%m-%d %I:%M %p %:z").to_string()
            }),
        )
        .filter("preset", args.preset.clone().unwrap_or_default())
        .filter("projects", args.projects.trim())
        .filter("categories", args.categories.trim())
        .filter("tags", args.tags.trim());
    let renderer = Renderer::new(args.format);
    if args.no_color {
        console::set_colors_enabled(false);
        renderer.without_color().render(&list, out)
    } else {
        renderer.render(&list, out)
    }
}

/// Resolve `--preset` / `--since` into bounds. Without either, the last 24
/// hours. `None` means open-ended.
fn date_range(
    args: &ListArgs,
    ctx: &Context,
) -> Result<(DateTime<FixedOffset>, Option<DateTime<FixedOffset>>)> {
    if let Some(preset) = &args.preset {
        let (start, end) = Preset::parse(preset)?.range(ctx.now, &ctx.zone);
        return Ok((start, (end != ctx.now).then_some(end)));
    }
    let since = match &args.since {
        Some(since) => parse_flexible(since, ctx.now, &ctx.zone)?,
        None => ctx.now - Duration::hours(24),
    };
    Ok((since, None))
}

/// `--limit` clamped to the accepted range.
pub fn page_size(limit: i64) -> usize {
    if (1..=MAX_LIMIT).contains(&limit) {
        limit as usize
    } else {
        DEFAULT_LIMIT
    }
}

fn split_list(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::testing::{context, text};
    use crate::cli::OutputFormat;
    use crate::model::NewEntry;
    use rstest::rstest;

    fn args() -> ListArgs {
        ListArgs {
            since: None,
            preset: None,
            projects: String::new(),
            categories: String::new(),
            tags: String::new(),
            limit: 50,
            page: 1,
            format: OutputFormat::Quiet,
            no_color: false,
        }
    }

    fn seeded() -> Context {
        let ctx = context();
        let now = ctx.now_utc();
        let rows = [
            ("task", "fix login", "api", "bug", 2),
            ("note", "standup notes", "", "", 5),
            ("meeting", "design review", "api", "design", 30),
            ("task", "old work", "web", "bug", 60 * 24 * 3),
        ];
        for (category, text, project, tags, minutes_ago) in rows {
            ctx.store
                .insert(
                    &NewEntry::new(category, text)
                        .project(project)
                        .tags_csv(tags)
                        .at(now - Duration::minutes(minutes_ago)),
                )
                .unwrap();
        }
        ctx
    }

    fn listed(args: &ListArgs, ctx: &Context) -> String {
        let mut buf = Vec::new();
        run(args, ctx, &mut buf).unwrap();
        text(buf)
    }

    #[rstest]
    #[case(0, 50)]
    #[case(-3, 50)]
    #[case(1001, 50)]
    #[case(1, 1)]
    #[case(1000, 1000)]
    fn test_page_size(#[case] limit: i64, #[case] expected: usize) {
        assert_eq!(page_size(limit), expected);
    }

    #[test]
    fn test_default_window_is_last_day() {
        let ctx = seeded();
        assert_eq!(
            listed(&args(), &ctx),
            "fix login\nstandup notes\ndesign review\n"
        );
    }

    #[test]
    fn test_since_expression() {
        let ctx = seeded();
        let mut args = args();
        args.since = Some("7d".to_string());
        assert!(listed(&args, &ctx).contains("old work"));
    }

    #[test]
    fn test_filters_combine() {
        let ctx = seeded();
        let mut args = args();
        args.since = Some("1w ago".to_string());
        args.projects = "api, web".to_string();
        args.categories = "task".to_string();
        args.tags = "bug".to_string();
        assert_eq!(listed(&args, &ctx), "fix login\nold work\n");
    }

    #[test]
    fn test_preset_today() {
        let ctx = seeded();
        let mut args = args();
        args.preset = Some("today".to_string());
        assert_eq!(
            listed(&args, &ctx),
            "fix login\nstandup notes\ndesign review\n"
        );
    }

    #[test]
    fn test_unknown_preset_fails() {
        let ctx = seeded();
        let mut args = args();
        args.preset = Some("fortnight".to_string());
        assert!(run(&args, &ctx, &mut Vec::new()).is_err());
    }

    #[test]
    fn test_pagination_json() {
        let ctx = seeded();
        let mut args = args();
        args.limit = 2;
        args.page = 2;
        args.format = OutputFormat::Json;
        let value: serde_json::Value = serde_json::from_str(&listed(&args, &ctx)).unwrap();
        assert_eq!(value["total"], 3);
        assert_eq!(value["page"], 2);
        assert_eq!(value["per_page"], 2);
        assert_eq!(value["total_pages"], 2);
        assert_eq!(value["entries"].as_array().unwrap().len(), 1);
        assert_eq!(value["entries"][0]["text"], "design review");
        assert!(value["filters"]["since"].is_string());
    }
}
