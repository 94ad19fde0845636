//! Search command implementation.
//!
//! Full-text search over entry text and tags, best match first.

use std::io::Write;

use chrono::{Duration, Utc};

use crate::cli::SearchArgs;
use crate::error::Result;
use crate::model::split_tags;
use crate::store::EntryFilter;
use crate::util::dateparse::parse_flexible;

use super::output::{EntryList, ListedEntry, Renderer};
use super::{joined, Context};

/// Result cap used when `--limit` is out of range.
pub const DEFAULT_LIMIT: usize = 200;

/// How far back a search reaches without `--since`.
const DEFAULT_WINDOW_DAYS: i64 = 90;

/// Run the search command.
pub fn run<W: Write>(args: &SearchArgs, ctx: &Context, out: &mut W) -> Result<()> {
    let query = joined(&args.query);
    let since = match &args.since {
        Some(since) => parse_flexible(since, ctx.now, &ctx.zone)?,
        None => ctx.now - Duration::days(DEFAULT_WINDOW_DAYS),
    };
    let until = args
        .until
        .as_deref()
        .map(|until| parse_flexible(until, ctx.now, &ctx.zone))
        .transpose()?;
    let limit = if (1..=super::list::MAX_LIMIT).contains(&args.limit) {
        args.limit as usize
    } else {
        DEFAULT_LIMIT
    };

    let project = args.project.trim();
    let filter = EntryFilter {
        since: Some(since.with_timezone(&Utc)),
        until: until.map(|u| u.with_timezone(&Utc)),
        projects: if project.is_empty() {
            Vec::new()
        } else {
            vec![project.to_string()]
        },
        tags: split_tags(&args.tags),
        ..EntryFilter::default()
    };

    let hits = ctx.store.full_text_search(&query, &filter, limit)?;
    let entries = hits
        .iter()
        .map(|hit| ListedEntry::from_hit(hit, &ctx.zone))
        .collect();
    let list = EntryList::search(entries, &query, limit)
        .filter("since", since.format("%Y-%m-%d %H:%M %:z").to_string())
        .filter(
            "until",
            until.map_or_else(String::new, |u| u.format("%Y-%m-%d %H:%M %:z").to_string()),
        )
        .filter("project", project)
        .filter("tags", args.tags.trim());
    Renderer::new(args.format).render(&list, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::testing::{context, text};
    use crate::cli::OutputFormat;
    use crate::model::NewEntry;

    fn args(query: &str) -> SearchArgs {
        SearchArgs {
            query: query.split(' ').map(str::to_string).collect(),
            since: None,
            until: None,
            limit: 200,
            project: String::new(),
            tags: String::new(),
            format: OutputFormat::Quiet,
        }
    }

    fn seeded() -> Context {
        let ctx = context();
        let now = ctx.now_utc();
        let rows = [
            ("deploy failed on staging", "ops", "incident", 10),
            ("deploy succeeded", "ops", "", 20),
            ("lunch with team", "", "", 30),
            ("deploy rollback", "web", "incident", 60 * 24 * 120),
        ];
        for (body, project, tags, minutes_ago) in rows {
            ctx.store
                .insert(
                    &NewEntry::new("note", body)
                        .project(project)
                        .tags_csv(tags)
                        .at(now - Duration::minutes(minutes_ago)),
                )
                .unwrap();
        }
        ctx
    }

    fn searched(args: &SearchArgs, ctx: &Context) -> String {
        let mut buf = Vec::new();
        run(args, ctx, &mut buf).unwrap();
        text(buf)
    }

    #[test]
    fn test_default_window_skips_old_entries() {
        let ctx = seeded();
        let out = searched(&args("deploy"), &ctx);
        assert!(out.contains("deploy failed on staging"));
        assert!(out.contains("deploy succeeded"));
        assert!(!out.contains("rollback"));
        assert!(!out.contains("lunch"));
    }

    #[test]
    fn test_since_widens_window() {
        let ctx = seeded();
        let mut args = args("rollback");
        args.since = Some("1y ago".to_string());
        assert_eq!(searched(&args, &ctx), "deploy rollback\n");
    }

    #[test]
    fn test_project_and_tags_filter() {
        let ctx = seeded();
        let mut args = args("deploy");
        args.project = "ops".to_string();
        args.tags = "incident".to_string();
        assert_eq!(searched(&args, &ctx), "deploy failed on staging\n");
    }

    #[test]
    fn test_no_results_message() {
        let ctx = seeded();
        let mut args = args("kubernetes");
        args.format = OutputFormat::Default;
        assert!(searched(&args, &ctx).contains("no results"));
    }

    #[test]
    fn test_csv_has_search_columns() {
        let ctx = seeded();
        let mut args = args("lunch");
        args.format = OutputFormat::Csv;
        let out = searched(&args, &ctx);
        assert!(out.starts_with(
            "id,timestamp,category,text,project,tags,duration_minutes,search_rank,search_snippet\n"
        ));
        assert!(out.contains("[lunch]"));
    }
}
