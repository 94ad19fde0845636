//! Analytics over logged entries.
//!
//! This module provides:
//! - Per-day time reports with weekly, monthly and per-category rollups
//! - Per-project summaries with activity trends
//! - Per-tag usage analytics
//! - Overview statistics for the stats and dashboard views
//!
//! Everything here is a pure function of a slice of entries; the store
//! supplies the slice.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc, Weekday};
use indexmap::IndexMap;
use serde::Serialize;

use crate::config::Zone;
use crate::model::Entry;

/// Label used for entries without a project.
pub const NO_PROJECT: &str = "No Project";

/// Direction of recent activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Heavy use.
    Up,
    /// Moderate use.
    Stable,
    /// Light use.
    Down,
}

impl Trend {
    /// Arrow glyph for tables.
    pub fn arrow(self) -> &'static str {
        match self {
            Self::Up => "↗",
            Self::Stable => "→",
            Self::Down => "↘",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "up",
            Self::Stable => "stable",
            Self::Down => "down",
        })
    }
}

// ----- time reports -------------------------------------------------------

/// Logged time for one local calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeReport {
    /// Local date.
    pub date: NaiveDate,
    /// Sum of durations.
    pub total_minutes: i64,
    /// Minutes per category, entries with a duration only.
    pub by_category: IndexMap<String, i64>,
    /// Minutes per project, entries with a duration only.
    pub by_project: IndexMap<String, i64>,
    /// Entries logged that day.
    pub entry_count: usize,
}

/// Daily reports, newest day first.
pub fn time_reports(entries: &[Entry], zone: &Zone) -> Vec<TimeReport> {
    let mut days: BTreeMap<NaiveDate, TimeReport> = BTreeMap::new();
    for entry in entries {
        let date = zone.localize(entry.timestamp).date_naive();
        let report = days.entry(date).or_insert_with(|| TimeReport {
            date,
            total_minutes: 0,
            by_category: IndexMap::new(),
            by_project: IndexMap::new(),
            entry_count: 0,
        });
        report.entry_count += 1;
        let minutes = entry.duration_minutes.unwrap_or(0);
        if minutes > 0 {
            report.total_minutes += minutes;
            *report
                .by_category
                .entry(entry.category.to_lowercase())
                .or_insert(0) += minutes;
            let project = entry.project.clone().unwrap_or_else(|| NO_PROJECT.to_string());
            *report.by_project.entry(project).or_insert(0) += minutes;
        }
    }
    days.into_values().rev().collect()
}

/// Rollup granularity of the time reports view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportView {
    /// One row per day.
    #[default]
    Daily,
    /// One row per ISO week.
    Weekly,
    /// One row per month.
    Monthly,
    /// One row per category.
    Category,
}

impl ReportView {
    /// Next view in the `v` cycle.
    pub fn cycle(self) -> Self {
        match self {
            Self::Daily => Self::Weekly,
            Self::Weekly => Self::Monthly,
            Self::Monthly => Self::Category,
            Self::Category => Self::Daily,
        }
    }
}

impl fmt::Display for ReportView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Category => "Category",
        })
    }
}

/// Presentation of the time reports view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportDisplay {
    /// Rows and columns.
    #[default]
    Table,
    /// Horizontal bars.
    Chart,
    /// Totals and averages.
    Summary,
    /// Per-day breakdown.
    Details,
}

impl ReportDisplay {
    /// Next display in the `V` cycle.
    pub fn cycle(self) -> Self {
        match self {
            Self::Table => Self::Chart,
            Self::Chart => Self::Summary,
            Self::Summary => Self::Details,
            Self::Details => Self::Table,
        }
    }
}

impl fmt::Display for ReportDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Table => "Table",
            Self::Chart => "Chart",
            Self::Summary => "Summary",
            Self::Details => "Details",
        })
    }
}

/// One row of a rolled-up report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// Day, week, month or category label.
    pub label: String,
    /// Logged minutes.
    pub minutes: i64,
    /// Entries counted.
    pub entries: usize,
}

/// Roll daily reports up to `view`. Time rows are newest first; category
/// rows are largest first.
pub fn rollup(reports: &[TimeReport], view: ReportView) -> Vec<ReportRow> {
    let mut rows: IndexMap<String, ReportRow> = IndexMap::new();
    let mut bump = |label: String, minutes: i64, entries: usize| {
        let row = rows.entry(label.clone()).or_insert(ReportRow {
            label,
            minutes: 0,
            entries: 0,
        });
        row.minutes += minutes;
        row.entries += entries;
    };
    for report in reports {
        match view {
            ReportView::Daily => bump(
                report.date.format("%Y-%m-%d").to_string(),
                report.total_minutes,
                report.entry_count,
            ),
            ReportView::Weekly => {
                let week = report.date.iso_week();
                bump(
                    format!("{}-W{:02}", week.year(), week.week()),
                    report.total_minutes,
                    report.entry_count,
                );
            }
            ReportView::Monthly => bump(
                report.date.format("%Y-%m").to_string(),
                report.total_minutes,
                report.entry_count,
            ),
            ReportView::Category => {
                for (category, minutes) in &report.by_category {
                    bump(category.clone(), *minutes, 0);
                }
            }
        }
    }
    let mut rows: Vec<ReportRow> = rows.into_values().collect();
    if view == ReportView::Category {
        rows.sort_by(|a, b| b.minutes.cmp(&a.minutes).then_with(|| a.label.cmp(&b.label)));
    }
    rows
}

/// Format minutes as `2h 05m` or `45m`.
pub fn format_minutes(minutes: i64) -> String {
    let minutes = minutes.max(0);
    if minutes >= 60 {
        format!("{}h {:02}m", minutes / 60, minutes % 60)
    } else {
        format!("{minutes}m")
    }
}

// ----- projects -----------------------------------------------------------

/// Activity summary for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    /// Project name, or [`NO_PROJECT`].
    pub project: String,
    /// Sum of durations.
    pub total_minutes: i64,
    /// Entries in the project.
    pub entry_count: usize,
    /// Entries per category.
    pub categories: IndexMap<String, usize>,
    /// Newest entry.
    pub last_active: DateTime<Utc>,
    /// Up above four hours, stable above one hour.
    pub trend: Trend,
}

/// Ordering for project summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProjectSort {
    /// Most logged time first.
    #[default]
    TotalTime,
    /// Most entries first.
    EntryCount,
    /// Most recently active first.
    LastActive,
    /// Alphabetical.
    Name,
}

impl ProjectSort {
    /// Next ordering in the `o` cycle.
    pub fn cycle(self) -> Self {
        match self {
            Self::TotalTime => Self::EntryCount,
            Self::EntryCount => Self::LastActive,
            Self::LastActive => Self::Name,
            Self::Name => Self::TotalTime,
        }
    }
}

impl fmt::Display for ProjectSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TotalTime => "total_time",
            Self::EntryCount => "entry_count",
            Self::LastActive => "last_active",
            Self::Name => "name",
        })
    }
}

/// Summaries for every project in `entries`.
pub fn project_summaries(entries: &[Entry], sort: ProjectSort) -> Vec<ProjectSummary> {
    let mut projects: IndexMap<String, ProjectSummary> = IndexMap::new();
    for entry in entries {
        let name = entry.project.clone().unwrap_or_else(|| NO_PROJECT.to_string());
        let summary = projects.entry(name.clone()).or_insert_with(|| ProjectSummary {
            project: name,
            total_minutes: 0,
            entry_count: 0,
            categories: IndexMap::new(),
            last_active: entry.timestamp,
            trend: Trend::Down,
        });
        summary.total_minutes += entry.duration_minutes.unwrap_or(0).max(0);
        summary.entry_count += 1;
        *summary
            .categories
            .entry(entry.category.to_lowercase())
            .or_insert(0) += 1;
        summary.last_active = summary.last_active.max(entry.timestamp);
    }

    let mut summaries: Vec<ProjectSummary> = projects
        .into_values()
        .map(|mut s| {
            s.trend = if s.total_minutes > 4 * 60 {
                Trend::Up
            } else if s.total_minutes > 60 {
                Trend::Stable
            } else {
                Trend::Down
            };
            s
        })
        .collect();
    sort_projects(&mut summaries, sort);
    summaries
}

/// Reorder summaries in place.
pub fn sort_projects(summaries: &mut [ProjectSummary], sort: ProjectSort) {
    summaries.sort_by(|a, b| match sort {
        ProjectSort::TotalTime => b
            .total_minutes
            .cmp(&a.total_minutes)
            .then_with(|| a.project.cmp(&b.project)),
        ProjectSort::EntryCount => b
            .entry_count
            .cmp(&a.entry_count)
            .then_with(|| a.project.cmp(&b.project)),
        ProjectSort::LastActive => b.last_active.cmp(&a.last_active),
        ProjectSort::Name => a.project.to_lowercase().cmp(&b.project.to_lowercase()),
    });
}

// ----- tags ---------------------------------------------------------------

/// Usage analytics for one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagAnalytics {
    /// Tag name.
    pub tag: String,
    /// Entries carrying the tag.
    pub usage_count: usize,
    /// Sum of durations of those entries.
    pub total_minutes: i64,
    /// Projects the tag appears in (at most ten).
    pub projects: Vec<String>,
    /// Categories the tag appears in (at most five).
    pub categories: Vec<String>,
    /// Newest use.
    pub last_used: DateTime<Utc>,
    /// Up above ten uses, stable above five.
    pub trend: Trend,
}

/// Ordering for tag analytics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagSort {
    /// Most used first.
    #[default]
    Usage,
    /// Most logged time first.
    TotalTime,
    /// Most recently used first.
    LastUsed,
    /// Alphabetical.
    Name,
}

impl TagSort {
    /// Next ordering in the `o` cycle.
    pub fn cycle(self) -> Self {
        match self {
            Self::Usage => Self::TotalTime,
            Self::TotalTime => Self::LastUsed,
            Self::LastUsed => Self::Name,
            Self::Name => Self::Usage,
        }
    }
}

impl fmt::Display for TagSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Usage => "usage",
            Self::TotalTime => "total_time",
            Self::LastUsed => "last_used",
            Self::Name => "name",
        })
    }
}

const MAX_TAG_PROJECTS: usize = 10;
const MAX_TAG_CATEGORIES: usize = 5;

/// Analytics for every individual tag in `entries`.
pub fn tag_analytics(entries: &[Entry], sort: TagSort) -> Vec<TagAnalytics> {
    struct Acc {
        usage: usize,
        minutes: i64,
        projects: BTreeSet<String>,
        categories: BTreeSet<String>,
        last_used: DateTime<Utc>,
    }

    let mut tags: HashMap<String, Acc> = HashMap::new();
    for entry in entries {
        for tag in &entry.tags {
            let acc = tags.entry(tag.clone()).or_insert_with(|| Acc {
                usage: 0,
                minutes: 0,
                projects: BTreeSet::new(),
                categories: BTreeSet::new(),
                last_used: entry.timestamp,
            });
            acc.usage += 1;
            acc.minutes += entry.duration_minutes.unwrap_or(0).max(0);
            if let Some(project) = &entry.project {
                acc.projects.insert(project.clone());
            }
            acc.categories.insert(entry.category.to_lowercase());
            acc.last_used = acc.last_used.max(entry.timestamp);
        }
    }

    let mut out: Vec<TagAnalytics> = tags
        .into_iter()
        .map(|(tag, acc)| TagAnalytics {
            tag,
            usage_count: acc.usage,
            total_minutes: acc.minutes,
            projects: acc.projects.into_iter().take(MAX_TAG_PROJECTS).collect(),
            categories: acc.categories.into_iter().take(MAX_TAG_CATEGORIES).collect(),
            last_used: acc.last_used,
            trend: if acc.usage > 10 {
                Trend::Up
            } else if acc.usage > 5 {
                Trend::Stable
            } else {
                Trend::Down
            },
        })
        .collect();
    sort_tags(&mut out, sort);
    out
}

/// Reorder tag analytics in place.
pub fn sort_tags(tags: &mut [TagAnalytics], sort: TagSort) {
    tags.sort_by(|a, b| {
        let primary = match sort {
            TagSort::Usage => b.usage_count.cmp(&a.usage_count),
            TagSort::TotalTime => b.total_minutes.cmp(&a.total_minutes),
            TagSort::LastUsed => b.last_used.cmp(&a.last_used),
            TagSort::Name => std::cmp::Ordering::Equal,
        };
        primary.then_with(|| a.tag.cmp(&b.tag))
    });
}

// ----- overview -----------------------------------------------------------

/// Overview numbers for the stats and dashboard views.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Overview {
    /// Entries considered.
    pub total: usize,
    /// Entries per canonical category, in `note, task, meeting, timer` order.
    pub by_category: IndexMap<String, usize>,
    /// Entries since local midnight.
    pub today: usize,
    /// Entries since Sunday.
    pub this_week: usize,
    /// Entries since the first of the month.
    pub this_month: usize,
    /// Sum of durations.
    pub total_minutes: i64,
    /// Top five projects by entry count.
    pub top_projects: Vec<(String, usize)>,
    /// Average entries per day this month.
    pub daily_average: f64,
    /// Weekday with the most entries.
    pub busiest_weekday: Option<Weekday>,
    /// Consecutive days with entries, ending today.
    pub streak_days: u32,
}

impl Overview {
    /// `Low`, `Medium` or `High` depending on today's entry count.
    pub fn activity_level(&self) -> &'static str {
        match self.today {
            n if n >= 5 => "High",
            n if n >= 2 => "Medium",
            _ => "Low",
        }
    }

    /// Share of `count` in the total, as a percentage.
    pub fn percent(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }
}

/// Compute the overview for `entries` relative to `now`.
pub fn overview<'a, I>(entries: I, now: DateTime<FixedOffset>, zone: &Zone) -> Overview
where
    I: IntoIterator<Item = &'a Entry>,
{
    let today = now.date_naive();
    let week_start = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
    let month_start = today.with_day(1).unwrap_or(today);

    let mut out = Overview::default();
    for category in crate::model::CANONICAL_CATEGORIES {
        out.by_category.insert(category.to_string(), 0);
    }
    let mut projects: HashMap<String, usize> = HashMap::new();
    let mut weekdays: HashMap<Weekday, usize> = HashMap::new();
    let mut active_days: BTreeSet<NaiveDate> = BTreeSet::new();

    for entry in entries {
        let date = zone.localize(entry.timestamp).date_naive();
        out.total += 1;
        out.total_minutes += entry.duration_minutes.unwrap_or(0).max(0);
        if let Some(count) = out.by_category.get_mut(&entry.category.to_lowercase()) {
            *count += 1;
        }
        if date >= today {
            out.today += 1;
        }
        if date >= week_start {
            out.this_week += 1;
        }
        if date >= month_start {
            out.this_month += 1;
        }
        if let Some(project) = &entry.project {
            *projects.entry(project.clone()).or_insert(0) += 1;
        }
        *weekdays.entry(date.weekday()).or_insert(0) += 1;
        active_days.insert(date);
    }

    let mut top: Vec<(String, usize)> = projects.into_iter().collect();
    top.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    top.truncate(5);
    out.top_projects = top;

    let days_in_month = (today - month_start).num_days() + 1;
    out.daily_average = out.this_month as f64 / days_in_month as f64;
    out.busiest_weekday = weekdays
        .into_iter()
        .max_by(|a, b| {
            a.1.cmp(&b.1)
                .then_with(|| b.0.num_days_from_monday().cmp(&a.0.num_days_from_monday()))
        })
        .map(|(day, _)| day);

    let mut day = today;
    while active_days.contains(&day) {
        out.streak_days += 1;
        day -= Duration::days(1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn entry(day: u32, category: &str, project: Option<&str>, tags: &[&str], minutes: i64) -> Entry {
        Entry {
            id: 0,
            timestamp: Utc.with_ymd_and_hms(2025, 6, day, 10, 0, 0).unwrap(),
            category: category.into(),
            text: "x".into(),
            project: project.map(str::to_string),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            duration_minutes: (minutes > 0).then_some(minutes),
            thread_id: None,
            parent_id: None,
        }
    }

    fn sample() -> Vec<Entry> {
        vec![
            entry(9, "timer", Some("api"), &["focus"], 90),
            entry(10, "timer", Some("api"), &["focus", "deep"], 200),
            entry(10, "note", None, &["idea"], 0),
            entry(11, "Timer", Some("web"), &["focus"], 30),
        ]
    }

    #[test]
    fn test_time_reports() {
        let reports = time_reports(&sample(), &Zone::utc());
        let dates: Vec<String> = reports.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2025-06-11", "2025-06-10", "2025-06-09"]);
        assert_eq!(reports[1].total_minutes, 200);
        assert_eq!(reports[1].entry_count, 2);
        assert_eq!(reports[1].by_project.get("api"), Some(&200));
        assert_eq!(reports[0].by_category.get("timer"), Some(&30));
    }

    #[test]
    fn test_rollup() {
        let reports = time_reports(&sample(), &Zone::utc());
        let weekly = rollup(&reports, ReportView::Weekly);
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[0].label, "2025-W24");
        assert_eq!(weekly[0].minutes, 320);
        assert_eq!(weekly[0].entries, 4);

        let by_category = rollup(&reports, ReportView::Category);
        assert_eq!(by_category[0].label, "timer");
        assert_eq!(format_minutes(320), "5h 20m");
        assert_eq!(format_minutes(45), "45m");
    }

    #[test]
    fn test_project_summaries() {
        let summaries = project_summaries(&sample(), ProjectSort::TotalTime);
        let names: Vec<&str> = summaries.iter().map(|s| s.project.as_str()).collect();
        assert_eq!(names, vec!["api", "web", NO_PROJECT]);
        assert_eq!(summaries[0].trend, Trend::Up);
        assert_eq!(summaries[1].trend, Trend::Down);
        assert_eq!(summaries[0].categories.get("timer"), Some(&2));

        let by_name = project_summaries(&sample(), ProjectSort::Name);
        assert_eq!(by_name[0].project, "api");
        assert_eq!(ProjectSort::Name.cycle(), ProjectSort::TotalTime);
    }

    #[test]
    fn test_tag_analytics_splits_every_tag() {
        let tags = tag_analytics(&sample(), TagSort::Usage);
        let names: Vec<&str> = tags.iter().map(|t| t.tag.as_str()).collect();
        assert_eq!(names, vec!["focus", "deep", "idea"]);
        assert_eq!(tags[0].usage_count, 3);
        assert_eq!(tags[0].total_minutes, 320);
        assert_eq!(tags[0].projects, vec!["api", "web"]);
        assert_eq!(tags[0].trend, Trend::Down);
    }

    #[test]
    fn test_overview() {
        let now = Zone::utc().localize(Utc.with_ymd_and_hms(2025, 6, 11, 18, 0, 0).unwrap());
        let entries = sample();
        let stats = overview(&entries, now, &Zone::utc());
        assert_eq!(stats.total, 4);
        assert_eq!(stats.today, 1);
        // 2025-06-08 was a Sunday.
        assert_eq!(stats.this_week, 4);
        assert_eq!(stats.by_category.get("timer"), Some(&3));
        assert_eq!(stats.streak_days, 3);
        assert_eq!(stats.top_projects[0], ("api".to_string(), 2));
        assert_eq!(stats.busiest_weekday, Some(Weekday::Tue));
        assert_eq!(stats.activity_level(), "Low");
    }
}
