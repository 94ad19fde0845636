//! Statistics, dashboard and the three analytics screens.

use chrono::{DateTime, FixedOffset};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::analytics::{
    rollup, sort_projects, sort_tags, Overview, ProjectSort, ProjectSummary, ReportDisplay,
    ReportView, TagAnalytics, TagSort, TimeReport,
};
use crate::timeline::Scope;

use super::super::effect::{Effect, Transition};
use super::super::state::Session;
use super::{step, Mode};

/// Overview numbers shared by the stats and dashboard overlays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverviewState {
    /// Computed once the executor has loaded it.
    pub overview: Option<Overview>,
    /// Next daily reminder, when enabled.
    pub reminder: Option<DateTime<FixedOffset>>,
}

/// Time reports screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeReportsState {
    /// Window being reported.
    pub scope: Scope,
    /// Rollup granularity.
    pub view: ReportView,
    /// Presentation.
    pub display: ReportDisplay,
    /// Per-day reports, newest first.
    pub reports: Vec<TimeReport>,
    /// Highlighted row.
    pub cursor: usize,
}

impl TimeReportsState {
    /// Empty reports for `scope`.
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    fn row_count(&self) -> usize {
        rollup(&self.reports, self.view).len()
    }
}

/// Project summary screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectSummaryState {
    /// Ordering.
    pub sort: ProjectSort,
    /// Presentation.
    pub display: ReportDisplay,
    /// Loaded summaries.
    pub summaries: Vec<ProjectSummary>,
    /// Highlighted row.
    pub cursor: usize,
}

/// Tag analytics screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagAnalyticsState {
    /// Ordering.
    pub sort: TagSort,
    /// Presentation.
    pub display: ReportDisplay,
    /// Loaded analytics.
    pub tags: Vec<TagAnalytics>,
    /// Highlighted row.
    pub cursor: usize,
}

fn project_sort_label(sort: ProjectSort) -> &'static str {
    match sort {
        ProjectSort::TotalTime => "Total Time",
        ProjectSort::EntryCount => "Entry Count",
        ProjectSort::LastActive => "Last Active",
        ProjectSort::Name => "Name",
    }
}

fn tag_sort_label(sort: TagSort) -> &'static str {
    match sort {
        TagSort::Usage => "Usage Count",
        TagSort::TotalTime => "Total Time",
        TagSort::LastUsed => "Last Used",
        TagSort::Name => "Name",
    }
}

/// Statistics overlay.
pub fn stats(state: OverviewState, key: &KeyEvent) -> Transition {
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) | (KeyModifiers::CONTROL, KeyCode::Char('i')) => Transition::normal(),
        _ => Transition::to(Mode::Stats(state)),
    }
}

/// Dashboard overlay.
pub fn dashboard(state: OverviewState, session: &mut Session, key: &KeyEvent) -> Transition {
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) | (KeyModifiers::CONTROL, KeyCode::Char('w')) => {
            session.notify("Dashboard closed");
            Transition::normal()
        }
        _ => Transition::to(Mode::Dashboard(state)),
    }
}

/// Time reports keys.
pub fn time_reports(mut state: TimeReportsState, session: &mut Session, key: &KeyEvent) -> Transition {
    match key.code {
        KeyCode::Esc => return Transition::normal(),
        KeyCode::Char('t') => {
            state.scope = state.scope.cycle();
            state.cursor = 0;
            session.notify(format!("Time Reports: {}", state.scope));
            let scope = state.scope;
            return Transition::to(Mode::TimeReports(state)).with(Effect::LoadTimeReports(scope));
        }
        KeyCode::Char('v') => {
            state.view = state.view.cycle();
            state.cursor = 0;
            session.notify(format!("Time Report View: {} View", state.view));
        }
        KeyCode::Char('V') => {
            state.display = state.display.cycle();
            session.notify(format!("Analytics Mode: {} View", state.display));
        }
        KeyCode::Up | KeyCode::Char('k') => state.cursor = step(state.cursor, false, state.row_count()),
        KeyCode::Down | KeyCode::Char('j') => {
            state.cursor = step(state.cursor, true, state.row_count());
        }
        _ => {}
    }
    Transition::to(Mode::TimeReports(state))
}

/// Project summary keys. Enter filters the timeline by the project.
pub fn project_summary(
    mut state: ProjectSummaryState,
    session: &mut Session,
    key: &KeyEvent,
) -> Transition {
    let len = state.summaries.len();
    match key.code {
        KeyCode::Esc => return Transition::normal(),
        KeyCode::Char('r') => {
            return Transition::to(Mode::ProjectSummary(state)).with(Effect::LoadProjects);
        }
        KeyCode::Char('v') => {
            state.display = state.display.cycle();
            session.notify(format!("Analytics Mode: {} View", state.display));
        }
        KeyCode::Char('o') => {
            state.sort = state.sort.cycle();
            sort_projects(&mut state.summaries, state.sort);
            session.notify(format!("Sort: {}", project_sort_label(state.sort)));
        }
        KeyCode::Up | KeyCode::Char('k') => state.cursor = step(state.cursor, false, len),
        KeyCode::Down | KeyCode::Char('j') => state.cursor = step(state.cursor, true, len),
        KeyCode::Enter => {
            if let Some(summary) = state.summaries.get(state.cursor) {
                let project = summary.project.clone();
                session.notify(format!("Filtering by project: {project}"));
                session.filter.project = Some(project);
                return Transition::normal().with(Effect::ReloadTimeline);
            }
        }
        _ => {}
    }
    Transition::to(Mode::ProjectSummary(state))
}

/// Tag analytics keys. Enter filters the timeline by the tag alone.
pub fn tag_analytics(
    mut state: TagAnalyticsState,
    session: &mut Session,
    key: &KeyEvent,
) -> Transition {
    let len = state.tags.len();
    match key.code {
        KeyCode::Esc => return Transition::normal(),
        KeyCode::Char('r') => {
            return Transition::to(Mode::TagAnalytics(state)).with(Effect::LoadTags);
        }
        KeyCode::Char('v') => {
            state.display = state.display.cycle();
            session.notify(format!("Analytics Mode: {} View", state.display));
        }
        KeyCode::Char('o') => {
            state.sort = state.sort.cycle();
            sort_tags(&mut state.tags, state.sort);
            session.notify(format!("Sort: {}", tag_sort_label(state.sort)));
        }
        KeyCode::Up | KeyCode::Char('k') => state.cursor = step(state.cursor, false, len),
        KeyCode::Down | KeyCode::Char('j') => state.cursor = step(state.cursor, true, len),
        KeyCode::Enter => {
            if let Some(item) = state.tags.get(state.cursor) {
                let tag = item.tag.clone();
                session.notify(format!("Filtering by tag: #{tag}"));
                session.filter.tags.clear();
                session.filter.tags.insert(tag);
                return Transition::normal().reload();
            }
        }
        _ => {}
    }
    Transition::to(Mode::TagAnalytics(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{project_summaries, tag_analytics as analyze_tags};
    use crate::config::{Config, Zone};
    use crate::model::Entry;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn session() -> Session {
        let now = Zone::utc().localize(Utc.with_ymd_and_hms(2025, 6, 11, 14, 0, 0).unwrap());
        Session::new(Config::default(), now)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn entries() -> Vec<Entry> {
        let base = Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0).unwrap();
        [("api", "rust", 90), ("web", "css", 30), ("api", "rust", 20)]
            .iter()
            .enumerate()
            .map(|(i, (project, tag, minutes))| Entry {
                id: i as i64 + 1,
                timestamp: base + Duration::hours(i as i64),
                category: "task".into(),
                text: "work".into(),
                project: Some((*project).into()),
                tags: vec![(*tag).into()],
                duration_minutes: Some(*minutes),
                thread_id: None,
                parent_id: None,
            })
            .collect()
    }

    #[test]
    fn test_time_reports_scope_cycle_reloads() {
        let mut s = session();
        let t = time_reports(TimeReportsState::new(Scope::ThisWeek), &mut s, &key(KeyCode::Char('t')));
        assert_eq!(t.effects, vec![Effect::LoadTimeReports(Scope::ThisMonth)]);
        assert_eq!(s.status.as_deref(), Some("Time Reports: This Month"));
    }

    #[test]
    fn test_time_reports_display_cycle() {
        let mut s = session();
        let t = time_reports(TimeReportsState::default(), &mut s, &key(KeyCode::Char('V')));
        let Mode::TimeReports(state) = t.mode else {
            panic!("expected time reports");
        };
        assert_eq!(state.display, ReportDisplay::Chart);
        assert_eq!(s.status.as_deref(), Some("Analytics Mode: Chart View"));
    }

    #[test]
    fn test_project_sort_resorts_in_place() {
        let mut s = session();
        let state = ProjectSummaryState {
            summaries: project_summaries(&entries(), ProjectSort::TotalTime),
            ..ProjectSummaryState::default()
        };
        assert_eq!(state.summaries[0].project, "api");
        let t = project_summary(state, &mut s, &key(KeyCode::Char('o')));
        let Mode::ProjectSummary(state) = t.mode else {
            panic!("expected project summary");
        };
        assert_eq!(state.sort, ProjectSort::EntryCount);
        assert_eq!(s.status.as_deref(), Some("Sort: Entry Count"));
    }

    #[test]
    fn test_project_enter_filters_timeline() {
        let mut s = session();
        let state = ProjectSummaryState {
            summaries: project_summaries(&entries(), ProjectSort::Name),
            cursor: 1,
            ..ProjectSummaryState::default()
        };
        let t = project_summary(state, &mut s, &key(KeyCode::Enter));
        assert_eq!(t.mode, Mode::Normal);
        assert_eq!(s.filter.project.as_deref(), Some("web"));
        assert_eq!(t.effects, vec![Effect::ReloadTimeline]);
    }

    #[test]
    fn test_tag_enter_replaces_tag_filter() {
        let mut s = session();
        s.filter.tags.insert("old".into());
        let state = TagAnalyticsState {
            tags: analyze_tags(&entries(), TagSort::Usage),
            ..TagAnalyticsState::default()
        };
        let t = tag_analytics(state, &mut s, &key(KeyCode::Enter));
        assert_eq!(s.filter.tags.iter().collect::<Vec<_>>(), vec!["rust"]);
        assert_eq!(s.status.as_deref(), Some("Filtering by tag: #rust"));
        assert_eq!(t.effects, vec![Effect::ReloadTimeline, Effect::ReloadFacets]);
    }

    #[test]
    fn test_dashboard_closes_with_ctrl_w() {
        let mut s = session();
        let t = dashboard(
            OverviewState::default(),
            &mut s,
            &KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL),
        );
        assert_eq!(t.mode, Mode::Normal);
        assert_eq!(s.status.as_deref(), Some("Dashboard closed"));
    }
}
