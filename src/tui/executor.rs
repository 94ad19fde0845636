//! Performs the effects returned by mode handlers.
//!
//! This is the only part of the TUI that talks to the store, the
//! filesystem or the background sources. Failures become status messages;
//! nothing here ends the session except [`Effect::Quit`].

use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Duration as Days, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::analytics::{overview, project_summaries, tag_analytics, time_reports};
use crate::config::next_reminder_at;
use crate::error::Result;
use crate::export::{export_into_dir, export_thread, ExportOptions};
use crate::model::{split_tags, Entry};
use crate::store::{EntryFilter, EntryStore};
use crate::templates::Library;
use crate::timeline::{load_blocks, load_facets, Scope};

use super::effect::{Effect, SearchQuery};
use super::events::{Event, Ticker};
use super::modes::{suggestion_limit, Mode};
use super::state::{ReloadRequest, Session};

/// Advanced search result cap.
const SEARCH_LIMIT: usize = 50;

/// Countdown resolution.
const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(1);

/// Owns the store and the countdown source.
#[derive(Debug)]
pub struct Executor {
    store: EntryStore,
    exports_dir: PathBuf,
    tx: Sender<Event>,
    countdown: Option<Ticker>,
}

impl Executor {
    /// Executor writing exports into `exports_dir` and posting background
    /// results to `tx`.
    pub fn new(store: EntryStore, exports_dir: PathBuf, tx: Sender<Event>) -> Self {
        Self {
            store,
            exports_dir,
            tx,
            countdown: None,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    /// Whether the countdown source is running.
    pub fn countdown_running(&self) -> bool {
        self.countdown.is_some()
    }

    /// Perform `effects` in order, including any follow-ups they queue.
    /// Breaks when the session should end.
    pub fn run(&mut self, session: &mut Session, effects: Vec<Effect>) -> ControlFlow<()> {
        let mut queue: VecDeque<Effect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            debug!(?effect, "executing effect");
            if let Effect::Quit = effect {
                return ControlFlow::Break(());
            }
            queue.extend(self.perform(session, effect));
        }
        ControlFlow::Continue(())
    }

    fn perform(&mut self, session: &mut Session, effect: Effect) -> Vec<Effect> {
        match effect {
            Effect::ReloadTimeline => self.reload_timeline(session),
            Effect::ReloadFacets => match load_facets(&self.store) {
                Ok(facets) => session.set_facets(facets),
                Err(e) => session.set_status(format!("load error: {e}")),
            },
            Effect::Create(entry) => match self.store.insert(&entry) {
                Ok(id) => session.notify(format!("Entry #{id} created")),
                Err(e) => session.set_status(e.to_string()),
            },
            Effect::SaveRichText(entry) => {
                if let Err(e) = self.store.insert(&entry) {
                    session.set_status(format!("save error: {e}"));
                }
            }
            Effect::LogPomodoro(entry) => {
                return match self.store.insert(&entry) {
                    Ok(id) => {
                        info!(id, "logged pomodoro session");
                        vec![Effect::ReloadTimeline, Effect::ReloadFacets]
                    }
                    Err(e) => {
                        session.set_status(format!("pomodoro log error: {e}"));
                        Vec::new()
                    }
                };
            }
            Effect::Reply {
                parent_id,
                text,
                project,
                tags,
            } => match self.store.reply(parent_id, &text, &project, &tags) {
                Ok(_) => session.notify("Reply added"),
                Err(e) => session.set_status(e.to_string()),
            },
            Effect::Update { id, update } => match self.store.update(id, &update) {
                Ok(()) => session.notify(format!("Entry #{id} updated")),
                Err(e) => session.set_status(e.to_string()),
            },
            Effect::Delete(id) => {
                return match self.store.delete(id) {
                    Ok(promoted) => {
                        match promoted {
                            Some(root) => session.notify(format!(
                                "Entry #{id} deleted, #{root} now starts the thread"
                            )),
                            None => session.notify(format!("Entry #{id} deleted")),
                        }
                        vec![Effect::ReloadTimeline, Effect::ReloadFacets]
                    }
                    Err(e) => {
                        session.set_status(e.to_string());
                        Vec::new()
                    }
                };
            }
            Effect::Suggest { source, query } => {
                match self.store.suggest(source, &query, suggestion_limit(source)) {
                    Ok(items) => {
                        if let Some(suggestions) = session.mode.suggestions_mut() {
                            suggestions.fill(&query, items);
                        }
                    }
                    Err(e) => warn!(error = %e, "completion lookup failed"),
                }
            }
            Effect::Duplicate(id) => {
                return match self.store.duplicate(id) {
                    Ok(copy) => {
                        session.notify(format!("Entry #{id} duplicated as #{copy}"));
                        vec![Effect::ReloadTimeline, Effect::ReloadFacets]
                    }
                    Err(e) => {
                        session.set_status(e.to_string());
                        Vec::new()
                    }
                };
            }
            Effect::ExportThread(root) => self.export_thread(session, root),
            Effect::ExportAll(format) => {
                let entries = session.loaded_entries();
                let options = ExportOptions::new(session.zone, session.now);
                match export_into_dir(&entries, &self.exports_dir, format, &options) {
                    Ok(path) => session.notify(format!(
                        "Exported {} entries to {}",
                        entries.len(),
                        path.display()
                    )),
                    Err(e) => session.set_status(format!("export error: {e}")),
                }
            }
            Effect::Search(query) => self.search(session, &query),
            Effect::LoadTimeReports(scope) => self.load_time_reports(session, scope),
            Effect::LoadProjects => match self.all_entries() {
                Ok(entries) => {
                    if let Mode::ProjectSummary(state) = &mut session.mode {
                        state.summaries = project_summaries(&entries, state.sort);
                        state.cursor = state.cursor.min(state.summaries.len().saturating_sub(1));
                    }
                }
                Err(e) => session.set_status(format!("load error: {e}")),
            },
            Effect::LoadTags => match self.all_entries() {
                Ok(entries) => {
                    if let Mode::TagAnalytics(state) = &mut session.mode {
                        state.tags = tag_analytics(&entries, state.sort);
                        state.cursor = state.cursor.min(state.tags.len().saturating_sub(1));
                    }
                }
                Err(e) => session.set_status(format!("load error: {e}")),
            },
            Effect::LoadOverview => self.load_overview(session),
            Effect::LoadCalendar { start, end } => {
                let counts = self.store.entry_counts_by_date(
                    midnight_utc(session, start),
                    midnight_utc(session, end),
                    &session.zone,
                );
                match counts {
                    Ok(counts) => {
                        if let Mode::Calendar(state) = &mut session.mode {
                            state.counts = counts;
                        }
                    }
                    Err(e) => session.set_status(format!("load error: {e}")),
                }
            }
            Effect::LoadDay(date) => {
                let entries = self.store.entries_between(
                    midnight_utc(session, date),
                    Some(midnight_utc(session, date + Days::days(1))),
                );
                match entries {
                    Ok(entries) => {
                        if let Mode::Calendar(state) = &mut session.mode {
                            state.day_entries = entries;
                        }
                    }
                    Err(e) => session.set_status(format!("load error: {e}")),
                }
            }
            Effect::LoadTemplates => match self.store.list_templates() {
                Ok(records) => session.templates = Library::new(records),
                Err(e) => session.set_status(format!("load error: {e}")),
            },
            Effect::SaveTemplate(record) => match self.store.create_template(&record) {
                Ok(()) => {
                    session.notify(format!("Template created: {}", record.name));
                    return vec![Effect::LoadTemplates];
                }
                Err(e) => session.set_status(format!("Error creating template: {e}")),
            },
            Effect::RecordTemplateUsage(id) => {
                if let Err(e) = self.store.record_template_usage(&id) {
                    warn!(id, error = %e, "failed to record template usage");
                }
            }
            Effect::StartCountdown => {
                let tx = self.tx.clone();
                self.countdown = Some(Ticker::spawn(tx, COUNTDOWN_INTERVAL, || Event::Countdown));
            }
            Effect::StopCountdown => self.countdown = None,
            Effect::Quit => {}
        }
        Vec::new()
    }

    /// Issue a timeline load. File-backed stores load on a second
    /// connection in the background; in-memory stores load inline.
    fn reload_timeline(&self, session: &mut Session) {
        let request = session.begin_reload();
        match self.store.reopen() {
            Some(Ok(store)) => {
                let tx = self.tx.clone();
                let zone = session.zone;
                thread::spawn(move || {
                    let ReloadRequest {
                        generation,
                        scope,
                        filter,
                        now,
                    } = request;
                    let result = load_blocks(&store, &zone, now, &scope, &filter);
                    // The UI may already be gone.
                    let _ = tx.send(Event::BlocksLoaded { generation, result });
                });
            }
            Some(Err(e)) => {
                warn!(error = %e, "background connection failed, loading inline");
                self.load_inline(session, request);
            }
            None => self.load_inline(session, request),
        }
    }

    fn load_inline(&self, session: &mut Session, request: ReloadRequest) {
        let result = load_blocks(
            &self.store,
            &session.zone,
            request.now,
            &request.scope,
            &request.filter,
        );
        session.apply_blocks(request.generation, result);
    }

    fn export_thread(&self, session: &mut Session, root: i64) {
        let Some(block) = session.blocks.iter().find(|b| b.root_id == root) else {
            session.set_status(format!("thread #{root} is not loaded"));
            return;
        };
        let options = ExportOptions::new(session.zone, session.now);
        match export_thread(block, &self.exports_dir, &options) {
            Ok(path) => session.notify(format!("Thread exported to {}", path.display())),
            Err(e) => session.set_status(format!("export error: {e}")),
        }
    }

    fn search(&self, session: &mut Session, query: &SearchQuery) {
        let filter = EntryFilter {
            text: non_blank(&query.text),
            projects: non_blank(&query.project).into_iter().collect(),
            categories: non_blank(&query.category).into_iter().collect(),
            tags: split_tags(&query.tags),
            ..EntryFilter::default()
        };
        match self.store.list(&filter, SEARCH_LIMIT, 0) {
            Ok(results) => {
                session.notify(format!("Found {} results", results.len()));
                if let Mode::AdvancedSearch(state) = &mut session.mode {
                    state.results = results;
                    state.cursor = 0;
                }
            }
            Err(e) => session.set_status(format!("search error: {e}")),
        }
    }

    fn load_time_reports(&self, session: &mut Session, scope: Scope) {
        let (since, until) = scope.bounds(session.now, &session.zone);
        match self.store.entries_between(since, until) {
            Ok(entries) => {
                let reports = time_reports(&entries, &session.zone);
                if let Mode::TimeReports(state) = &mut session.mode {
                    // A newer scope may have been requested meanwhile.
                    if state.scope == scope {
                        state.reports = reports;
                        state.cursor = 0;
                    }
                }
            }
            Err(e) => session.set_status(format!("load error: {e}")),
        }
    }

    fn load_overview(&self, session: &mut Session) {
        let entries = match self.all_entries() {
            Ok(entries) => entries,
            Err(e) => {
                session.set_status(format!("load error: {e}"));
                return;
            }
        };
        let numbers = overview(&entries, session.now, &session.zone);
        let reminder = session
            .config
            .reminder
            .enabled
            .then(|| next_reminder_at(session.now, &session.config.reminder, &session.zone))
            .flatten();
        if let Mode::Stats(state) | Mode::Dashboard(state) = &mut session.mode {
            state.overview = Some(numbers);
            state.reminder = reminder;
        }
    }

    fn all_entries(&self) -> Result<Vec<Entry>> {
        self.store.entries_between(DateTime::<Utc>::UNIX_EPOCH, None)
    }
}

fn midnight_utc(session: &Session, date: NaiveDate) -> DateTime<Utc> {
    session.zone.midnight(date).with_timezone(&Utc)
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Zone};
    use crate::export::ExportFormat;
    use crate::model::NewEntry;
    use crate::tui::modes::{AdvancedSearchState, CalendarState, OverviewState};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::sync::mpsc;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 11, h, 0, 0).unwrap()
    }

    fn setup() -> (Executor, Session, mpsc::Receiver<Event>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = EntryStore::open_in_memory().unwrap();
        let (tx, rx) = mpsc::channel();
        let executor = Executor::new(store, dir.path().join("exports"), tx);
        let now = Zone::utc().localize(at(14));
        let mut config = Config::default();
        config.timezone = "UTC".into();
        (executor, Session::new(config, now), rx, dir)
    }

    #[test]
    fn test_create_then_reload_shows_entry() {
        let (mut ex, mut s, _rx, _dir) = setup();
        let entry = NewEntry::new("task", "write changelog").project("pulse").at(at(9));
        let flow = ex.run(
            &mut s,
            vec![Effect::Create(entry), Effect::ReloadTimeline, Effect::ReloadFacets],
        );
        assert_eq!(flow, ControlFlow::Continue(()));
        assert_eq!(s.blocks.len(), 1);
        assert_eq!(s.blocks[0].entries[0].text, "write changelog");
        assert_eq!(s.facets.projects[0].label, "pulse");
    }

    #[test]
    fn test_typed_project_fills_completions() {
        use crate::tui::modes::{create, CreateForm};
        use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

        let (mut ex, mut s, _rx, _dir) = setup();
        for (project, hour) in [("pulse", 9), ("pantry", 10), ("api", 11)] {
            ex.store()
                .insert(&NewEntry::new("note", "x").project(project).at(at(hour)))
                .unwrap();
        }

        let mut form = CreateForm::new("note");
        form.field = 1;
        let t = create(form, &mut s, &KeyEvent::new(KeyCode::Char('P'), KeyModifiers::NONE));
        s.mode = t.mode;
        let _ = ex.run(&mut s, t.effects);

        let Mode::Create(form) = &s.mode else {
            panic!("expected create mode");
        };
        assert_eq!(form.suggestions.items(), ["pantry", "pulse", "api"]);

        // A lookup for text that has since changed is dropped.
        let _ = ex.run(
            &mut s,
            vec![Effect::Suggest {
                source: crate::store::SuggestSource::Projects,
                query: "a".into(),
            }],
        );
        let Mode::Create(form) = &s.mode else {
            panic!("expected create mode");
        };
        assert_eq!(form.suggestions.items(), ["pantry", "pulse", "api"]);
    }

    #[test]
    fn test_delete_only_entry_resets_cursor() {
        let (mut ex, mut s, _rx, _dir) = setup();
        let id = ex.store().insert(&NewEntry::new("note", "solo").at(at(9))).unwrap();
        let _ = ex.run(&mut s, vec![Effect::ReloadTimeline]);
        assert_eq!(s.blocks.len(), 1);
        let _ = ex.run(&mut s, vec![Effect::Delete(id)]);
        assert!(s.blocks.is_empty());
        assert_eq!(s.cursor.block, 0);
        assert_eq!(s.cursor.entry, 0);
    }

    #[test]
    fn test_failed_update_keeps_session_running() {
        let (mut ex, mut s, _rx, _dir) = setup();
        let update = crate::model::EntryUpdate {
            text: Some("x".into()),
            ..Default::default()
        };
        let flow = ex.run(&mut s, vec![Effect::Update { id: 999, update }]);
        assert_eq!(flow, ControlFlow::Continue(()));
        assert!(s.status.is_some());
    }

    #[test]
    fn test_quit_stops_processing() {
        let (mut ex, mut s, _rx, _dir) = setup();
        let entry = NewEntry::new("note", "never").at(at(9));
        let flow = ex.run(&mut s, vec![Effect::Quit, Effect::Create(entry)]);
        assert_eq!(flow, ControlFlow::Break(()));
        assert_eq!(ex.all_entries().unwrap().len(), 0);
    }

    #[test]
    fn test_search_fills_results() {
        let (mut ex, mut s, _rx, _dir) = setup();
        ex.store()
            .insert(&NewEntry::new("note", "alpha").project("api").at(at(9)))
            .unwrap();
        ex.store()
            .insert(&NewEntry::new("note", "beta").project("web").at(at(10)))
            .unwrap();
        s.mode = Mode::AdvancedSearch(AdvancedSearchState::default());
        let query = SearchQuery {
            project: "api".into(),
            ..SearchQuery::default()
        };
        let _ = ex.run(&mut s, vec![Effect::Search(query)]);
        let Mode::AdvancedSearch(state) = &s.mode else {
            panic!("expected advanced search");
        };
        assert_eq!(state.results.len(), 1);
        assert_eq!(s.status.as_deref(), Some("Found 1 results"));
    }

    #[test]
    fn test_calendar_counts_and_day() {
        let (mut ex, mut s, _rx, _dir) = setup();
        ex.store().insert(&NewEntry::new("note", "a").at(at(9))).unwrap();
        ex.store().insert(&NewEntry::new("note", "b").at(at(10))).unwrap();
        let date = at(9).date_naive();
        let state = CalendarState::new(date);
        let (start, end) = state.range();
        s.mode = Mode::Calendar(state);
        let _ = ex.run(&mut s, vec![Effect::LoadCalendar { start, end }, Effect::LoadDay(date)]);
        let Mode::Calendar(state) = &s.mode else {
            panic!("expected calendar");
        };
        assert_eq!(state.count(date), 2);
        assert_eq!(state.day_entries.len(), 2);
    }

    #[test]
    fn test_overview_lands_in_dashboard() {
        let (mut ex, mut s, _rx, _dir) = setup();
        ex.store().insert(&NewEntry::new("task", "a").at(at(9))).unwrap();
        s.mode = Mode::Dashboard(OverviewState::default());
        let _ = ex.run(&mut s, vec![Effect::LoadOverview]);
        let Mode::Dashboard(state) = &s.mode else {
            panic!("expected dashboard");
        };
        assert_eq!(state.overview.as_ref().map(|o| o.total), Some(1));
        assert!(state.reminder.is_some());
    }

    #[test]
    fn test_export_all_writes_file() {
        let (mut ex, mut s, _rx, dir) = setup();
        ex.store().insert(&NewEntry::new("note", "a").at(at(9))).unwrap();
        let _ = ex.run(&mut s, vec![Effect::ReloadTimeline, Effect::ExportAll(ExportFormat::Json)]);
        let files: Vec<_> = std::fs::read_dir(dir.path().join("exports"))
            .unwrap()
            .collect();
        assert_eq!(files.len(), 1);
        assert!(s.status.as_deref().unwrap().starts_with("Exported 1 entries"));
    }

    #[test]
    fn test_countdown_source_lifecycle() {
        let (mut ex, mut s, rx, _dir) = setup();
        let _ = ex.run(&mut s, vec![Effect::StartCountdown]);
        assert!(ex.countdown_running());
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(3)),
            Ok(Event::Countdown)
        ));
        let _ = ex.run(&mut s, vec![Effect::StopCountdown]);
        assert!(!ex.countdown_running());
    }

    #[test]
    fn test_file_store_reload_arrives_as_event() {
        let dir = tempfile::tempdir().unwrap();
        let store = EntryStore::open(&dir.path().join("pulse.db")).unwrap();
        store.insert(&NewEntry::new("note", "bg").at(at(9))).unwrap();
        let (tx, rx) = mpsc::channel();
        let mut ex = Executor::new(store, dir.path().join("exports"), tx);
        let mut config = Config::default();
        config.timezone = "UTC".into();
        let mut s = Session::new(config, Zone::utc().localize(at(14)));
        let _ = ex.run(&mut s, vec![Effect::ReloadTimeline]);
        let Ok(Event::BlocksLoaded { generation, result }) =
            rx.recv_timeout(Duration::from_secs(5))
        else {
            panic!("expected a background load");
        };
        assert!(s.apply_blocks(generation, result));
        assert_eq!(s.blocks.len(), 1);
    }
}
