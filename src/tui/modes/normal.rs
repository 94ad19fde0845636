//! Normal mode: timeline navigation and the global key map.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::timeline::Scope;

use super::super::effect::{Effect, Transition};
use super::super::palette::Action;
use super::super::state::{Focus, Section, Session, ViewMode};
use super::super::theme::Theme;
use super::{
    AdvancedSearchState, CalendarState, CreateForm, EditorForm, ExportState, FocusState,
    HelpState, Mode, OverviewState, PaletteState, PickerKind, PickerState, ProjectSummaryState,
    RichTextState, SinceState, TagAnalyticsState, TemplateForm, TemplatesState, TimeReportsState,
};

/// Handle a key in normal mode.
pub fn handle(session: &mut Session, key: &KeyEvent) -> Transition {
    match (key.modifiers, key.code) {
        (KeyModifiers::NONE, KeyCode::Tab) => {
            session.cycle_focus();
            Transition::normal()
        }
        (KeyModifiers::NONE, KeyCode::Right | KeyCode::Char('l')) => {
            if kanban_focused(session) {
                if let Some(message) = session.scroll_kanban(1) {
                    session.notify(message);
                }
            } else if session.focus == Focus::Sidebar && session.show_sidebar {
                session.show_sidebar = false;
                session.focus = Focus::Timeline;
            } else {
                session.show_sidebar = true;
                session.focus = Focus::Sidebar;
            }
            Transition::normal()
        }
        (KeyModifiers::NONE, KeyCode::Left | KeyCode::Char('h')) => {
            if kanban_focused(session) {
                if let Some(message) = session.scroll_kanban(-1) {
                    session.notify(message);
                }
            } else if session.focus == Focus::Thread && session.show_thread {
                session.show_thread = false;
                session.focus = Focus::Timeline;
            } else {
                session.show_thread = true;
                session.focus = Focus::Thread;
            }
            Transition::normal()
        }
        (KeyModifiers::NONE, KeyCode::Char('/')) => perform(session, Action::Search),
        (KeyModifiers::NONE, KeyCode::Char('s')) => {
            Transition::to(Mode::Since(SinceState::default()))
        }
        (KeyModifiers::NONE, KeyCode::Char('t')) => {
            perform(session, Action::SetScope(session.scope.cycle()))
        }
        (KeyModifiers::NONE, KeyCode::Char(c)) if Scope::from_digit(c).is_some() => {
            match Scope::from_digit(c) {
                Some(scope) => perform(session, Action::SetScope(scope)),
                None => Transition::normal(),
            }
        }
        (KeyModifiers::NONE, KeyCode::Char('p')) => picker(PickerKind::Projects),
        (KeyModifiers::NONE, KeyCode::Char('c')) => picker(PickerKind::Categories),
        (KeyModifiers::NONE, KeyCode::Char('#')) => picker(PickerKind::Tags),
        (KeyModifiers::NONE, KeyCode::Char('F')) => perform(session, Action::AdvancedSearch),
        (KeyModifiers::NONE, KeyCode::Char('T')) => perform(session, Action::Templates),
        (KeyModifiers::NONE, KeyCode::Char('C')) => perform(session, Action::Calendar),
        (KeyModifiers::NONE, KeyCode::Char('E')) => perform(session, Action::Export),
        (KeyModifiers::NONE, KeyCode::Char('R')) | (KeyModifiers::CONTROL, KeyCode::Char('r')) => {
            perform(session, Action::TimeReports)
        }
        (KeyModifiers::NONE, KeyCode::Char('J')) | (KeyModifiers::CONTROL, KeyCode::Char('p')) => {
            perform(session, Action::ProjectSummary)
        }
        (KeyModifiers::NONE, KeyCode::Char('A')) | (KeyModifiers::CONTROL, KeyCode::Char('a')) => {
            perform(session, Action::TagAnalytics)
        }
        (KeyModifiers::NONE, KeyCode::Char('v')) => {
            session.view = session.view.cycle();
            session.follow_cursor();
            session.notify(format!("View: {}", session.view));
            Transition::normal()
        }
        (KeyModifiers::NONE, KeyCode::Char('o')) => {
            session.sort = session.sort.cycle();
            resort(session);
            session.notify(format!("Sort: {}", session.sort));
            Transition::normal()
        }
        (KeyModifiers::NONE, KeyCode::Char('O')) => {
            session.descending = !session.descending;
            resort(session);
            session.notify(if session.descending {
                "Sort: Descending"
            } else {
                "Sort: Ascending"
            });
            Transition::normal()
        }
        (KeyModifiers::NONE, KeyCode::Char('P')) => {
            if session.pomodoro.active {
                perform(session, Action::PomodoroStop)
            } else {
                perform(session, Action::PomodoroWork)
            }
        }
        (KeyModifiers::NONE, KeyCode::Char('d')) => match session.current_entry() {
            Some(entry) => Transition::normal().with(Effect::Delete(entry.id)),
            None => Transition::normal(),
        },
        (KeyModifiers::NONE, KeyCode::Char('D')) => match session.current_entry() {
            Some(entry) => Transition::normal().with(Effect::Duplicate(entry.id)),
            None => Transition::normal(),
        },
        (KeyModifiers::NONE, KeyCode::Char('?')) => perform(session, Action::Help),
        (KeyModifiers::ALT, KeyCode::Char('n')) | (KeyModifiers::NONE, KeyCode::Char('n')) => {
            perform(session, Action::Create("note"))
        }
        (KeyModifiers::ALT, KeyCode::Char('t')) => perform(session, Action::Create("task")),
        (KeyModifiers::ALT, KeyCode::Char('m')) => perform(session, Action::Create("meeting")),
        (KeyModifiers::NONE, KeyCode::Up | KeyCode::Char('k')) => {
            match session.focus {
                Focus::Timeline => session.cursor_up(),
                Focus::Sidebar => session.sidebar_up(),
                Focus::Thread => {}
            }
            Transition::normal()
        }
        (KeyModifiers::NONE, KeyCode::Down | KeyCode::Char('j')) => {
            match session.focus {
                Focus::Timeline => session.cursor_down(),
                Focus::Sidebar => session.sidebar_down(),
                Focus::Thread => {}
            }
            Transition::normal()
        }
        (KeyModifiers::NONE, KeyCode::Char(' ')) if session.focus == Focus::Sidebar => {
            toggle_section(session)
        }
        (KeyModifiers::NONE, KeyCode::Enter) => match session.focus {
            Focus::Sidebar => toggle_sidebar_item(session),
            _ if session.blocks.is_empty() => Transition::normal(),
            _ => {
                session.show_thread = true;
                session.focus = Focus::Thread;
                Transition::normal()
            }
        },
        (KeyModifiers::NONE, KeyCode::Char('r')) => match session.current_entry() {
            Some(parent) => Transition::to(Mode::Reply(EditorForm::reply(parent))),
            None => Transition::normal(),
        },
        (KeyModifiers::NONE, KeyCode::Char('e')) => match session.current_entry() {
            Some(target) => Transition::to(Mode::Edit(EditorForm::edit(target))),
            None => Transition::normal(),
        },
        (KeyModifiers::NONE, KeyCode::Char('x')) => match session.current_block() {
            Some(block) => Transition::normal().with(Effect::ExportThread(block.root_id)),
            None => Transition::normal(),
        },
        (KeyModifiers::CONTROL, KeyCode::Char('b')) => perform(session, Action::ToggleSidebar),
        (KeyModifiers::CONTROL, KeyCode::Char('k')) => {
            Transition::to(Mode::CommandPalette(PaletteState::default()))
        }
        (KeyModifiers::CONTROL, KeyCode::Char('f')) => perform(session, Action::FocusMode),
        (KeyModifiers::CONTROL, KeyCode::Char('t')) => perform(session, Action::CycleTheme),
        (KeyModifiers::CONTROL, KeyCode::Char('g')) => perform(session, Action::GotoToday),
        (KeyModifiers::CONTROL, KeyCode::Char('d')) => {
            if let Some(id) = session.current_entry().map(|e| e.id) {
                if session.bookmarks.remove(&id) {
                    session.notify("Bookmark removed");
                } else {
                    session.bookmarks.insert(id);
                    session.notify("Entry bookmarked");
                }
            }
            Transition::normal()
        }
        (KeyModifiers::CONTROL, KeyCode::Char('w')) => perform(session, Action::Dashboard),
        // Most terminals report ctrl+i as Tab, so `S` is the reliable binding.
        (KeyModifiers::NONE, KeyCode::Char('S')) | (KeyModifiers::CONTROL, KeyCode::Char('i')) => {
            perform(session, Action::Stats)
        }
        (KeyModifiers::NONE, KeyCode::PageUp) => {
            if session.focus == Focus::Timeline {
                session.page_by(-1);
            }
            Transition::normal()
        }
        (KeyModifiers::NONE, KeyCode::PageDown) => {
            if session.focus == Focus::Timeline {
                session.page_by(1);
            }
            Transition::normal()
        }
        (KeyModifiers::NONE, KeyCode::Home | KeyCode::Char('g')) => {
            if session.focus == Focus::Timeline {
                session.cursor_home();
            }
            Transition::normal()
        }
        (KeyModifiers::NONE, KeyCode::End | KeyCode::Char('G')) => {
            if session.focus == Focus::Timeline {
                session.cursor_end();
            }
            Transition::normal()
        }
        (KeyModifiers::NONE, KeyCode::Esc) => {
            session.status = None;
            Transition::normal()
        }
        _ => Transition::normal(),
    }
}

/// Run `action` from normal mode. Key bindings and the command palette both
/// end up here.
pub fn perform(session: &mut Session, action: Action) -> Transition {
    match action {
        Action::GotoToday => {
            session.scope = Scope::Today;
            session.cursor_home();
            session.notify("Jumped to today");
            Transition::normal().with(Effect::ReloadTimeline)
        }
        Action::SetScope(scope) => {
            session.scope = scope;
            session.notify(format!("Scope: {scope}"));
            Transition::normal().with(Effect::ReloadTimeline)
        }
        Action::ToggleSidebar => {
            session.show_sidebar = !session.show_sidebar;
            if session.show_sidebar {
                session.notify("Sidebar opened");
            } else {
                if session.focus == Focus::Sidebar {
                    session.focus = Focus::Timeline;
                }
                session.notify("Sidebar closed");
            }
            Transition::normal()
        }
        Action::CycleTheme => {
            session.theme = (session.theme + 1) % Theme::all().len();
            session.notify(format!("Theme: {}", session.theme().title()));
            Transition::normal()
        }
        Action::FocusMode => {
            let saved = FocusState {
                show_sidebar: session.show_sidebar,
                show_thread: session.show_thread,
            };
            session.show_sidebar = false;
            session.show_thread = false;
            session.focus = Focus::Timeline;
            session.notify("Focus mode enabled");
            Transition::to(Mode::Focus(saved))
        }
        Action::Dashboard => {
            session.notify("Dashboard opened");
            Transition::to(Mode::Dashboard(OverviewState::default())).with(Effect::LoadOverview)
        }
        Action::Stats => {
            Transition::to(Mode::Stats(OverviewState::default())).with(Effect::LoadOverview)
        }
        Action::Create(category) => Transition::to(Mode::Create(CreateForm::new(category))),
        Action::RichText => Transition::to(Mode::RichTextEditor(RichTextState::default())),
        Action::Templates => {
            session.notify("Template Selection");
            Transition::to(Mode::Templates(TemplatesState::default())).with(Effect::LoadTemplates)
        }
        Action::NewTemplate => Transition::to(Mode::TemplateEdit(TemplateForm::default())),
        Action::TimeReports => {
            let state = TimeReportsState::new(Scope::ThisWeek);
            Transition::to(Mode::TimeReports(state))
                .with(Effect::LoadTimeReports(Scope::ThisWeek))
        }
        Action::ProjectSummary => {
            Transition::to(Mode::ProjectSummary(ProjectSummaryState::default()))
                .with(Effect::LoadProjects)
        }
        Action::TagAnalytics => {
            Transition::to(Mode::TagAnalytics(TagAnalyticsState::default())).with(Effect::LoadTags)
        }
        Action::Calendar => {
            let state = CalendarState::new(session.now.date_naive());
            let (start, end) = state.range();
            session.notify("Calendar View");
            let selected = state.selected;
            Transition::to(Mode::Calendar(state))
                .with(Effect::LoadCalendar { start, end })
                .with(Effect::LoadDay(selected))
        }
        Action::Search => Transition::to(Mode::Search),
        Action::AdvancedSearch => {
            session.notify("Advanced Search Mode");
            Transition::to(Mode::AdvancedSearch(AdvancedSearchState::default()))
        }
        Action::Export => {
            session.notify("Export Options");
            Transition::to(Mode::Export(ExportState::default()))
        }
        Action::PomodoroWork => {
            session.pomodoro.start_work();
            session.notify(format!(
                "Pomodoro started ({} min work)",
                session.pomodoro.work_minutes()
            ));
            Transition::normal().with(Effect::StartCountdown)
        }
        Action::PomodoroBreak => {
            session.pomodoro.start_break();
            session.notify("Break started");
            Transition::normal().with(Effect::StartCountdown)
        }
        Action::PomodoroStop => {
            session.pomodoro.stop();
            session.notify("Pomodoro stopped");
            Transition::normal().with(Effect::StopCountdown)
        }
        Action::PomodoroStats => {
            let stats = session.pomodoro.stats().replace('\n', " | ");
            session.notify(stats);
            Transition::normal()
        }
        Action::PomodoroAutoLog => {
            session.pomodoro.auto_log = !session.pomodoro.auto_log;
            session.notify(if session.pomodoro.auto_log {
                "Pomodoro auto-log enabled"
            } else {
                "Pomodoro auto-log disabled"
            });
            Transition::normal()
        }
        Action::Help => Transition::to(Mode::Help(HelpState::default())),
        Action::Quit => Transition::normal().with(Effect::Quit),
    }
}

fn picker(kind: PickerKind) -> Transition {
    Transition::to(Mode::Picker(PickerState::new(kind)))
}

fn kanban_focused(session: &Session) -> bool {
    session.view == ViewMode::Kanban && session.focus == Focus::Timeline
}

fn resort(session: &mut Session) {
    crate::timeline::sort_blocks(&mut session.blocks, session.sort, session.descending);
    session.clamp_cursor();
    session.follow_cursor();
}

/// Toggle the facet under the sidebar cursor.
fn toggle_sidebar_item(session: &mut Session) -> Transition {
    let Some(label) = session.sidebar_item().map(|item| item.label.clone()) else {
        return Transition::normal();
    };
    match session.sidebar.section {
        Section::Projects => session.filter.toggle_project(&label),
        Section::Categories => session.filter.toggle_category(&label.to_lowercase()),
        Section::Tags => session.filter.toggle_tag(&label),
    }
    Transition::normal().reload()
}

/// Space in the sidebar: clear the section's filter, or for tags select
/// every tag when none is selected.
fn toggle_section(session: &mut Session) -> Transition {
    if session.section_items(session.sidebar.section).is_empty() {
        return Transition::normal();
    }
    match session.sidebar.section {
        Section::Projects => {
            if session.filter.project.take().is_some() {
                session.notify("Cleared project filter");
            } else {
                session.notify("Showing all projects");
            }
        }
        Section::Categories => {
            if session.filter.category.take().is_some() {
                session.notify("Cleared category filter");
            } else {
                session.notify("Showing all categories");
            }
        }
        Section::Tags => {
            if session.filter.tags.is_empty() {
                let tags: Vec<String> = session
                    .facets
                    .tags
                    .iter()
                    .map(|t| t.label.clone())
                    .collect();
                let count = tags.len();
                session.filter.tags.extend(tags);
                session.notify(format!("Selected all {count} tags"));
            } else {
                session.filter.tags.clear();
                session.notify("Cleared all tag filters");
            }
        }
    }
    Transition::normal().reload()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Zone};
    use crate::model::{Entry, FacetItem};
    use crate::store::Facets;
    use crate::timeline::Block;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn session() -> Session {
        let now = Zone::utc().localize(Utc.with_ymd_and_hms(2025, 6, 11, 14, 0, 0).unwrap());
        let mut s = Session::new(Config::default(), now);
        let entries = (1..=3)
            .map(|id| Entry {
                id,
                timestamp: Utc.with_ymd_and_hms(2025, 6, 11, 9, id as u32, 0).unwrap(),
                category: "note".into(),
                text: format!("entry {id}"),
                project: Some("api".into()),
                tags: vec!["x".into()],
                duration_minutes: None,
                thread_id: None,
                parent_id: None,
            })
            .map(|e| Block::from_thread(vec![e]).unwrap())
            .collect();
        let generation = s.begin_reload().generation;
        s.apply_blocks(generation, Ok(entries));
        s
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[rstest]
    #[case('1', Scope::Today)]
    #[case('2', Scope::Yesterday)]
    #[case('4', Scope::LastWeek)]
    #[case('6', Scope::LastMonth)]
    #[case('0', Scope::All)]
    fn test_scope_keys_reload(#[case] c: char, #[case] scope: Scope) {
        let mut s = session();
        let t = handle(&mut s, &key(KeyCode::Char(c)));
        assert_eq!(s.scope, scope);
        assert_eq!(t.effects, vec![Effect::ReloadTimeline]);
        assert_eq!(t.mode, Mode::Normal);
    }

    #[test]
    fn test_delete_targets_cursor_entry() {
        let mut s = session();
        handle(&mut s, &key(KeyCode::Down));
        let t = handle(&mut s, &key(KeyCode::Char('d')));
        let id = s.current_entry().unwrap().id;
        assert_eq!(t.effects, vec![Effect::Delete(id)]);
    }

    #[test]
    fn test_reply_prefills_parent_values() {
        let mut s = session();
        let t = handle(&mut s, &key(KeyCode::Char('r')));
        let Mode::Reply(form) = t.mode else {
            panic!("expected reply mode");
        };
        assert_eq!(form.project.value(), "api");
        assert_eq!(form.tags.value(), "x");
        assert!(form.text.is_blank());
    }

    #[test]
    fn test_edit_loads_current_values() {
        let mut s = session();
        let t = handle(&mut s, &key(KeyCode::Char('e')));
        let Mode::Edit(form) = t.mode else {
            panic!("expected edit mode");
        };
        assert_eq!(form.text.value(), s.current_entry().unwrap().text);
    }

    #[test]
    fn test_sidebar_enter_toggles_filter() {
        let mut s = session();
        s.set_facets(Facets {
            projects: vec![FacetItem::new("api", 3)],
            ..Facets::default()
        });
        s.show_sidebar = true;
        s.focus = Focus::Sidebar;
        let t = handle(&mut s, &key(KeyCode::Enter));
        assert_eq!(s.filter.project.as_deref(), Some("api"));
        assert_eq!(t.effects, vec![Effect::ReloadTimeline, Effect::ReloadFacets]);
        handle(&mut s, &key(KeyCode::Enter));
        assert_eq!(s.filter.project, None);
    }

    #[test]
    fn test_pomodoro_toggle_starts_and_stops_countdown() {
        let mut s = session();
        let t = handle(&mut s, &key(KeyCode::Char('P')));
        assert!(s.pomodoro.active);
        assert_eq!(t.effects, vec![Effect::StartCountdown]);
        let t = handle(&mut s, &key(KeyCode::Char('P')));
        assert!(!s.pomodoro.active);
        assert_eq!(t.effects, vec![Effect::StopCountdown]);
    }

    #[test]
    fn test_focus_mode_hides_panes() {
        let mut s = session();
        s.show_sidebar = true;
        let t = perform(&mut s, Action::FocusMode);
        assert!(!s.show_sidebar);
        assert_eq!(
            t.mode,
            Mode::Focus(FocusState {
                show_sidebar: true,
                show_thread: false
            })
        );
    }

    #[test]
    fn test_shift_s_opens_stats() {
        let mut s = session();
        let t = handle(&mut s, &key(KeyCode::Char('S')));
        assert!(matches!(t.mode, Mode::Stats(_)));
        assert_eq!(t.effects, vec![Effect::LoadOverview]);

        // Shifted letters arrive with SHIFT set from the terminal.
        let effects = crate::tui::dispatch::handle_key(
            &mut s,
            KeyEvent::new(KeyCode::Char('S'), KeyModifiers::SHIFT),
        );
        assert!(matches!(s.mode, Mode::Stats(_)));
        assert_eq!(effects, vec![Effect::LoadOverview]);
    }

    #[test]
    fn test_bookmark_toggle() {
        let mut s = session();
        let ctrl_d = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL);
        handle(&mut s, &ctrl_d);
        assert_eq!(s.bookmarks.len(), 1);
        handle(&mut s, &ctrl_d);
        assert!(s.bookmarks.is_empty());
    }
}
