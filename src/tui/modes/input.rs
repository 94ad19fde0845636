//! Small modes: live search, since input, pickers, help, focus and export.

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::export::ExportFormat;
use crate::model::FacetItem;
use crate::timeline::Scope;
use crate::util::dateparse::parse_flexible;

use super::super::components::TextInput;
use super::super::effect::{Effect, Transition};
use super::super::state::Session;
use super::{step, Mode};

/// Lines moved by page keys in the help screen.
const HELP_PAGE: usize = 10;

/// Since-input buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinceState {
    /// Typed date expression.
    pub input: TextInput,
}

/// Which facet list a picker shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    /// Single project.
    Projects,
    /// Single category.
    Categories,
    /// Any number of tags.
    Tags,
}

impl PickerKind {
    /// Title of the picker dialog.
    pub fn title(self) -> &'static str {
        match self {
            Self::Projects => "Pick project",
            Self::Categories => "Pick category",
            Self::Tags => "Pick tags",
        }
    }

    /// Facets listed by this picker.
    pub fn items(self, session: &Session) -> &[FacetItem] {
        match self {
            Self::Projects => &session.facets.projects,
            Self::Categories => &session.facets.categories,
            Self::Tags => &session.facets.tags,
        }
    }

    /// Whether `label` is part of the active filter.
    pub fn is_selected(self, session: &Session, label: &str) -> bool {
        match self {
            Self::Projects => session.filter.project.as_deref() == Some(label),
            Self::Categories => session
                .filter
                .category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(label)),
            Self::Tags => session.filter.tags.contains(label),
        }
    }
}

/// Picker cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerState {
    /// Facet list shown.
    pub kind: PickerKind,
    /// Highlighted item.
    pub cursor: usize,
}

impl PickerState {
    /// Picker at the first item.
    pub fn new(kind: PickerKind) -> Self {
        Self { kind, cursor: 0 }
    }
}

/// Help scroll position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HelpState {
    /// First visible line.
    pub scroll: usize,
}

/// Pane visibility to restore when focus mode ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusState {
    /// Sidebar was open.
    pub show_sidebar: bool,
    /// Thread pane was open.
    pub show_thread: bool,
}

/// Export dialog selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportState {
    /// Chosen format.
    pub format: ExportFormat,
}

/// Live filter: every edit reloads the timeline.
pub fn search(session: &mut Session, key: &KeyEvent) -> Transition {
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => {
            session.filter.text.clear();
            Transition::normal().reload()
        }
        (_, KeyCode::Enter) => Transition::normal(),
        (_, KeyCode::Backspace) => {
            if session.filter.text.pop().is_some() {
                Transition::to(Mode::Search).reload()
            } else {
                Transition::to(Mode::Search)
            }
        }
        (KeyModifiers::NONE, KeyCode::Char(c)) => {
            session.filter.text.push(c);
            Transition::to(Mode::Search).reload()
        }
        _ => Transition::to(Mode::Search),
    }
}

/// Custom scope start. A parse failure keeps the input open.
pub fn since(mut state: SinceState, session: &mut Session, key: &KeyEvent) -> Transition {
    match key.code {
        KeyCode::Esc => Transition::normal(),
        KeyCode::Enter => {
            match parse_flexible(state.input.value(), session.now, &session.zone) {
                Ok(ts) => {
                    let scope = Scope::Since(ts.with_timezone(&Utc));
                    session.scope = scope;
                    session.notify(format!("Scope: {scope}"));
                    Transition::normal().with(Effect::ReloadTimeline)
                }
                Err(e) => {
                    session.set_status(format!("invalid date: {e}"));
                    Transition::to(Mode::Since(state))
                }
            }
        }
        _ => {
            state.input.handle_key(key);
            Transition::to(Mode::Since(state))
        }
    }
}

/// Facet picker. Confirming toggles the value and closes the picker.
pub fn picker(mut state: PickerState, session: &mut Session, key: &KeyEvent) -> Transition {
    let len = state.kind.items(session).len();
    match key.code {
        KeyCode::Esc => return Transition::normal(),
        KeyCode::Up | KeyCode::Char('k') => state.cursor = step(state.cursor, false, len),
        KeyCode::Down | KeyCode::Char('j') => state.cursor = step(state.cursor, true, len),
        KeyCode::Enter => {
            if len == 0 {
                return Transition::to(Mode::Picker(state));
            }
            let index = state.cursor.min(len - 1);
            let label = state.kind.items(session)[index].label.clone();
            match state.kind {
                PickerKind::Projects => session.filter.toggle_project(&label),
                PickerKind::Categories => session.filter.toggle_category(&label.to_lowercase()),
                PickerKind::Tags => session.filter.toggle_tag(&label),
            }
            return Transition::normal().reload();
        }
        _ => {}
    }
    Transition::to(Mode::Picker(state))
}

/// Help screen scrolling.
pub fn help(mut state: HelpState, key: &KeyEvent) -> Transition {
    match key.code {
        KeyCode::Esc | KeyCode::Char('?') => return Transition::normal(),
        KeyCode::Up | KeyCode::Char('k') => state.scroll = state.scroll.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => state.scroll += 1,
        KeyCode::PageUp => state.scroll = state.scroll.saturating_sub(HELP_PAGE),
        KeyCode::PageDown => state.scroll += HELP_PAGE,
        KeyCode::Home | KeyCode::Char('g') => state.scroll = 0,
        _ => {}
    }
    Transition::to(Mode::Help(state))
}

/// Focus mode: only cursor movement, `esc` or `ctrl+f` leave.
pub fn focus(state: FocusState, session: &mut Session, key: &KeyEvent) -> Transition {
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) | (KeyModifiers::CONTROL, KeyCode::Char('f')) => {
            session.show_sidebar = state.show_sidebar;
            session.show_thread = state.show_thread;
            session.notify("Focus mode disabled");
            return Transition::normal();
        }
        (_, KeyCode::Up | KeyCode::Char('k')) => session.cursor_up(),
        (_, KeyCode::Down | KeyCode::Char('j')) => session.cursor_down(),
        (_, KeyCode::PageUp) => session.page_by(-1),
        (_, KeyCode::PageDown) => session.page_by(1),
        _ => {}
    }
    Transition::to(Mode::Focus(state))
}

/// Export dialog: `1`-`3` choose the format, `e` or enter writes the file.
pub fn export(mut state: ExportState, session: &mut Session, key: &KeyEvent) -> Transition {
    match key.code {
        KeyCode::Esc => Transition::normal(),
        KeyCode::Char('e') | KeyCode::Enter => {
            Transition::normal().with(Effect::ExportAll(state.format))
        }
        KeyCode::Char(c) => {
            if let Some(format) = ExportFormat::from_digit(c) {
                state.format = format;
                session.notify(format!("Export format: {format}"));
            }
            Transition::to(Mode::Export(state))
        }
        _ => Transition::to(Mode::Export(state)),
    }
}
