//! Route input to the handler of the active mode.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};

use super::effect::{Effect, Transition};
use super::modes::{self, Mode};
use super::state::Session;

/// Lines scrolled per mouse wheel notch.
const WHEEL_LINES: isize = 3;

/// Handle one key press and return the effects to run.
pub fn handle_key(session: &mut Session, key: KeyEvent) -> Vec<Effect> {
    if key.kind == KeyEventKind::Release {
        return Vec::new();
    }
    let key = normalize(key);

    let global_quit = matches!(
        (key.modifiers, key.code),
        (KeyModifiers::NONE, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c'))
    );
    if global_quit && matches!(session.mode, Mode::Normal | Mode::Help(_)) {
        return vec![Effect::Quit];
    }

    let mode = std::mem::take(&mut session.mode);
    let Transition { mode, effects } = route(mode, session, &key);
    session.mode = mode;
    effects
}

/// Wheel scrolling in the timeline and help screen.
pub fn handle_mouse(session: &mut Session, mouse: MouseEvent) {
    let delta = match mouse.kind {
        MouseEventKind::ScrollUp => -WHEEL_LINES,
        MouseEventKind::ScrollDown => WHEEL_LINES,
        _ => return,
    };
    if let Mode::Help(state) = &mut session.mode {
        state.scroll = state.scroll.saturating_add_signed(delta);
    } else if session.mode.is_normal_family() {
        session.scroll_view(delta);
    }
}

/// Shifted letters arrive with SHIFT set; the letter already carries the case.
fn normalize(mut key: KeyEvent) -> KeyEvent {
    if matches!(key.code, KeyCode::Char(_)) && key.modifiers == KeyModifiers::SHIFT {
        key.modifiers = KeyModifiers::NONE;
    }
    key
}

fn route(mode: Mode, session: &mut Session, key: &KeyEvent) -> Transition {
    match mode {
        Mode::Normal => modes::normal::handle(session, key),
        Mode::Search => modes::live_search(session, key),
        Mode::Since(state) => modes::since(state, session, key),
        Mode::Picker(state) => modes::picker(state, session, key),
        Mode::Create(form) => modes::create(form, session, key),
        Mode::Edit(form) => modes::editor(form, false, session, key),
        Mode::Reply(form) => modes::editor(form, true, session, key),
        Mode::Help(state) => modes::help(state, key),
        Mode::Focus(state) => modes::focus(state, session, key),
        Mode::Stats(state) => modes::stats(state, key),
        Mode::Dashboard(state) => modes::dashboard(state, session, key),
        Mode::Calendar(state) => modes::calendar(state, session, key),
        Mode::Templates(state) => modes::templates(state, session, key),
        Mode::Export(state) => modes::export(state, session, key),
        Mode::AdvancedSearch(state) => modes::advanced_search(state, session, key),
        Mode::TimeReports(state) => modes::time_reports(state, session, key),
        Mode::ProjectSummary(state) => modes::project_summary(state, session, key),
        Mode::TagAnalytics(state) => modes::tag_analytics(state, session, key),
        Mode::CommandPalette(state) => modes::command_palette(state, session, key),
        Mode::RichTextEditor(state) => modes::rich_text(state, session, key),
        Mode::TemplateEdit(form) => modes::template_edit(form, session, key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Zone};
    use crate::tui::modes::{HelpState, SinceState};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn session() -> Session {
        let now = Zone::utc().localize(Utc.with_ymd_and_hms(2025, 6, 11, 14, 0, 0).unwrap());
        Session::new(Config::default(), now)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_quit_only_from_normal_and_help() {
        let mut s = session();
        assert_eq!(handle_key(&mut s, key(KeyCode::Char('q'))), vec![Effect::Quit]);
        s.mode = Mode::Help(HelpState::default());
        assert_eq!(handle_key(&mut s, key(KeyCode::Char('q'))), vec![Effect::Quit]);
        s.mode = Mode::Since(SinceState::default());
        assert!(handle_key(&mut s, key(KeyCode::Char('q'))).is_empty());
        let Mode::Since(state) = &s.mode else {
            panic!("expected since mode");
        };
        assert_eq!(state.input.value(), "q");
    }

    #[test]
    fn test_shifted_letters_are_normalized() {
        let mut s = session();
        handle_key(&mut s, KeyEvent::new(KeyCode::Char('C'), KeyModifiers::SHIFT));
        assert!(matches!(s.mode, Mode::Calendar(_)));
    }

    #[test]
    fn test_mode_restored_after_handler() {
        let mut s = session();
        handle_key(&mut s, key(KeyCode::Char('s')));
        assert!(matches!(s.mode, Mode::Since(_)));
        handle_key(&mut s, key(KeyCode::Esc));
        assert_eq!(s.mode, Mode::Normal);
    }

    #[test]
    fn test_wheel_scrolls_help() {
        let mut s = session();
        s.mode = Mode::Help(HelpState::default());
        let wheel = MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(&mut s, wheel);
        assert_eq!(s.mode, Mode::Help(HelpState { scroll: 3 }));
    }
}
