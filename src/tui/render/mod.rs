//! Drawing.
//!
//! [`draw`] is a pure mapping from the [`Session`] to a frame: it reads
//! state, never mutates it, and performs no I/O. Page sizes are derived from
//! the frame on every call so a resize shows up on the next draw.
//!
//! Screen layout, top to bottom:
//!
//! ```text
//! top bar         scope, thread count, filters, countdown, clock
//! summary line    per-category counts, view and sort
//! panels          [sidebar] main view [thread]
//! quick actions   key hints, or the live search / since input
//! status bar      last message, focus and mode
//! ```

mod bars;
mod overlays;
mod panes;
mod views;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use super::modes::Mode;
use super::state::{Focus, Session, ViewMode};

/// Width of the filter sidebar.
const SIDEBAR_WIDTH: u16 = 28;

/// Share of the panel row taken by the thread pane.
const THREAD_PERCENT: u16 = 40;

/// Draw the whole screen for `session`.
pub fn draw(f: &mut Frame, session: &Session) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    bars::top_bar(f, session, rows[0]);
    bars::summary_line(f, session, rows[1]);
    draw_panels(f, session, rows[2]);
    bars::quick_actions(f, session, rows[3]);
    bars::status_bar(f, session, rows[4]);

    overlays::draw(f, session);
}

fn draw_panels(f: &mut Frame, session: &Session, area: Rect) {
    let mut constraints = Vec::with_capacity(3);
    if session.show_sidebar {
        constraints.push(Constraint::Length(SIDEBAR_WIDTH));
    }
    constraints.push(Constraint::Min(20));
    if session.show_thread {
        constraints.push(Constraint::Percentage(THREAD_PERCENT));
    }
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    let mut next = 0;
    if session.show_sidebar {
        panes::sidebar(f, session, chunks[next]);
        next += 1;
    }
    let main = chunks[next];
    let focused = session.focus == Focus::Timeline || matches!(session.mode, Mode::Focus(_));
    match session.view {
        ViewMode::Timeline => views::timeline(f, session, main, focused),
        ViewMode::Cards => views::cards(f, session, main, focused),
        ViewMode::Table => views::table(f, session, main, focused),
        ViewMode::Kanban => views::kanban(f, session, main, focused),
    }
    if session.show_thread {
        panes::thread(f, session, chunks[next + 1]);
    }
}
