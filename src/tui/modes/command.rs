//! Command palette.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::super::components::TextInput;
use super::super::effect::Transition;
use super::super::palette::{self, Category, Command};
use super::super::state::Session;
use super::{normal, step, Mode};

/// Palette query, category filter and cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaletteState {
    /// Typed filter.
    pub query: TextInput,
    /// Category restriction; `None` shows everything.
    pub category: Option<Category>,
    /// Highlighted command.
    pub cursor: usize,
}

impl PaletteState {
    /// Commands matching the query and category.
    pub fn visible(&self) -> Vec<&'static Command> {
        palette::filter(self.query.value(), self.category)
    }

    fn shift_category(&mut self, forward: bool) {
        // `None` sits before the first category in the cycle.
        let all = Category::ALL;
        let position = self
            .category
            .and_then(|c| all.iter().position(|x| *x == c))
            .map_or(0, |i| i + 1);
        let len = all.len() + 1;
        let next = if forward {
            (position + 1) % len
        } else {
            (position + len - 1) % len
        };
        self.category = next.checked_sub(1).map(|i| all[i]);
        self.cursor = 0;
    }
}

/// Palette keys. Enter runs the highlighted command as if its key binding
/// had been pressed in normal mode.
pub fn handle(mut state: PaletteState, session: &mut Session, key: &KeyEvent) -> Transition {
    let len = state.visible().len();
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => return Transition::normal(),
        (_, KeyCode::Enter) => {
            if let Some(command) = state.visible().get(state.cursor) {
                return normal::perform(session, command.action);
            }
        }
        (_, KeyCode::Up | KeyCode::BackTab) => state.cursor = step(state.cursor, false, len),
        (_, KeyCode::Down | KeyCode::Tab) => state.cursor = step(state.cursor, true, len),
        (KeyModifiers::CONTROL, KeyCode::Char('n')) => state.shift_category(true),
        (KeyModifiers::CONTROL, KeyCode::Char('p')) => state.shift_category(false),
        (KeyModifiers::CONTROL, KeyCode::Char('r')) => state = PaletteState::default(),
        _ => {
            if state.query.handle_key(key) {
                state.cursor = 0;
            }
        }
    }
    Transition::to(Mode::CommandPalette(state))
}
