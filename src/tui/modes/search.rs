//! Multi-field search.

use crossterm::event::{KeyCode, KeyEvent};

use crate::model::Entry;

use super::super::components::TextInput;
use super::super::effect::{Effect, SearchQuery, Transition};
use super::super::state::Session;
use super::{step, Mode};

/// Field labels in tab order.
pub const FIELDS: [&str; 4] = ["Query", "Project", "Category", "Tags"];

/// Advanced search form and its last results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvancedSearchState {
    /// Full-text query.
    pub query: TextInput,
    /// Exact project.
    pub project: TextInput,
    /// Category.
    pub category: TextInput,
    /// Comma separated tags.
    pub tags: TextInput,
    /// Focused field, 0 to 3.
    pub field: usize,
    /// Matches of the last search, best first.
    pub results: Vec<Entry>,
    /// Highlighted result.
    pub cursor: usize,
}

impl AdvancedSearchState {
    /// Criteria as typed.
    pub fn to_query(&self) -> SearchQuery {
        SearchQuery {
            text: self.query.value().trim().to_string(),
            project: self.project.value().trim().to_string(),
            category: self.category.value().trim().to_string(),
            tags: self.tags.value().trim().to_string(),
        }
    }

    /// The inputs in tab order.
    pub fn inputs(&self) -> [&TextInput; 4] {
        [&self.query, &self.project, &self.category, &self.tags]
    }

    fn focused_mut(&mut self) -> &mut TextInput {
        match self.field {
            0 => &mut self.query,
            1 => &mut self.project,
            2 => &mut self.category,
            _ => &mut self.tags,
        }
    }
}

/// Advanced search keys.
pub fn handle(mut state: AdvancedSearchState, session: &mut Session, key: &KeyEvent) -> Transition {
    match key.code {
        KeyCode::Esc => return Transition::normal(),
        KeyCode::Tab => state.field = (state.field + 1) % FIELDS.len(),
        KeyCode::BackTab => state.field = (state.field + FIELDS.len() - 1) % FIELDS.len(),
        KeyCode::Up => state.cursor = step(state.cursor, false, state.results.len()),
        KeyCode::Down => state.cursor = step(state.cursor, true, state.results.len()),
        KeyCode::Enter => {
            let query = state.to_query();
            if query.is_empty() {
                session.set_status("Please enter at least one search criterion");
            } else {
                state.cursor = 0;
                return Transition::to(Mode::AdvancedSearch(state)).with(Effect::Search(query));
            }
        }
        _ => {
            state.focused_mut().handle_key(key);
        }
    }
    Transition::to(Mode::AdvancedSearch(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Zone};
    use chrono::{TimeZone, Utc};
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    fn session() -> Session {
        let now = Zone::utc().localize(Utc.with_ymd_and_hms(2025, 6, 11, 14, 0, 0).unwrap());
        Session::new(Config::default(), now)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_empty_criteria_rejected() {
        let mut s = session();
        let t = handle(AdvancedSearchState::default(), &mut s, &key(KeyCode::Enter));
        assert!(t.effects.is_empty());
        assert_eq!(
            s.status.as_deref(),
            Some("Please enter at least one search criterion")
        );
    }

    #[test]
    fn test_typing_goes_to_focused_field() {
        let mut s = session();
        let mut state = AdvancedSearchState::default();
        for code in [KeyCode::Tab, KeyCode::Char('a'), KeyCode::Char('p')] {
            let Mode::AdvancedSearch(next) = handle(state, &mut s, &key(code)).mode else {
                panic!("expected advanced search");
            };
            state = next;
        }
        assert_eq!(state.project.value(), "ap");
        assert!(state.query.is_blank());
        let t = handle(state, &mut s, &key(KeyCode::Enter));
        assert_eq!(
            t.effects,
            vec![Effect::Search(SearchQuery {
                project: "ap".into(),
                ..SearchQuery::default()
            })]
        );
    }

    #[test]
    fn test_backtab_wraps() {
        let mut s = session();
        let t = handle(AdvancedSearchState::default(), &mut s, &key(KeyCode::BackTab));
        let Mode::AdvancedSearch(state) = t.mode else {
            panic!("expected advanced search");
        };
        assert_eq!(state.field, 3);
    }
}
