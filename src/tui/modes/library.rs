//! Template picker.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::templates::{category_icon, fill_variables, Template};

use super::super::effect::{Effect, Transition};
use super::super::state::Session;
use super::{step, CreateForm, Mode};

/// Template picker state. Templates themselves live in the session library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplatesState {
    /// Index into the library's category list.
    pub category: usize,
    /// Highlighted template within the category.
    pub cursor: usize,
    /// Name and description filter.
    pub query: String,
    /// Whether keys edit the filter.
    pub searching: bool,
    /// Whether up and down move between categories.
    pub category_mode: bool,
}

impl TemplatesState {
    /// Name of the selected category.
    pub fn category_name(&self, session: &Session) -> String {
        session
            .templates
            .categories()
            .get(self.category)
            .cloned()
            .unwrap_or_default()
    }

    /// Templates shown for the current category and filter.
    pub fn visible<'a>(&self, session: &'a Session) -> Vec<&'a Template> {
        session
            .templates
            .matching(&self.category_name(session), &self.query)
    }

    fn select_category(&mut self, index: usize, session: &mut Session) {
        self.category = index;
        self.cursor = 0;
        let name = self.category_name(session);
        session.notify(format!("Selected: {} {name}", category_icon(&name)));
    }
}

/// Template picker keys.
pub fn handle(mut state: TemplatesState, session: &mut Session, key: &KeyEvent) -> Transition {
    let categories = session.templates.categories().len();
    if state.searching {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => state.searching = false,
            KeyCode::Backspace => {
                state.query.pop();
                state.cursor = 0;
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                state.query.push(c);
                state.cursor = 0;
            }
            _ => {}
        }
        return Transition::to(Mode::Templates(state));
    }

    match key.code {
        KeyCode::Esc => return Transition::normal(),
        KeyCode::Tab => {
            state.category_mode = !state.category_mode;
            session.notify(if state.category_mode {
                "Category selection"
            } else {
                "Template selection"
            });
        }
        KeyCode::Char('/') => {
            state.searching = true;
            session.notify("Search templates");
        }
        KeyCode::Char(c @ '0'..='9') => {
            let index = if c == '0' { 9 } else { c as usize - '1' as usize };
            if index < categories {
                state.select_category(index, session);
            }
        }
        KeyCode::Left | KeyCode::Char('h') if categories > 0 => {
            let index = (state.category + categories - 1) % categories;
            state.select_category(index, session);
        }
        KeyCode::Right | KeyCode::Char('l') if categories > 0 => {
            let index = (state.category + 1) % categories;
            state.select_category(index, session);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            if state.category_mode {
                if state.category > 0 {
                    state.select_category(state.category - 1, session);
                }
            } else if state.cursor > 0 {
                state.cursor -= 1;
            } else if state.category > 0 {
                // Crossing upward lands on the last template of the previous category.
                state.category -= 1;
                state.cursor = state.visible(session).len().saturating_sub(1);
            }
        }
        KeyCode::Down | KeyCode::Char('j') => {
            let len = state.visible(session).len();
            if state.category_mode {
                if state.category + 1 < categories {
                    state.select_category(state.category + 1, session);
                }
            } else if state.cursor + 1 < len {
                state.cursor = step(state.cursor, true, len);
            } else if state.category + 1 < categories {
                state.category += 1;
                state.cursor = 0;
            }
        }
        KeyCode::Enter => {
            let picked = state
                .visible(session)
                .get(state.cursor)
                .map(|t| (t.id.clone(), t.name.clone(), t.category.clone(), t.content.clone()));
            if let Some((id, name, category, content)) = picked {
                let body = fill_variables(&content, session.now);
                session.notify(format!("Created entry from template: {name}"));
                return Transition::to(Mode::Create(CreateForm::from_template(
                    &category.to_lowercase(),
                    &body,
                )))
                .with(Effect::RecordTemplateUsage(id));
            }
        }
        _ => {}
    }
    Transition::to(Mode::Templates(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Zone};
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
    fn test_enter_opens_prefilled_create_form() {
        let mut s = session();
        let state = TemplatesState::default();
        let template = state.visible(&s)[0].clone();
        let t = handle(state, &mut s, &key(KeyCode::Enter));
        let Mode::Create(form) = t.mode else {
            panic!("expected create form");
        };
        assert_eq!(form.category.value(), template.category.to_lowercase());
        assert!(!form.text.value().contains("{{date}}"));
        assert_eq!(t.effects, vec![Effect::RecordTemplateUsage(template.id)]);
    }

    #[test]
    fn test_digit_selects_category() {
        let mut s = session();
        let t = handle(TemplatesState::default(), &mut s, &key(KeyCode::Char('2')));
        let Mode::Templates(state) = t.mode else {
            panic!("expected templates");
        };
        assert_eq!(state.category, 1);
        assert!(s.notifications.back().unwrap().starts_with("Selected: "));
    }

    #[test]
    fn test_search_filters_and_resets_cursor() {
        let mut s = session();
        let state = TemplatesState {
            cursor: 1,
            searching: true,
            ..TemplatesState::default()
        };
        let t = handle(state, &mut s, &key(KeyCode::Char('z')));
        let Mode::Templates(state) = t.mode else {
            panic!("expected templates");
        };
        assert_eq!(state.query, "z");
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn test_left_wraps_to_last_category() {
        let mut s = session();
        let last = s.templates.categories().len() - 1;
        let t = handle(TemplatesState::default(), &mut s, &key(KeyCode::Left));
        let Mode::Templates(state) = t.mode else {
            panic!("expected templates");
        };
        assert_eq!(state.category, last);
    }
}
