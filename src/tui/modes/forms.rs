//! Entry and template forms.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::{Entry, EntryUpdate, NewEntry, DEFAULT_CATEGORY};
use crate::store::{SuggestSource, TemplateRecord};

use super::super::components::{Suggestions, TextInput};
use super::super::effect::{Effect, Transition};
use super::super::state::Session;
use super::Mode;

/// New entry form: text, project, category, tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateForm {
    /// Entry text.
    pub text: TextInput,
    /// Project.
    pub project: TextInput,
    /// Category.
    pub category: TextInput,
    /// Comma separated tags.
    pub tags: TextInput,
    /// Focused field, 0 to 3.
    pub field: usize,
    /// Completions for the focused project, category or tags input.
    pub suggestions: Suggestions,
}

impl CreateForm {
    /// Empty form with a preset category.
    pub fn new(category: &str) -> Self {
        Self {
            category: TextInput::new(category),
            ..Self::default()
        }
    }

    /// Form prefilled with a template body.
    pub fn from_template(category: &str, content: &str) -> Self {
        Self {
            text: TextInput::new(content),
            ..Self::new(category)
        }
    }

    fn focused(&mut self) -> &mut TextInput {
        match self.field {
            0 => &mut self.text,
            1 => &mut self.project,
            2 => &mut self.category,
            _ => &mut self.tags,
        }
    }

    fn completing(&mut self) -> Option<(&mut TextInput, &mut Suggestions, SuggestSource)> {
        let (input, source) = match self.field {
            1 => (&mut self.project, SuggestSource::Projects),
            2 => (&mut self.category, SuggestSource::Categories),
            3 => (&mut self.tags, SuggestSource::Tags),
            _ => return None,
        };
        Some((input, &mut self.suggestions, source))
    }

    fn to_entry(&self) -> NewEntry {
        let category = self.category.value().trim().to_lowercase();
        let category = if category.is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            category
        };
        NewEntry::new(category, self.text.value().trim())
            .project(self.project.value().trim())
            .tags_csv(self.tags.value())
    }
}

/// Create form keys. Enter or `ctrl+s` saves. While completions show,
/// Tab and Shift-Tab cycle them, Enter or Space accepts, Esc hides them.
pub fn create(mut form: CreateForm, session: &mut Session, key: &KeyEvent) -> Transition {
    let consumed = form
        .completing()
        .is_some_and(|(input, suggestions, source)| complete_key(input, suggestions, source, key));
    if consumed {
        return Transition::to(Mode::Create(form));
    }
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => Transition::normal(),
        (_, KeyCode::Tab) => {
            form.field = (form.field + 1) % 4;
            form.suggestions.dismiss();
            Transition::to(Mode::Create(form))
        }
        (_, KeyCode::BackTab) => {
            form.field = (form.field + 3) % 4;
            form.suggestions.dismiss();
            Transition::to(Mode::Create(form))
        }
        (KeyModifiers::NONE, KeyCode::Enter) | (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
            if form.text.is_blank() {
                session.set_status("Text cannot be empty");
                return Transition::to(Mode::Create(form));
            }
            Transition::normal().with(Effect::Create(form.to_entry())).reload()
        }
        _ => {
            let before = form.focused().value().to_string();
            form.focused().handle_key(key);
            let effect = form
                .completing()
                .and_then(|(input, suggestions, source)| refresh(input, suggestions, source, &before));
            let mut t = Transition::to(Mode::Create(form));
            t.effects.extend(effect);
            t
        }
    }
}

/// Candidates requested per keystroke.
pub const fn suggestion_limit(source: SuggestSource) -> usize {
    match source {
        SuggestSource::Tags => 8,
        SuggestSource::Projects | SuggestSource::Categories => 5,
    }
}

/// The part of `value` being completed: the whole value, or for tags the
/// text after the last comma.
fn completion_query(source: SuggestSource, value: &str) -> &str {
    match source {
        SuggestSource::Tags => value.rsplit(',').next().unwrap_or(value).trim(),
        SuggestSource::Projects | SuggestSource::Categories => value.trim(),
    }
}

/// Put an accepted candidate into `input`. Tags replace only the tag
/// being typed.
fn accept_into(input: &mut TextInput, source: SuggestSource, item: &str) {
    match source {
        SuggestSource::Tags => {
            let value = input.value();
            let kept = value.rfind(',').map_or("", |at| &value[..=at]);
            let joined = if kept.is_empty() {
                item.to_string()
            } else {
                format!("{kept} {item}")
            };
            input.set(joined);
        }
        SuggestSource::Projects | SuggestSource::Categories => input.set(item),
    }
}

/// Completion keys while a list is showing. Returns whether `key` was used.
fn complete_key(
    input: &mut TextInput,
    suggestions: &mut Suggestions,
    source: SuggestSource,
    key: &KeyEvent,
) -> bool {
    if !suggestions.is_showing() {
        return false;
    }
    match key.code {
        KeyCode::Tab => suggestions.next(),
        KeyCode::BackTab => suggestions.prev(),
        KeyCode::Enter | KeyCode::Char(' ') if key.modifiers == KeyModifiers::NONE => {
            if let Some(item) = suggestions.accept() {
                accept_into(input, source, &item);
            }
        }
        KeyCode::Esc => suggestions.dismiss(),
        _ => return false,
    }
    true
}

/// After an edit, ask for completions of the new text.
fn refresh(
    input: &TextInput,
    suggestions: &mut Suggestions,
    source: SuggestSource,
    before: &str,
) -> Option<Effect> {
    if input.value() == before {
        return None;
    }
    let query = completion_query(source, input.value());
    if query.is_empty() {
        suggestions.dismiss();
        return None;
    }
    suggestions.request(query);
    Some(Effect::Suggest {
        source,
        query: query.to_string(),
    })
}

/// Buttons at the bottom of the reply and edit editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditorButton {
    /// Save.
    #[default]
    Ok,
    /// Discard.
    Cancel,
}

/// Reply and edit editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorForm {
    /// Entry replied to, or entry being edited.
    pub target_id: i64,
    /// Multi-line text.
    pub text: TextInput,
    /// Project.
    pub project: TextInput,
    /// Comma separated tags.
    pub tags: TextInput,
    /// Focused field: text, project, tags, buttons.
    pub field: usize,
    /// Highlighted button.
    pub button: EditorButton,
    /// Completions for the focused project or tags input.
    pub suggestions: Suggestions,
    original: (String, String, String),
}

impl EditorForm {
    /// Reply form: empty text, parent's project and tags as defaults.
    pub fn reply(parent: &Entry) -> Self {
        Self {
            target_id: parent.id,
            text: TextInput::multiline(""),
            project: TextInput::new(parent.project_str()),
            tags: TextInput::new(parent.tags.join(", ")),
            ..Self::default()
        }
    }

    /// Edit form loaded with the target's current values.
    pub fn edit(target: &Entry) -> Self {
        let tags = target.tags.join(", ");
        Self {
            target_id: target.id,
            text: TextInput::multiline(target.text.clone()),
            project: TextInput::new(target.project_str()),
            tags: TextInput::new(tags.clone()),
            original: (target.text.clone(), target.project_str().to_string(), tags),
            ..Self::default()
        }
    }

    fn focused(&mut self) -> Option<&mut TextInput> {
        match self.field {
            0 => Some(&mut self.text),
            1 => Some(&mut self.project),
            2 => Some(&mut self.tags),
            _ => None,
        }
    }

    fn completing(&mut self) -> Option<(&mut TextInput, &mut Suggestions, SuggestSource)> {
        let (input, source) = match self.field {
            1 => (&mut self.project, SuggestSource::Projects),
            2 => (&mut self.tags, SuggestSource::Tags),
            _ => return None,
        };
        Some((input, &mut self.suggestions, source))
    }

    /// Fields that differ from the loaded values. Blank fields are left
    /// unchanged.
    pub fn changes(&self) -> EntryUpdate {
        let changed = |input: &TextInput, original: &str| {
            let value = input.value().trim();
            if value == original.trim() {
                String::new()
            } else {
                value.to_string()
            }
        };
        EntryUpdate::from_overrides(
            &changed(&self.text, &self.original.0),
            &changed(&self.project, &self.original.1),
            &changed(&self.tags, &self.original.2),
            "",
        )
    }
}

/// Reply and edit editor keys.
pub fn editor(mut form: EditorForm, reply: bool, session: &mut Session, key: &KeyEvent) -> Transition {
    let stay = |form: EditorForm| {
        if reply {
            Transition::to(Mode::Reply(form))
        } else {
            Transition::to(Mode::Edit(form))
        }
    };
    let consumed = form
        .completing()
        .is_some_and(|(input, suggestions, source)| complete_key(input, suggestions, source, key));
    if consumed {
        return stay(form);
    }
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => Transition::normal(),
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => save(&form, reply, session),
        (_, KeyCode::Tab) => {
            form.field = (form.field + 1) % 4;
            form.button = EditorButton::Ok;
            form.suggestions.dismiss();
            stay(form)
        }
        (_, KeyCode::BackTab) => {
            form.field = (form.field + 3) % 4;
            form.suggestions.dismiss();
            stay(form)
        }
        (_, KeyCode::Enter) if form.field == 3 => match form.button {
            EditorButton::Ok => save(&form, reply, session),
            EditorButton::Cancel => Transition::normal(),
        },
        (_, KeyCode::Enter) if form.field > 0 => {
            form.field += 1;
            form.suggestions.dismiss();
            stay(form)
        }
        (_, KeyCode::Left | KeyCode::Right) if form.field == 3 => {
            form.button = match form.button {
                EditorButton::Ok => EditorButton::Cancel,
                EditorButton::Cancel => EditorButton::Ok,
            };
            stay(form)
        }
        _ => {
            let before = form.focused().map(|input| input.value().to_string());
            if let Some(input) = form.focused() {
                input.handle_key(key);
            }
            let effect = before.and_then(|before| {
                form.completing()
                    .and_then(|(input, suggestions, source)| refresh(input, suggestions, source, &before))
            });
            let mut t = stay(form);
            t.effects.extend(effect);
            t
        }
    }
}

fn save(form: &EditorForm, reply: bool, session: &mut Session) -> Transition {
    let text = form.text.value().trim();
    if text.is_empty() {
        session.set_status("nothing to save");
        return Transition::normal();
    }
    if reply {
        return Transition::normal()
            .with(Effect::Reply {
                parent_id: form.target_id,
                text: text.to_string(),
                project: form.project.value().trim().to_string(),
                tags: form.tags.value().trim().to_string(),
            })
            .reload();
    }
    let update = form.changes();
    if update.is_empty() {
        session.set_status("no changes");
        return Transition::normal();
    }
    Transition::normal()
        .with(Effect::Update {
            id: form.target_id,
            update,
        })
        .reload()
}

/// New user template form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateForm {
    /// Template name.
    pub name: TextInput,
    /// Library category.
    pub category: TextInput,
    /// One-line description.
    pub description: TextInput,
    /// Body with placeholders.
    pub content: TextInput,
    /// Focused field, 0 to 3.
    pub field: usize,
}

impl Default for TemplateForm {
    fn default() -> Self {
        Self {
            name: TextInput::default(),
            category: TextInput::default(),
            description: TextInput::default(),
            content: TextInput::multiline(""),
            field: 0,
        }
    }
}

impl TemplateForm {
    fn focused(&mut self) -> &mut TextInput {
        match self.field {
            0 => &mut self.name,
            1 => &mut self.category,
            2 => &mut self.description,
            _ => &mut self.content,
        }
    }
}

/// Template form keys. `ctrl+s` validates and saves.
pub fn template_edit(mut form: TemplateForm, session: &mut Session, key: &KeyEvent) -> Transition {
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => Transition::normal(),
        (_, KeyCode::Tab) => {
            form.field = (form.field + 1) % 4;
            Transition::to(Mode::TemplateEdit(form))
        }
        (_, KeyCode::BackTab) => {
            form.field = (form.field + 3) % 4;
            Transition::to(Mode::TemplateEdit(form))
        }
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
            match TemplateRecord::new(
                form.name.value(),
                form.category.value(),
                form.content.value(),
                form.description.value(),
            ) {
                Ok(record) => Transition::normal()
                    .with(Effect::SaveTemplate(record))
                    .with(Effect::LoadTemplates),
                Err(e) => {
                    session.set_status(format!("Error creating template: {e}"));
                    Transition::to(Mode::TemplateEdit(form))
                }
            }
        }
        (_, KeyCode::Enter) if form.field < 3 => {
            form.field += 1;
            Transition::to(Mode::TemplateEdit(form))
        }
        _ => {
            form.focused().handle_key(key);
            Transition::to(Mode::TemplateEdit(form))
        }
    }
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

    fn entry() -> Entry {
        Entry {
            id: 7,
            timestamp: Utc.with_ymd_and_hms(2025, 6, 11, 9, 0, 0).unwrap(),
            category: "task".into(),
            text: "write docs".into(),
            project: Some("pulse".into()),
            tags: vec!["doc".into(), "design".into()],
            duration_minutes: None,
            thread_id: None,
            parent_id: None,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl_s() -> KeyEvent {
        KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)
    }

    fn type_into(form: &mut TextInput, text: &str) {
        for c in text.chars() {
            form.handle_key(&key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_create_rejects_empty_text() {
        let mut s = session();
        let t = create(CreateForm::new("note"), &mut s, &key(KeyCode::Enter));
        assert!(matches!(t.mode, Mode::Create(_)));
        assert_eq!(s.status.as_deref(), Some("Text cannot be empty"));
    }

    #[test]
    fn test_create_emits_entry() {
        let mut s = session();
        let mut form = CreateForm::new("Task");
        type_into(&mut form.text, "ship it");
        type_into(&mut form.tags, "a, b");
        let t = create(form, &mut s, &key(KeyCode::Enter));
        let expected = NewEntry::new("task", "ship it").tags_csv("a, b");
        assert_eq!(t.effects[0], Effect::Create(expected));
        assert_eq!(t.mode, Mode::Normal);
    }

    #[test]
    fn test_edit_only_text_keeps_other_fields() {
        let mut form = EditorForm::edit(&entry());
        form.text.set("rewritten");
        let update = form.changes();
        assert_eq!(update.text.as_deref(), Some("rewritten"));
        assert_eq!(update.project, None);
        assert_eq!(update.tags, None);
        assert_eq!(update.category, None);
    }

    #[test]
    fn test_edit_without_changes_reports() {
        let mut s = session();
        let t = editor(EditorForm::edit(&entry()), false, &mut s, &ctrl_s());
        assert!(t.effects.is_empty());
        assert_eq!(s.status.as_deref(), Some("no changes"));
    }

    #[test]
    fn test_reply_empty_overrides_are_blank() {
        let mut s = session();
        let mut form = EditorForm::reply(&entry());
        assert_eq!(form.tags.value(), "doc, design");
        form.project.clear();
        type_into(&mut form.text, "done");
        let t = editor(form, true, &mut s, &ctrl_s());
        assert_eq!(
            t.effects[0],
            Effect::Reply {
                parent_id: 7,
                text: "done".into(),
                project: String::new(),
                tags: "doc, design".into(),
            }
        );
    }

    #[test]
    fn test_editor_buttons() {
        let mut s = session();
        let mut form = EditorForm::reply(&entry());
        form.field = 3;
        let t = editor(form, true, &mut s, &key(KeyCode::Right));
        let Mode::Reply(form) = t.mode else {
            panic!("expected reply mode");
        };
        assert_eq!(form.button, EditorButton::Cancel);
        let t = editor(form, true, &mut s, &key(KeyCode::Enter));
        assert_eq!(t.mode, Mode::Normal);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_empty_reply_is_nothing_to_save() {
        let mut s = session();
        let t = editor(EditorForm::reply(&entry()), true, &mut s, &ctrl_s());
        assert_eq!(t.mode, Mode::Normal);
        assert_eq!(s.status.as_deref(), Some("nothing to save"));
    }

    fn showing(form: &mut EditorForm, items: &[&str]) {
        let query = completion_query(SuggestSource::Tags, form.tags.value()).to_string();
        form.suggestions.request(query.clone());
        form.suggestions
            .fill(&query, items.iter().map(|s| s.to_string()).collect());
    }

    #[test]
    fn test_typing_requests_completions() {
        let mut s = session();
        let mut form = CreateForm::new("note");
        form.field = 3;
        form.tags.set("bug, au");
        let t = create(form, &mut s, &key(KeyCode::Char('t')));
        assert_eq!(
            t.effects,
            vec![Effect::Suggest {
                source: SuggestSource::Tags,
                query: "aut".into(),
            }]
        );

        let mut form = CreateForm::new("note");
        let t = create(form.clone(), &mut s, &key(KeyCode::Char('x')));
        assert!(t.effects.is_empty(), "the text field has no completions");

        form.field = 1;
        let t = create(form, &mut s, &key(KeyCode::Char('a')));
        assert!(matches!(
            t.effects[..],
            [Effect::Suggest { source: SuggestSource::Projects, .. }]
        ));
    }

    #[test]
    fn test_completion_cycles_and_accepts_last_tag() {
        let mut s = session();
        let mut form = EditorForm::edit(&entry());
        form.field = 2;
        form.tags.set("doc, de");
        showing(&mut form, &["design", "devops", "deploy"]);

        let t = editor(form, false, &mut s, &key(KeyCode::BackTab));
        let Mode::Edit(form) = t.mode else {
            panic!("expected edit mode");
        };
        assert_eq!(form.suggestions.selected(), 2);
        assert_eq!(form.field, 2, "tab cycles instead of moving focus");

        let t = editor(form, false, &mut s, &key(KeyCode::Tab));
        let Mode::Edit(form) = t.mode else {
            panic!("expected edit mode");
        };
        let t = editor(form, false, &mut s, &key(KeyCode::Enter));
        let Mode::Edit(form) = t.mode else {
            panic!("expected edit mode");
        };
        assert_eq!(form.tags.value(), "doc, design");
        assert!(!form.suggestions.is_showing());
        assert_eq!(form.field, 2);
    }

    #[test]
    fn test_space_accepts_project() {
        let mut s = session();
        let mut form = CreateForm::new("note");
        form.field = 1;
        form.project.set("pu");
        form.suggestions.request("pu");
        form.suggestions.fill("pu", vec!["pulse".into()]);
        let t = create(form, &mut s, &key(KeyCode::Char(' ')));
        let Mode::Create(form) = t.mode else {
            panic!("expected create mode");
        };
        assert_eq!(form.project.value(), "pulse");
    }

    #[test]
    fn test_esc_hides_completions_before_closing() {
        let mut s = session();
        let mut form = EditorForm::reply(&entry());
        form.field = 2;
        showing(&mut form, &["design"]);
        let t = editor(form, true, &mut s, &key(KeyCode::Esc));
        let Mode::Reply(form) = t.mode else {
            panic!("expected reply mode");
        };
        assert!(!form.suggestions.is_showing());
        assert_eq!(form.tags.value(), "doc, design");

        let t = editor(form, true, &mut s, &key(KeyCode::Esc));
        assert_eq!(t.mode, Mode::Normal);
    }

    #[test]
    fn test_template_form_validation() {
        let mut s = session();
        let t = template_edit(TemplateForm::default(), &mut s, &ctrl_s());
        assert!(matches!(t.mode, Mode::TemplateEdit(_)));
        assert!(s.status.as_deref().unwrap().contains("name cannot be empty"));

        let mut form = TemplateForm::default();
        form.name.set("Retro");
        form.category.set("Work");
        form.content.set("## Went well");
        let t = template_edit(form, &mut s, &ctrl_s());
        assert!(matches!(t.effects[0], Effect::SaveTemplate(ref r) if r.id == "retro"));
    }
}
