//! Interaction modes.
//!
//! [`Mode`] is a tagged union: each variant carries only the state its
//! screen needs, and each has one handler taking that state by value and
//! returning a [`Transition`](super::effect::Transition). The dispatcher in
//! [`super::dispatch`] does nothing but route keys to the handler of the
//! active variant.

mod calendar;
mod command;
mod forms;
mod input;
mod library;
pub mod normal;
mod reports;
mod richtext;
mod search;

pub use calendar::{CalendarState, CalendarView};
pub use command::PaletteState;
pub use forms::{suggestion_limit, CreateForm, EditorButton, EditorForm, TemplateForm};
pub use input::{ExportState, FocusState, HelpState, PickerKind, PickerState, SinceState};
pub use library::TemplatesState;
pub use reports::{OverviewState, ProjectSummaryState, TagAnalyticsState, TimeReportsState};
pub use richtext::{preview_lines, PreviewLine, RichTextState, TextFormat, TOOLBAR};
pub use search::{AdvancedSearchState, FIELDS as SEARCH_FIELDS};

pub(crate) use calendar::handle as calendar;
pub(crate) use command::handle as command_palette;
pub(crate) use forms::{create, editor, template_edit};
pub(crate) use input::{export, focus, help, picker, search as live_search, since};
pub(crate) use library::handle as templates;
pub(crate) use reports::{dashboard, project_summary, stats, tag_analytics, time_reports};
pub(crate) use richtext::handle as rich_text;
pub(crate) use search::handle as advanced_search;

use super::components::Suggestions;

/// The active screen and its private state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Mode {
    /// Timeline navigation.
    #[default]
    Normal,
    /// Live filter as you type.
    Search,
    /// Custom scope start.
    Since(SinceState),
    /// Single-select over projects, categories or tags.
    Picker(PickerState),
    /// New entry form.
    Create(CreateForm),
    /// Edit an entry.
    Edit(EditorForm),
    /// Reply to an entry.
    Reply(EditorForm),
    /// Key reference.
    Help(HelpState),
    /// Distraction-free timeline.
    Focus(FocusState),
    /// Entry statistics.
    Stats(OverviewState),
    /// Activity dashboard.
    Dashboard(OverviewState),
    /// Month, week and day calendar.
    Calendar(CalendarState),
    /// Template picker.
    Templates(TemplatesState),
    /// Bulk export dialog.
    Export(ExportState),
    /// Multi-field search.
    AdvancedSearch(AdvancedSearchState),
    /// Logged time reports.
    TimeReports(TimeReportsState),
    /// Per-project activity.
    ProjectSummary(ProjectSummaryState),
    /// Per-tag usage.
    TagAnalytics(TagAnalyticsState),
    /// Command palette.
    CommandPalette(PaletteState),
    /// Markdown editor.
    RichTextEditor(RichTextState),
    /// New user template form.
    TemplateEdit(TemplateForm),
}

impl Mode {
    /// Upper-case label for the status bar.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Search => "SEARCH",
            Self::Since(_) => "SINCE",
            Self::Picker(_) => "PICKER",
            Self::Create(_) => "CREATE",
            Self::Edit(_) => "EDIT",
            Self::Reply(_) => "REPLY",
            Self::Help(_) => "HELP",
            Self::Focus(_) => "FOCUS",
            Self::Stats(_) => "STATS",
            Self::Dashboard(_) => "DASHBOARD",
            Self::Calendar(_) => "CALENDAR",
            Self::Templates(_) => "TEMPLATES",
            Self::Export(_) => "EXPORT",
            Self::AdvancedSearch(_) => "ADVANCED SEARCH",
            Self::TimeReports(_) => "TIME REPORTS",
            Self::ProjectSummary(_) => "PROJECTS",
            Self::TagAnalytics(_) => "TAGS",
            Self::CommandPalette(_) => "COMMANDS",
            Self::RichTextEditor(_) => "RICH TEXT",
            Self::TemplateEdit(_) => "TEMPLATE",
        }
    }

    /// Completion list of the active form, if it has one.
    pub fn suggestions_mut(&mut self) -> Option<&mut Suggestions> {
        match self {
            Self::Create(form) => Some(&mut form.suggestions),
            Self::Edit(form) | Self::Reply(form) => Some(&mut form.suggestions),
            _ => None,
        }
    }

    /// Whether the timeline panes stay interactive underneath.
    pub fn is_normal_family(&self) -> bool {
        matches!(self, Self::Normal | Self::Search | Self::Focus(_))
    }
}

/// Move a list cursor by one within `len` items.
pub(crate) fn step(cursor: usize, down: bool, len: usize) -> usize {
    if down {
        (cursor + 1).min(len.saturating_sub(1))
    } else {
        cursor.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_clamps() {
        assert_eq!(step(0, false, 3), 0);
        assert_eq!(step(2, true, 3), 2);
        assert_eq!(step(1, true, 3), 2);
        assert_eq!(step(0, true, 0), 0);
    }

    #[test]
    fn test_default_mode_is_normal() {
        assert_eq!(Mode::default(), Mode::Normal);
        assert!(Mode::Search.is_normal_family());
        assert_eq!(Mode::Help(HelpState::default()).label(), "HELP");
    }
}
