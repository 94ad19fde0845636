//! Side effects requested by mode handlers.
//!
//! Handlers never touch the store, the filesystem or the clock. They return
//! a [`Transition`]: the next mode plus a list of [`Effect`]s that the
//! executor performs afterwards, in order.

use chrono::NaiveDate;

use crate::export::ExportFormat;
use crate::model::{EntryUpdate, NewEntry};
use crate::store::{SuggestSource, TemplateRecord};
use crate::timeline::Scope;

use super::modes::Mode;

/// Criteria of an advanced search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Full-text query.
    pub text: String,
    /// Exact project.
    pub project: String,
    /// Category, case-insensitive.
    pub category: String,
    /// Comma separated tags, all required.
    pub tags: String,
}

impl SearchQuery {
    /// Whether no criterion was given.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
            && self.project.trim().is_empty()
            && self.category.trim().is_empty()
            && self.tags.trim().is_empty()
    }
}

/// One instruction for the executor.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Re-run the timeline query for the current scope and filter.
    ReloadTimeline,
    /// Re-read facet counts.
    ReloadFacets,
    /// Insert an entry from the create form.
    Create(NewEntry),
    /// Insert an entry from the rich text editor.
    SaveRichText(NewEntry),
    /// Insert the timer entry of a finished countdown phase.
    LogPomodoro(NewEntry),
    /// Reply to an entry.
    Reply {
        /// Entry replied to.
        parent_id: i64,
        /// Reply text.
        text: String,
        /// Project override, blank to inherit.
        project: String,
        /// Tag override, blank to inherit.
        tags: String,
    },
    /// Apply a partial update.
    Update {
        /// Entry to change.
        id: i64,
        /// Fields to change.
        update: EntryUpdate,
    },
    /// Delete an entry.
    Delete(i64),
    /// Duplicate an entry.
    Duplicate(i64),
    /// Write the thread rooted at this id as markdown.
    ExportThread(i64),
    /// Write every loaded entry in a bulk format.
    ExportAll(ExportFormat),
    /// Run an advanced search.
    Search(SearchQuery),
    /// Fetch completions for the focused form input.
    Suggest {
        /// Column to complete from.
        source: SuggestSource,
        /// Text typed so far, or the last tag being typed.
        query: String,
    },
    /// Load time reports for a scope.
    LoadTimeReports(Scope),
    /// Load per-project summaries.
    LoadProjects,
    /// Load per-tag analytics.
    LoadTags,
    /// Load overview numbers for stats and dashboard.
    LoadOverview,
    /// Load per-day entry counts for `[start, end)`.
    LoadCalendar {
        /// First day.
        start: NaiveDate,
        /// Day after the last.
        end: NaiveDate,
    },
    /// Load the entries of one day for the calendar preview.
    LoadDay(NaiveDate),
    /// Load user templates.
    LoadTemplates,
    /// Persist a user template.
    SaveTemplate(TemplateRecord),
    /// Bump a template's usage counter.
    RecordTemplateUsage(String),
    /// Start the one-second countdown source.
    StartCountdown,
    /// Cancel the countdown source.
    StopCountdown,
    /// Leave the application.
    Quit,
}

/// Result of handling one input in one mode.
#[derive(Debug)]
pub struct Transition {
    /// Mode to continue in.
    pub mode: Mode,
    /// Effects to perform, in order.
    pub effects: Vec<Effect>,
}

impl Transition {
    /// Continue in `mode` without effects.
    pub fn to(mode: Mode) -> Self {
        Self {
            mode,
            effects: Vec::new(),
        }
    }

    /// Back to normal mode.
    pub fn normal() -> Self {
        Self::to(Mode::Normal)
    }

    /// Append an effect.
    #[must_use]
    pub fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Append a timeline and facet reload.
    #[must_use]
    pub fn reload(self) -> Self {
        self.with(Effect::ReloadTimeline).with(Effect::ReloadFacets)
    }
}
