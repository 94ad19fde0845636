//! Command palette catalogue.
//!
//! Every palette command maps to an [`Action`], the same value the normal
//! mode key bindings produce, so both paths run identical transitions.

use std::fmt;

use crate::timeline::Scope;

/// A user-level action reachable from keys and the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Scope to today and reset the cursor.
    GotoToday,
    /// Switch scope.
    SetScope(Scope),
    /// Show or hide the sidebar.
    ToggleSidebar,
    /// Next color theme.
    CycleTheme,
    /// Distraction-free mode.
    FocusMode,
    /// Dashboard overlay.
    Dashboard,
    /// Statistics overlay.
    Stats,
    /// Create form with a preset category.
    Create(&'static str),
    /// Rich text editor.
    RichText,
    /// Template picker.
    Templates,
    /// New user template form.
    NewTemplate,
    /// Time reports.
    TimeReports,
    /// Project summary.
    ProjectSummary,
    /// Tag analytics.
    TagAnalytics,
    /// Calendar.
    Calendar,
    /// Live filter.
    Search,
    /// Multi-field search.
    AdvancedSearch,
    /// Bulk export dialog.
    Export,
    /// Start a work session.
    PomodoroWork,
    /// Start a break.
    PomodoroBreak,
    /// Stop the countdown.
    PomodoroStop,
    /// Show countdown statistics.
    PomodoroStats,
    /// Toggle automatic logging of finished sessions.
    PomodoroAutoLog,
    /// Key reference.
    Help,
    /// Leave the application.
    Quit,
}

/// Palette category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Scope and movement.
    Navigation,
    /// Layout and appearance.
    View,
    /// New entries and templates.
    Create,
    /// Reports.
    Analytics,
    /// Filtering.
    Search,
    /// Files.
    Export,
    /// Countdown.
    Productivity,
    /// Everything else.
    Utility,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 8] = [
        Self::Navigation,
        Self::View,
        Self::Create,
        Self::Analytics,
        Self::Search,
        Self::Export,
        Self::Productivity,
        Self::Utility,
    ];

    /// Icon shown next to the name.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Navigation => "🧭",
            Self::View => "👁️",
            Self::Create => "✏️",
            Self::Analytics => "📊",
            Self::Search => "🔍",
            Self::Export => "📤",
            Self::Productivity => "⚡",
            Self::Utility => "🛠️",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Navigation => "Navigation",
            Self::View => "View",
            Self::Create => "Create",
            Self::Analytics => "Analytics",
            Self::Search => "Search",
            Self::Export => "Export",
            Self::Productivity => "Productivity",
            Self::Utility => "Utility",
        })
    }
}

/// A palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    /// Display name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Equivalent key binding, if any.
    pub shortcut: &'static str,
    /// Category.
    pub category: Category,
    /// What running it does.
    pub action: Action,
}

const fn cmd(
    name: &'static str,
    description: &'static str,
    shortcut: &'static str,
    category: Category,
    action: Action,
) -> Command {
    Command {
        name,
        description,
        shortcut,
        category,
        action,
    }
}

/// Every command, grouped by category.
pub const COMMANDS: &[Command] = &[
    cmd("Go to Today", "Jump to today's entries", "ctrl+g", Category::Navigation, Action::GotoToday),
    cmd("This Week", "Show this week's entries", "3", Category::Navigation, Action::SetScope(Scope::ThisWeek)),
    cmd("This Month", "Show this month's entries", "5", Category::Navigation, Action::SetScope(Scope::ThisMonth)),
    cmd("All Time", "Show every entry", "0", Category::Navigation, Action::SetScope(Scope::All)),
    cmd("Toggle Sidebar", "Show or hide the filter sidebar", "ctrl+b", Category::View, Action::ToggleSidebar),
    cmd("Cycle Theme", "Switch to the next color theme", "ctrl+t", Category::View, Action::CycleTheme),
    cmd("Focus Mode", "Hide everything but the timeline", "ctrl+f", Category::View, Action::FocusMode),
    cmd("Dashboard", "Overview of recent activity", "ctrl+w", Category::View, Action::Dashboard),
    cmd("Statistics", "Entry counts and trends", "S", Category::View, Action::Stats),
    cmd("New Note", "Create a note", "alt+n", Category::Create, Action::Create("note")),
    cmd("New Task", "Create a task", "alt+t", Category::Create, Action::Create("task")),
    cmd("New Meeting", "Create a meeting entry", "alt+m", Category::Create, Action::Create("meeting")),
    cmd("Rich Text Editor", "Write a long entry with markdown helpers", "", Category::Create, Action::RichText),
    cmd("Templates", "Start an entry from a template", "T", Category::Create, Action::Templates),
    cmd("New Template", "Save a reusable template", "", Category::Create, Action::NewTemplate),
    cmd("Time Reports", "Logged time by day, week or category", "R", Category::Analytics, Action::TimeReports),
    cmd("Project Summary", "Activity per project", "J", Category::Analytics, Action::ProjectSummary),
    cmd("Tag Analytics", "Usage per tag", "A", Category::Analytics, Action::TagAnalytics),
    cmd("Calendar", "Entries per day", "C", Category::Analytics, Action::Calendar),
    cmd("Search", "Filter the timeline as you type", "/", Category::Search, Action::Search),
    cmd("Advanced Search", "Search by text, project, category and tags", "F", Category::Search, Action::AdvancedSearch),
    cmd("Export", "Write loaded entries to a file", "E", Category::Export, Action::Export),
    cmd("Start Pomodoro", "Begin a work session", "P", Category::Productivity, Action::PomodoroWork),
    cmd("Start Break", "Begin a short break", "", Category::Productivity, Action::PomodoroBreak),
    cmd("Stop Pomodoro", "Stop the countdown", "P", Category::Productivity, Action::PomodoroStop),
    cmd("Pomodoro Stats", "Sessions and focus time", "", Category::Productivity, Action::PomodoroStats),
    cmd("Toggle Auto-Log", "Log finished sessions as timer entries", "", Category::Productivity, Action::PomodoroAutoLog),
    cmd("Help", "Key reference", "?", Category::Utility, Action::Help),
    cmd("Quit", "Leave pulse", "q", Category::Utility, Action::Quit),
];

/// Commands in `category` (all when `None`) whose name, description or
/// shortcut contains `query`, case-insensitively.
pub fn filter(query: &str, category: Option<Category>) -> Vec<&'static Command> {
    let query = query.trim().to_lowercase();
    COMMANDS
        .iter()
        .filter(|c| category.is_none_or(|cat| c.category == cat))
        .filter(|c| {
            query.is_empty()
                || c.name.to_lowercase().contains(&query)
                || c.description.to_lowercase().contains(&query)
                || c.shortcut.to_lowercase().contains(&query)
        })
        .collect()
}
