//! Modal dialogs drawn over the panels, one per non-timeline mode.

use chrono::{Datelike, Duration, NaiveDate};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::analytics::{format_minutes, rollup, Overview, ReportDisplay};
use crate::export::ExportFormat;
use crate::tui::components::{centered_rect, field_line, hint_line, modal, TextInput};
use crate::tui::modes::{
    preview_lines, AdvancedSearchState, CalendarState, CalendarView, CreateForm, EditorButton,
    EditorForm, ExportState, HelpState, Mode, OverviewState, PaletteState, PickerState,
    PreviewLine, ProjectSummaryState, RichTextState, TagAnalyticsState, TemplateForm,
    TemplatesState, TextFormat, TimeReportsState, SEARCH_FIELDS, TOOLBAR,
};
use crate::templates::category_icon;
use crate::tui::state::Session;
use crate::tui::theme::{category_color, Theme};
use crate::util::{pad_right, truncate};

/// Key reference, grouped.
const HELP: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("j / k, ↑ / ↓", "Move the cursor"),
            ("g / G", "First / last thread"),
            ("PgUp / PgDn", "Page the view"),
            ("tab", "Cycle pane focus"),
            ("h / l", "Thread pane, kanban columns"),
            ("enter", "Open thread, toggle sidebar filter"),
        ],
    ),
    (
        "Scope and filters",
        &[
            ("t", "Cycle Today, Week, Month, All"),
            ("1-6, 0", "Today .. Last Month, All Time"),
            ("s", "Since a date"),
            ("/", "Live search"),
            ("p / c / #", "Pick project, category, tags"),
            ("F", "Advanced search"),
            ("ctrl+g", "Jump to today"),
        ],
    ),
    (
        "Entries",
        &[
            ("n / alt+n", "New note"),
            ("alt+t / alt+m", "New task / meeting"),
            ("r", "Reply"),
            ("e", "Edit"),
            ("d / D", "Delete / duplicate"),
            ("x", "Export thread"),
            ("ctrl+d", "Bookmark"),
        ],
    ),
    (
        "Views",
        &[
            ("v", "Timeline, cards, table, kanban"),
            ("o / O", "Sort key / direction"),
            ("ctrl+b", "Sidebar"),
            ("ctrl+f", "Focus mode"),
            ("ctrl+t", "Next theme"),
        ],
    ),
    (
        "Tools",
        &[
            ("ctrl+k", "Command palette"),
            ("C", "Calendar"),
            ("T", "Templates"),
            ("E", "Export all"),
            ("R / J / A", "Time, project, tag reports"),
            ("ctrl+w / S", "Dashboard / statistics"),
            ("P", "Start or stop pomodoro"),
            ("?", "This help"),
            ("q / ctrl+c", "Quit"),
        ],
    ),
];

/// Draw the dialog of the active mode, if it has one.
pub(super) fn draw(f: &mut Frame, session: &Session) {
    let theme = session.theme();
    let area = f.area();
    match &session.mode {
        Mode::Normal | Mode::Search | Mode::Since(_) | Mode::Focus(_) => {}
        Mode::Help(state) => help(f, state, &theme, area),
        Mode::Picker(state) => picker(f, session, state, &theme, area),
        Mode::Create(form) => create(f, form, &theme, area),
        Mode::Edit(form) => editor(f, form, false, &theme, area),
        Mode::Reply(form) => editor(f, form, true, &theme, area),
        Mode::Stats(state) => stats(f, session, state, &theme, area),
        Mode::Dashboard(state) => dashboard(f, session, state, &theme, area),
        Mode::Calendar(state) => calendar(f, session, state, &theme, area),
        Mode::Templates(state) => templates(f, session, state, &theme, area),
        Mode::Export(state) => export(f, session, state, &theme, area),
        Mode::AdvancedSearch(state) => advanced_search(f, state, &theme, area),
        Mode::TimeReports(state) => time_reports(f, state, &theme, area),
        Mode::ProjectSummary(state) => project_summary(f, state, &theme, area),
        Mode::TagAnalytics(state) => tag_analytics(f, state, &theme, area),
        Mode::CommandPalette(state) => command_palette(f, state, &theme, area),
        Mode::RichTextEditor(state) => rich_text(f, state, &theme, area),
        Mode::TemplateEdit(form) => template_form(f, form, &theme, area),
    }
}

/// Split a multi-line input into display lines, keeping the cursor cell.
fn input_lines(label: &str, input: &TextInput, focused: bool, theme: &Theme) -> Vec<Line<'static>> {
    let label_style = if focused {
        theme.title_style()
    } else {
        theme.muted_style()
    };
    let marker = if focused { "› " } else { "  " };
    let mut lines = vec![Line::styled(format!("{marker}{label}"), label_style)];
    let mut current: Vec<Span<'static>> = vec![Span::raw("    ")];
    for span in input.spans(focused, theme) {
        let mut parts = span.content.split('\n').peekable();
        while let Some(part) = parts.next() {
            if !part.is_empty() {
                current.push(Span::styled(part.to_string(), span.style));
            }
            if parts.peek().is_some() {
                lines.push(Line::from(std::mem::replace(
                    &mut current,
                    vec![Span::raw("    ")],
                )));
            }
        }
    }
    lines.push(Line::from(current));
    lines
}

/// A list row: highlighted when `selected`.
fn row(text: String, selected: bool, theme: &Theme) -> Line<'static> {
    if selected {
        Line::styled(format!("▸ {text}"), theme.selection_style())
    } else {
        Line::raw(format!("  {text}"))
    }
}

/// Rows `[start, end)` of a list of `len` that keep `cursor` visible in
/// `height` rows.
fn list_window(cursor: usize, len: usize, height: usize) -> (usize, usize) {
    let height = height.max(1);
    let start = cursor.saturating_sub(height - 1).min(len.saturating_sub(height));
    (start, (start + height).min(len))
}

fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 {
        return String::new();
    }
    let filled = ((value / max) * width as f64).round() as usize;
    "█".repeat(filled.min(width))
}

// ----- help and small dialogs -------------------------------------------------

fn help(f: &mut Frame, state: &HelpState, theme: &Theme, area: Rect) {
    let popup = centered_rect(70, 80, area);
    let inner = modal(f, popup, "Keyboard Shortcuts", theme);
    let mut lines = Vec::new();
    for (section, keys) in HELP {
        lines.push(Line::styled(section.to_string(), theme.title_style()));
        for (key, description) in keys.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {key:<18}"), Style::default().fg(theme.primary)),
                Span::raw(description.to_string()),
            ]));
        }
        lines.push(Line::raw(""));
    }
    lines.push(hint_line("j/k scroll · esc or ? close", theme));
    let scroll = state.scroll.min(lines.len().saturating_sub(1));
    f.render_widget(
        Paragraph::new(lines).scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0)),
        inner,
    );
}

fn picker(f: &mut Frame, session: &Session, state: &PickerState, theme: &Theme, area: Rect) {
    let popup = centered_rect(40, 60, area);
    let inner = modal(f, popup, state.kind.title(), theme);
    let items = state.kind.items(session);
    let mut lines = Vec::new();
    if items.is_empty() {
        lines.push(Line::styled("Nothing to pick yet", theme.muted_style()));
    }
    let height = usize::from(inner.height.saturating_sub(2));
    let (start, end) = list_window(state.cursor, items.len(), height);
    for (i, item) in items.iter().enumerate().take(end).skip(start) {
        let mark = if state.kind.is_selected(session, &item.label) {
            "●"
        } else {
            " "
        };
        lines.push(row(
            format!("{mark} {} ({})", item.label, item.count),
            i == state.cursor,
            theme,
        ));
    }
    lines.push(Line::raw(""));
    lines.push(hint_line("enter toggle · esc close", theme));
    f.render_widget(Paragraph::new(lines), inner);
}

fn create(f: &mut Frame, form: &CreateForm, theme: &Theme, area: Rect) {
    let popup = centered_rect(60, 40, area);
    let inner = modal(f, popup, "New Entry", theme);
    let mut lines = Vec::new();
    let fields = [
        ("Text", &form.text),
        ("Project", &form.project),
        ("Category", &form.category),
        ("Tags", &form.tags),
    ];
    for (i, (label, input)) in fields.into_iter().enumerate() {
        lines.push(field_line(label, input, form.field == i, theme));
        if form.field == i {
            lines.extend(form.suggestions.lines(theme));
        }
    }
    lines.push(Line::raw(""));
    let hint = if form.suggestions.is_showing() {
        "tab/shift+tab choose · enter or space accept · esc hide"
    } else {
        "tab next field · enter or ctrl+s save · esc cancel"
    };
    lines.push(hint_line(hint, theme));
    f.render_widget(Paragraph::new(lines), inner);
}

fn editor(f: &mut Frame, form: &EditorForm, reply: bool, theme: &Theme, area: Rect) {
    let popup = centered_rect(70, 60, area);
    let title = if reply {
        format!("Reply to #{}", form.target_id)
    } else {
        format!("Edit #{}", form.target_id)
    };
    let inner = modal(f, popup, &title, theme);
    let mut lines = input_lines("Text", &form.text, form.field == 0, theme);
    lines.push(Line::raw(""));
    lines.push(field_line("Project", &form.project, form.field == 1, theme));
    if form.field == 1 {
        lines.extend(form.suggestions.lines(theme));
    }
    lines.push(field_line("Tags", &form.tags, form.field == 2, theme));
    if form.field == 2 {
        lines.extend(form.suggestions.lines(theme));
    }
    lines.push(Line::raw(""));

    let button = |label: &str, which: EditorButton| {
        let style = if form.field == 3 && form.button == which {
            theme.selection_style().add_modifier(Modifier::BOLD)
        } else {
            theme.muted_style()
        };
        Span::styled(format!("[ {label} ]"), style)
    };
    lines.push(Line::from(vec![
        Span::raw("  "),
        button("OK", EditorButton::Ok),
        Span::raw("  "),
        button("Cancel", EditorButton::Cancel),
    ]));
    let hint = if form.suggestions.is_showing() {
        "tab/shift+tab choose · enter or space accept · esc hide"
    } else {
        "tab next · ctrl+s save · esc cancel"
    };
    lines.push(hint_line(hint, theme));
    f.render_widget(Paragraph::new(lines), inner);
}

fn export(f: &mut Frame, session: &Session, state: &ExportState, theme: &Theme, area: Rect) {
    let popup = centered_rect(50, 40, area);
    let inner = modal(f, popup, "Export", theme);
    let mut lines = vec![
        Line::raw(format!(
            "{} entries in {}",
            session.entry_count(),
            session.scope
        )),
        Line::raw(""),
    ];
    for (i, format) in [ExportFormat::Markdown, ExportFormat::Json, ExportFormat::Csv]
        .into_iter()
        .enumerate()
    {
        lines.push(row(
            format!("{} {format} (.{})", i + 1, format.extension()),
            format == state.format,
            theme,
        ));
    }
    lines.push(Line::raw(""));
    lines.push(hint_line("1-3 format · e or enter export · esc cancel", theme));
    f.render_widget(Paragraph::new(lines), inner);
}

// ----- statistics -------------------------------------------------------------

fn overview_lines(overview: &Overview, theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Total entries  ", theme.muted_style()),
            Span::styled(overview.total.to_string(), theme.title_style()),
            Span::styled(format!("   ({})", overview.activity_level()), theme.muted_style()),
        ]),
        Line::raw(format!(
            "Today {}   This week {}   This month {}",
            overview.today, overview.this_week, overview.this_month
        )),
        Line::raw(format!(
            "Logged time {}   Daily average {:.1}   Streak {} days",
            format_minutes(overview.total_minutes),
            overview.daily_average,
            overview.streak_days
        )),
    ];
    if let Some(day) = overview.busiest_weekday {
        lines.push(Line::raw(format!("Busiest day {day}")));
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled("By category", theme.title_style()));
    let max = overview.by_category.values().copied().max().unwrap_or(0) as f64;
    let bar_width = width.saturating_sub(30).max(5);
    for (category, count) in &overview.by_category {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:<10}", truncate(category, 10)),
                Style::default().fg(category_color(category)),
            ),
            Span::raw(format!("{count:>5} {:>5.1}% ", overview.percent(*count))),
            Span::styled(
                bar(*count as f64, max, bar_width),
                Style::default().fg(category_color(category)),
            ),
        ]));
    }
    if !overview.top_projects.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::styled("Top projects", theme.title_style()));
        for (project, count) in &overview.top_projects {
            lines.push(Line::raw(format!("  {:<20} {count}", truncate(project, 20))));
        }
    }
    lines
}

fn stats(f: &mut Frame, session: &Session, state: &OverviewState, theme: &Theme, area: Rect) {
    let popup = centered_rect(70, 80, area);
    let inner = modal(f, popup, "Statistics", theme);
    let mut lines = match &state.overview {
        Some(overview) => overview_lines(overview, theme, usize::from(inner.width)),
        None => vec![Line::styled("Loading...", theme.muted_style())],
    };
    lines.push(Line::raw(""));
    lines.extend(session.pomodoro.stats().lines().map(|l| Line::raw(l.to_string())));
    lines.push(Line::raw(""));
    lines.push(hint_line("esc close", theme));
    f.render_widget(Paragraph::new(lines), inner);
}

fn dashboard(f: &mut Frame, session: &Session, state: &OverviewState, theme: &Theme, area: Rect) {
    let popup = centered_rect(80, 80, area);
    let inner = modal(f, popup, "Dashboard", theme);
    let [left, right] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .areas(inner);

    let mut lines = match &state.overview {
        Some(overview) => overview_lines(overview, theme, usize::from(left.width)),
        None => vec![Line::styled("Loading...", theme.muted_style())],
    };
    lines.push(Line::raw(""));
    lines.push(hint_line("esc close", theme));
    f.render_widget(Paragraph::new(lines), left);

    let mut side = vec![Line::styled("Pomodoro", theme.title_style())];
    side.push(Line::raw(if session.pomodoro.active {
        format!("  {}", session.pomodoro.label())
    } else {
        "  idle".to_string()
    }));
    side.push(Line::raw(format!(
        "  {} sessions, {} focus",
        session.pomodoro.work_sessions,
        format_minutes(i64::from(session.pomodoro.focus_minutes))
    )));
    side.push(Line::raw(""));
    side.push(Line::styled("Reminder", theme.title_style()));
    side.push(Line::raw(match state.reminder {
        Some(at) => format!("  {}", at.format("%a %b %d %H:%M")),
        None => "  off".to_string(),
    }));
    side.push(Line::raw(""));
    side.push(Line::styled("Recent", theme.title_style()));
    if session.notifications.is_empty() {
        side.push(Line::styled("  nothing yet", theme.muted_style()));
    }
    for message in session.notifications.iter().rev() {
        side.push(Line::raw(format!("  {message}")));
    }
    f.render_widget(Paragraph::new(side).wrap(Wrap { trim: false }), right);
}

// ----- calendar ---------------------------------------------------------------

fn calendar(f: &mut Frame, session: &Session, state: &CalendarState, theme: &Theme, area: Rect) {
    let popup = centered_rect(70, 80, area);
    let title = match state.view {
        CalendarView::Month => format!("Calendar · {}", state.anchor.format("%B %Y")),
        CalendarView::Week => format!("Calendar · week of {}", state.range().0.format("%b %d")),
        CalendarView::Day => format!("Calendar · {}", state.anchor.format("%A %b %d %Y")),
    };
    let inner = modal(f, popup, &title, theme);
    let today = session.now.date_naive();

    let cell_style = |date: NaiveDate| {
        let mut style = Style::default();
        if date == today {
            style = style.add_modifier(Modifier::BOLD).fg(theme.primary);
        }
        if date == state.selected {
            style = theme.selection_style();
        }
        style
    };

    let mut lines = Vec::new();
    match state.view {
        CalendarView::Month => {
            lines.push(Line::styled(
                " Sun   Mon   Tue   Wed   Thu   Fri   Sat",
                theme.muted_style(),
            ));
            let (start, end) = state.range();
            let mut day = start - Duration::days(i64::from(start.weekday().num_days_from_sunday()));
            while day < end {
                let mut spans = Vec::new();
                for _ in 0..7 {
                    let text = if day < start || day >= end {
                        "      ".to_string()
                    } else {
                        match state.count(day) {
                            0 => format!(" {:>2}   ", day.day()),
                            n => format!(" {:>2}•{:<2}", day.day(), n.min(99)),
                        }
                    };
                    spans.push(Span::styled(text, cell_style(day)));
                    day += Duration::days(1);
                }
                lines.push(Line::from(spans));
            }
        }
        CalendarView::Week => {
            let (start, end) = state.range();
            let max = (start.iter_days().take_while(|d| *d < end))
                .map(|d| state.count(d))
                .max()
                .unwrap_or(0) as f64;
            for day in start.iter_days().take_while(|d| *d < end) {
                let count = state.count(day);
                lines.push(Line::from(vec![
                    Span::styled(format!(" {} ", day.format("%a %m-%d")), cell_style(day)),
                    Span::raw(format!("{count:>3} ")),
                    Span::styled(bar(count as f64, max, 30), Style::default().fg(theme.primary)),
                ]));
            }
        }
        CalendarView::Day => {
            lines.push(Line::raw(format!(
                " {} entries",
                state.count(state.anchor)
            )));
        }
    }

    lines.push(Line::raw(""));
    if state.preview || state.view == CalendarView::Day {
        lines.push(Line::styled(
            format!("Entries on {}", state.selected.format("%Y-%m-%d")),
            theme.title_style(),
        ));
        if state.day_entries.is_empty() {
            lines.push(Line::styled("  none", theme.muted_style()));
        }
        for entry in &state.day_entries {
            let local = session.zone.localize(entry.timestamp);
            lines.push(Line::from(vec![
                Span::raw(format!("  {} ", local.format("%H:%M"))),
                Span::styled(
                    format!("{:<8}", entry.category),
                    Style::default().fg(category_color(&entry.category)),
                ),
                Span::raw(truncate(entry.text.lines().next().unwrap_or_default(), 60)),
            ]));
        }
        lines.push(Line::raw(""));
    }
    lines.push(hint_line(
        "h/l period · j/k move · v view · t today · enter entries · n new · esc close",
        theme,
    ));
    f.render_widget(Paragraph::new(lines), inner);
}

// ----- templates ----------------------------------------------------------------

fn templates(f: &mut Frame, session: &Session, state: &TemplatesState, theme: &Theme, area: Rect) {
    let popup = centered_rect(80, 70, area);
    let inner = modal(f, popup, "Templates", theme);
    let [body, footer] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(2)])
        .areas(inner);
    let [left, right] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(22), Constraint::Min(20)])
        .areas(body);

    let categories: Vec<Line> = session
        .templates
        .categories()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let text = format!("{} {name}", category_icon(name));
            if i == state.category && state.category_mode {
                Line::styled(format!("▸ {text}"), theme.selection_style())
            } else if i == state.category {
                Line::styled(format!("▸ {text}"), theme.title_style())
            } else {
                Line::raw(format!("  {text}"))
            }
        })
        .collect();
    f.render_widget(Paragraph::new(categories), left);

    let visible = state.visible(session);
    let mut lines = Vec::new();
    if state.searching || !state.query.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("filter: ", theme.muted_style()),
            Span::raw(state.query.clone()),
            if state.searching {
                Span::styled(" ", Style::default().bg(theme.primary))
            } else {
                Span::raw("")
            },
        ]));
    }
    if visible.is_empty() {
        lines.push(Line::styled("No templates match", theme.muted_style()));
    }
    for (i, template) in visible.iter().enumerate() {
        let selected = i == state.cursor && !state.category_mode;
        let mark = if template.builtin { "" } else { " ✎" };
        lines.push(row(format!("{}{mark}", template.name), selected, theme));
        lines.push(Line::styled(
            format!("    {}", template.description),
            theme.muted_style(),
        ));
    }
    if let Some(template) = visible.get(state.cursor) {
        lines.push(Line::raw(""));
        lines.push(Line::styled("Preview", theme.title_style()));
        for line in template.content.lines().take(8) {
            lines.push(Line::raw(format!("  {line}")));
        }
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), right);
    f.render_widget(
        Paragraph::new(hint_line(
            "enter use · / filter · tab categories · 1-9 jump · esc close",
            theme,
        )),
        footer,
    );
}

fn template_form(f: &mut Frame, form: &TemplateForm, theme: &Theme, area: Rect) {
    let popup = centered_rect(70, 60, area);
    let inner = modal(f, popup, "New Template", theme);
    let mut lines = vec![
        field_line("Name", &form.name, form.field == 0, theme),
        field_line("Category", &form.category, form.field == 1, theme),
        field_line("Description", &form.description, form.field == 2, theme),
        Line::raw(""),
    ];
    lines.extend(input_lines("Content", &form.content, form.field == 3, theme));
    lines.push(Line::raw(""));
    lines.push(hint_line(
        "{{date}} {{time}} {{datetime}} are filled in · ctrl+s save · esc cancel",
        theme,
    ));
    f.render_widget(Paragraph::new(lines), inner);
}

// ----- search and palette ---------------------------------------------------------

fn advanced_search(f: &mut Frame, state: &AdvancedSearchState, theme: &Theme, area: Rect) {
    let popup = centered_rect(80, 80, area);
    let inner = modal(f, popup, "Advanced Search", theme);
    let mut lines: Vec<Line> = state
        .inputs()
        .iter()
        .zip(SEARCH_FIELDS)
        .enumerate()
        .map(|(i, (input, label))| field_line(label, input, i == state.field, theme))
        .collect();
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        format!("Results ({})", state.results.len()),
        theme.title_style(),
    ));
    let height = usize::from(inner.height).saturating_sub(lines.len() + 2);
    let (start, end) = list_window(state.cursor, state.results.len(), height);
    for (i, entry) in state.results.iter().enumerate().take(end).skip(start) {
        lines.push(row(
            format!(
                "#{:<5} {:<8} {}",
                entry.id,
                truncate(&entry.category, 8),
                truncate(entry.text.lines().next().unwrap_or_default(), 60)
            ),
            i == state.cursor,
            theme,
        ));
    }
    lines.push(Line::raw(""));
    lines.push(hint_line("tab field · enter search · ↑/↓ results · esc close", theme));
    f.render_widget(Paragraph::new(lines), inner);
}

fn command_palette(f: &mut Frame, state: &PaletteState, theme: &Theme, area: Rect) {
    let popup = centered_rect(60, 60, area);
    let inner = modal(f, popup, "Commands", theme);
    let category = match state.category {
        Some(category) => format!("{} {category}", category.icon()),
        None => "All".to_string(),
    };
    let mut lines = vec![
        Line::from({
            let mut spans = vec![Span::styled("> ", theme.title_style())];
            spans.extend(state.query.spans(true, theme));
            spans
        }),
        Line::styled(format!("Category: {category}"), theme.muted_style()),
        Line::raw(""),
    ];
    let commands = state.visible();
    if commands.is_empty() {
        lines.push(Line::styled("No matching commands", theme.muted_style()));
    }
    let height = usize::from(inner.height).saturating_sub(lines.len() + 2);
    let (start, end) = list_window(state.cursor, commands.len(), height);
    for (i, command) in commands.iter().enumerate().take(end).skip(start) {
        let text = format!(
            "{} {} {:>10}  {}",
            command.category.icon(),
            pad_right(command.name, 24),
            command.shortcut,
            command.description
        );
        lines.push(row(text, i == state.cursor, theme));
    }
    lines.push(Line::raw(""));
    lines.push(hint_line(
        "enter run · ↑/↓ move · ctrl+n/p category · ctrl+r reset · esc close",
        theme,
    ));
    f.render_widget(Paragraph::new(lines), inner);
}

// ----- reports ------------------------------------------------------------------

fn time_reports(f: &mut Frame, state: &TimeReportsState, theme: &Theme, area: Rect) {
    let popup = centered_rect(80, 80, area);
    let title = format!("Time Reports · {} · {} · {}", state.scope, state.view, state.display);
    let inner = modal(f, popup, &title, theme);
    let rows = rollup(&state.reports, state.view);
    let mut lines = Vec::new();
    if rows.is_empty() {
        lines.push(Line::styled("No logged time in this scope", theme.muted_style()));
    }
    let total: i64 = rows.iter().map(|r| r.minutes).sum();
    let entries: usize = rows.iter().map(|r| r.entries).sum();
    match state.display {
        ReportDisplay::Table => {
            lines.push(Line::styled(
                format!("  {:<16} {:>10} {:>8}", "Period", "Time", "Entries"),
                theme.title_style(),
            ));
            for (i, r) in rows.iter().enumerate() {
                lines.push(row(
                    format!("{:<16} {:>10} {:>8}", r.label, format_minutes(r.minutes), r.entries),
                    i == state.cursor,
                    theme,
                ));
            }
        }
        ReportDisplay::Chart => {
            let max = rows.iter().map(|r| r.minutes).max().unwrap_or(0) as f64;
            let width = usize::from(inner.width).saturating_sub(32).max(5);
            for (i, r) in rows.iter().enumerate() {
                let mut line = Line::from(vec![
                    Span::raw(format!("  {:<14} {:>8} ", r.label, format_minutes(r.minutes))),
                    Span::styled(bar(r.minutes as f64, max, width), Style::default().fg(theme.primary)),
                ]);
                if i == state.cursor {
                    line = line.style(theme.selection_style());
                }
                lines.push(line);
            }
        }
        ReportDisplay::Summary => {
            let periods = rows.len().max(1) as i64;
            lines.push(Line::raw(format!("  Total time      {}", format_minutes(total))));
            lines.push(Line::raw(format!("  Entries         {entries}")));
            lines.push(Line::raw(format!("  Periods         {}", rows.len())));
            lines.push(Line::raw(format!(
                "  Average/period  {}",
                format_minutes(total / periods)
            )));
            if let Some(top) = rows.iter().max_by_key(|r| r.minutes) {
                lines.push(Line::raw(format!(
                    "  Busiest         {} ({})",
                    top.label,
                    format_minutes(top.minutes)
                )));
            }
        }
        ReportDisplay::Details => {
            for report in &state.reports {
                lines.push(Line::styled(
                    format!(
                        "{}  {} in {} entries",
                        report.date.format("%a %Y-%m-%d"),
                        format_minutes(report.total_minutes),
                        report.entry_count
                    ),
                    theme.title_style(),
                ));
                for (category, minutes) in &report.by_category {
                    lines.push(Line::from(vec![
                        Span::styled(
                            format!("    {category:<12}"),
                            Style::default().fg(category_color(category)),
                        ),
                        Span::raw(format_minutes(*minutes)),
                    ]));
                }
                for (project, minutes) in &report.by_project {
                    lines.push(Line::styled(
                        format!("    @{project:<11} {}", format_minutes(*minutes)),
                        theme.muted_style(),
                    ));
                }
            }
        }
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        format!("Total {} across {entries} entries", format_minutes(total)),
        theme.muted_style(),
    ));
    lines.push(hint_line("t scope · v rollup · V display · esc close", theme));
    f.render_widget(Paragraph::new(lines), inner);
}

fn project_summary(f: &mut Frame, state: &ProjectSummaryState, theme: &Theme, area: Rect) {
    let popup = centered_rect(80, 80, area);
    let title = format!("Projects · sort {} · {}", state.sort, state.display);
    let inner = modal(f, popup, &title, theme);
    let mut lines = Vec::new();
    if state.summaries.is_empty() {
        lines.push(Line::styled("No projects yet", theme.muted_style()));
    }
    let max = state.summaries.iter().map(|s| s.total_minutes).max().unwrap_or(0) as f64;
    match state.display {
        ReportDisplay::Chart => {
            for (i, s) in state.summaries.iter().enumerate() {
                let mut line = Line::from(vec![
                    Span::raw(format!("  {:<18} {:>8} ", truncate(&s.project, 18), format_minutes(s.total_minutes))),
                    Span::styled(bar(s.total_minutes as f64, max, 30), Style::default().fg(theme.primary)),
                ]);
                if i == state.cursor {
                    line = line.style(theme.selection_style());
                }
                lines.push(line);
            }
        }
        ReportDisplay::Details | ReportDisplay::Summary if !state.summaries.is_empty() => {
            if let Some(s) = state.summaries.get(state.cursor) {
                lines.push(Line::styled(s.project.clone(), theme.title_style()));
                lines.push(Line::raw(format!("  Time        {}", format_minutes(s.total_minutes))));
                lines.push(Line::raw(format!("  Entries     {}", s.entry_count)));
                lines.push(Line::raw(format!("  Last active {}", s.last_active.format("%Y-%m-%d"))));
                lines.push(Line::raw(format!("  Trend       {} {}", s.trend.arrow(), s.trend)));
                for (category, count) in &s.categories {
                    lines.push(Line::styled(
                        format!("    {category:<12} {count}"),
                        Style::default().fg(category_color(category)),
                    ));
                }
            }
        }
        _ => {
            lines.push(Line::styled(
                format!("  {:<20} {:>10} {:>8} {:>12}  Trend", "Project", "Time", "Entries", "Last active"),
                theme.title_style(),
            ));
            for (i, s) in state.summaries.iter().enumerate() {
                lines.push(row(
                    format!(
                        "{:<20} {:>10} {:>8} {:>12}  {}",
                        truncate(&s.project, 20),
                        format_minutes(s.total_minutes),
                        s.entry_count,
                        s.last_active.format("%Y-%m-%d"),
                        s.trend.arrow()
                    ),
                    i == state.cursor,
                    theme,
                ));
            }
        }
    }
    lines.push(Line::raw(""));
    lines.push(hint_line("enter filter · o sort · v display · r refresh · esc close", theme));
    f.render_widget(Paragraph::new(lines), inner);
}

fn tag_analytics(f: &mut Frame, state: &TagAnalyticsState, theme: &Theme, area: Rect) {
    let popup = centered_rect(80, 80, area);
    let title = format!("Tags · sort {} · {}", state.sort, state.display);
    let inner = modal(f, popup, &title, theme);
    let mut lines = Vec::new();
    if state.tags.is_empty() {
        lines.push(Line::styled("No tags yet", theme.muted_style()));
    }
    let max = state.tags.iter().map(|t| t.usage_count).max().unwrap_or(0) as f64;
    match state.display {
        ReportDisplay::Chart => {
            for (i, t) in state.tags.iter().enumerate() {
                let mut line = Line::from(vec![
                    Span::raw(format!("  #{:<17} {:>5} ", truncate(&t.tag, 17), t.usage_count)),
                    Span::styled(bar(t.usage_count as f64, max, 30), Style::default().fg(theme.primary)),
                ]);
                if i == state.cursor {
                    line = line.style(theme.selection_style());
                }
                lines.push(line);
            }
        }
        ReportDisplay::Details | ReportDisplay::Summary if !state.tags.is_empty() => {
            if let Some(t) = state.tags.get(state.cursor) {
                lines.push(Line::styled(format!("#{}", t.tag), theme.title_style()));
                lines.push(Line::raw(format!("  Used        {} times", t.usage_count)));
                lines.push(Line::raw(format!("  Time        {}", format_minutes(t.total_minutes))));
                lines.push(Line::raw(format!("  Last used   {}", t.last_used.format("%Y-%m-%d"))));
                lines.push(Line::raw(format!("  Trend       {} {}", t.trend.arrow(), t.trend)));
                lines.push(Line::raw(format!("  Projects    {}", t.projects.join(", "))));
                lines.push(Line::raw(format!("  Categories  {}", t.categories.join(", "))));
            }
        }
        _ => {
            lines.push(Line::styled(
                format!("  {:<20} {:>6} {:>10} {:>12}  Trend", "Tag", "Uses", "Time", "Last used"),
                theme.title_style(),
            ));
            for (i, t) in state.tags.iter().enumerate() {
                lines.push(row(
                    format!(
                        "#{:<19} {:>6} {:>10} {:>12}  {}",
                        truncate(&t.tag, 19),
                        t.usage_count,
                        format_minutes(t.total_minutes),
                        t.last_used.format("%Y-%m-%d"),
                        t.trend.arrow()
                    ),
                    i == state.cursor,
                    theme,
                ));
            }
        }
    }
    lines.push(Line::raw(""));
    lines.push(hint_line("enter filter · o sort · v display · r refresh · esc close", theme));
    f.render_widget(Paragraph::new(lines), inner);
}

// ----- rich text ------------------------------------------------------------------

fn rich_text(f: &mut Frame, state: &RichTextState, theme: &Theme, area: Rect) {
    let popup = centered_rect(90, 85, area);
    let inner = modal(f, popup, &format!("Rich Text · {}", state.format), theme);
    let [toolbar, body, footer] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(3), Constraint::Length(1)])
        .areas(inner);

    let mut buttons = Vec::new();
    for (i, (label, _)) in TOOLBAR.iter().enumerate() {
        let style = if state.toolbar == Some(i) {
            theme.selection_style()
        } else {
            theme.muted_style()
        };
        buttons.push(Span::styled(format!("[{label}]"), style));
        buttons.push(Span::raw(" "));
    }
    f.render_widget(Paragraph::new(Line::from(buttons)), toolbar);

    let editor_lines = input_lines("Source", &state.buffer, state.toolbar.is_none(), theme);
    if state.preview {
        let [source, preview] = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .areas(body);
        f.render_widget(Paragraph::new(editor_lines), source);
        let lines = match state.format {
            TextFormat::Markdown => markdown_preview(state.buffer.value(), theme),
            TextFormat::Html | TextFormat::Plain => state
                .buffer
                .value()
                .lines()
                .map(|l| Line::raw(l.to_string()))
                .collect(),
        };
        let mut all = vec![Line::styled("Preview", theme.title_style())];
        all.extend(lines);
        f.render_widget(Paragraph::new(all).wrap(Wrap { trim: false }), preview);
    } else {
        f.render_widget(Paragraph::new(editor_lines), body);
    }
    f.render_widget(
        Paragraph::new(hint_line(
            "ctrl+s save · ctrl+p preview · ctrl+m format · tab toolbar · esc cancel",
            theme,
        )),
        footer,
    );
}

fn markdown_preview(source: &str, theme: &Theme) -> Vec<Line<'static>> {
    preview_lines(source)
        .into_iter()
        .map(|line| match line {
            PreviewLine::Heading(level, text) => Line::styled(
                if level == 1 { text.to_uppercase() } else { text },
                theme.title_style().add_modifier(Modifier::UNDERLINED),
            ),
            PreviewLine::Bullet(text) => Line::raw(format!("  • {text}")),
            PreviewLine::Quote(text) => Line::styled(
                format!("  ▌ {text}"),
                theme.muted_style().add_modifier(Modifier::ITALIC),
            ),
            PreviewLine::Code(text) => Line::styled(
                format!("  {text}"),
                Style::default().fg(theme.success).bg(theme.surface),
            ),
            PreviewLine::Text(text) => Line::raw(text),
        })
        .collect()
}
