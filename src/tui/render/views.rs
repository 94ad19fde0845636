//! The four main-panel layouts.
//!
//! Each view asks the session for its page size at the current height and
//! draws only the window its own [`Viewport`](crate::tui::viewport::Viewport)
//! selects.

use chrono::{Datelike, NaiveDate, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block as Panel, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::model::Entry;
use crate::timeline::{flatten, kanban_columns};
use crate::tui::state::{Session, ViewMode};
use crate::tui::theme::{category_color, Theme};
use crate::tui::viewport::{kanban_page, Viewport, CARD_HEIGHT};
use crate::util::{format_clock_time, format_relative_time, truncate, wrap_text};

/// Bordered panel titled with the view name and the visible window.
fn panel(session: &Session, focused: bool, range: Option<(usize, usize, usize)>) -> Panel<'static> {
    let theme = session.theme();
    let mut title = format!(" {} ", session.view);
    if let Some((start, end, total)) = range {
        title.push_str(&format!("[{}-{} of {total}] ", start + 1, end));
    }
    Panel::default()
        .title(Span::styled(title, theme.title_style()))
        .borders(Borders::ALL)
        .border_style(theme.border_for(focused))
}

/// Window shown in the title, only when the list does not fit.
fn window(viewport: &Viewport, page: usize, total: usize) -> Option<(usize, usize, usize)> {
    if !Viewport::is_scrollable(page, total) {
        return None;
    }
    let range = viewport.range(page, total);
    Some((range.start, range.end, total))
}

fn empty(f: &mut Frame, session: &Session, area: Rect, focused: bool) {
    let theme = session.theme();
    let lines = vec![
        Line::raw(""),
        Line::styled(
            format!("  No entries in {}.", session.scope),
            theme.muted_style(),
        ),
        Line::styled("  Press n to create one, t to widen the scope.", theme.muted_style()),
    ];
    f.render_widget(Paragraph::new(lines).block(panel(session, focused, None)), area);
}

/// `[TASK]` badge in the category color.
fn badge(category: &str) -> Span<'static> {
    Span::styled(
        format!("[{}]", category.to_uppercase()),
        Style::default()
            .fg(category_color(category))
            .add_modifier(Modifier::BOLD),
    )
}

/// `@project #tag #tag` chips.
fn chips(entry: &Entry, theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    if let Some(project) = entry.project.as_deref().filter(|p| !p.is_empty()) {
        spans.push(Span::styled(
            format!(" @{project}"),
            Style::default().fg(theme.primary),
        ));
    }
    for tag in &entry.tags {
        spans.push(Span::styled(format!(" #{tag}"), theme.muted_style()));
    }
    if let Some(minutes) = entry.duration_minutes {
        spans.push(Span::styled(format!(" ⏱ {minutes}m"), theme.muted_style()));
    }
    spans
}

fn clock(session: &Session, entry: &Entry) -> String {
    format_clock_time(session.zone.localize(entry.timestamp), session.now)
}

fn age(session: &Session, entry: &Entry) -> String {
    format_relative_time(entry.timestamp, session.now.with_timezone(&Utc))
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}

// ----- timeline -------------------------------------------------------------

/// Threads with tree glyphs, grouped under month and day separators.
pub(super) fn timeline(f: &mut Frame, session: &Session, area: Rect, focused: bool) {
    if session.blocks.is_empty() {
        return empty(f, session, area, focused);
    }
    let theme = session.theme();
    let page = session.page(ViewMode::Timeline);
    let total = session.blocks.len();
    let range = session.viewports.timeline.range(page, total);
    let text_width = usize::from(area.width).saturating_sub(44).max(12);

    let mut lines: Vec<Line> = Vec::new();
    let mut last_day: Option<NaiveDate> = None;
    for index in range.clone() {
        let block = &session.blocks[index];
        let day = session.zone.localize(block.latest).date_naive();
        if last_day.map(|d| (d.year(), d.month())) != Some((day.year(), day.month())) {
            lines.push(Line::styled(
                format!("══ {} ══", day.format("%B %Y")),
                theme.title_style(),
            ));
        }
        if last_day != Some(day) {
            lines.push(Line::styled(
                format!("── {} ──", day.format("%a, %b %d")),
                theme.muted_style(),
            ));
            last_day = Some(day);
        }

        let last = block.entries.len().saturating_sub(1);
        for (i, entry) in block.entries.iter().enumerate() {
            let glyph = match i {
                0 => "● ",
                i if i == last => "└─ ",
                _ => "├─ ",
            };
            let mark = if session.bookmarks.contains(&entry.id) { "★" } else { " " };
            let mut spans = vec![
                Span::raw(format!("{mark}{glyph}")),
                Span::styled(format!("{} ", clock(session, entry)), theme.title_style()),
                Span::styled(format!("{:<9}", age(session, entry)), theme.muted_style()),
                badge(&entry.category),
                Span::raw(format!(" {}", truncate(first_line(&entry.text), text_width))),
            ];
            spans.extend(chips(entry, &theme));
            if i == 0 && block.reply_count() > 0 {
                spans.push(Span::styled(
                    format!("  💬 {}", block.reply_count()),
                    theme.muted_style(),
                ));
            }
            let mut line = Line::from(spans);
            if focused && session.cursor.block == index && session.cursor.entry == i {
                line = line.style(theme.selection_style());
            }
            lines.push(line);
        }
        lines.push(Line::raw(""));
    }

    let title = window(&session.viewports.timeline, page, total);
    f.render_widget(Paragraph::new(lines).block(panel(session, focused, title)), area);
}

// ----- cards ----------------------------------------------------------------

/// One bordered card per entry over the flattened list.
pub(super) fn cards(f: &mut Frame, session: &Session, area: Rect, focused: bool) {
    if session.blocks.is_empty() {
        return empty(f, session, area, focused);
    }
    let theme = session.theme();
    let flat = flatten(&session.blocks);
    let page = session.page(ViewMode::Cards);
    let range = session.viewports.cards.range(page, flat.len());
    let cursor = session.cursor_flat();

    let outer = panel(session, focused, window(&session.viewports.cards, page, flat.len()));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let mut constraints: Vec<Constraint> = range
        .clone()
        .map(|_| Constraint::Length(CARD_HEIGHT as u16))
        .collect();
    constraints.push(Constraint::Min(0));
    let slots = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let body_rows = CARD_HEIGHT - 4;
    for (slot, index) in slots.iter().zip(range) {
        let ((_, entry_index), entry) = flat[index];
        let selected = focused && index == cursor;
        let kind = if entry_index == 0 { "" } else { " ↳ reply" };
        let card = Panel::default()
            .title(Span::styled(
                format!(" #{}{kind} ", entry.id),
                Style::default().fg(category_color(&entry.category)),
            ))
            .borders(Borders::ALL)
            .border_style(if selected {
                theme.border_focused_style()
            } else {
                theme.border_style()
            });

        let mut lines = vec![Line::from(vec![
            badge(&entry.category),
            Span::styled(format!(" {}", clock(session, entry)), theme.title_style()),
            Span::styled(format!(" · {}", age(session, entry)), theme.muted_style()),
        ])];
        let width = usize::from(slot.width.saturating_sub(2));
        let mut body = wrap_text(&entry.text, width);
        if body.len() > body_rows {
            body.truncate(body_rows);
            if let Some(last) = body.last_mut() {
                *last = truncate(&format!("{last} ..."), width);
            }
        }
        lines.extend(body.into_iter().map(Line::raw));
        lines.push(Line::from(chips(entry, &theme)));

        let mut paragraph = Paragraph::new(lines).block(card);
        if selected {
            paragraph = paragraph.style(Style::default().bg(theme.selection));
        }
        f.render_widget(paragraph, *slot);
    }
}

// ----- table ----------------------------------------------------------------

/// Fixed-width columns over the flattened list.
pub(super) fn table(f: &mut Frame, session: &Session, area: Rect, focused: bool) {
    if session.blocks.is_empty() {
        return empty(f, session, area, focused);
    }
    let theme = session.theme();
    let flat = flatten(&session.blocks);
    let page = session.page(ViewMode::Table);
    let range = session.viewports.table.range(page, flat.len());
    let cursor = session.cursor_flat();

    let header = Row::new(["When", "Category", "Project", "Tags", "Content"])
        .style(theme.title_style())
        .bottom_margin(1);
    let rows: Vec<Row> = range
        .map(|index| {
            let (_, entry) = flat[index];
            let local = session.zone.localize(entry.timestamp);
            let tags: Vec<String> = entry.tags.iter().map(|t| format!("#{t}")).collect();
            let row = Row::new(vec![
                Cell::from(local.format("%m-%d %H:%M").to_string()),
                Cell::from(Span::styled(
                    entry.category.clone(),
                    Style::default().fg(category_color(&entry.category)),
                )),
                Cell::from(truncate(entry.project_str(), 14)),
                Cell::from(truncate(&tags.join(" "), 18)),
                Cell::from(truncate(first_line(&entry.text), 60)),
            ]);
            if focused && index == cursor {
                row.style(theme.selection_style())
            } else {
                row
            }
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(14),
        Constraint::Length(18),
        Constraint::Min(10),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(panel(session, focused, window(&session.viewports.table, page, flat.len())));
    f.render_widget(table, area);
}

// ----- kanban ---------------------------------------------------------------

/// One column per category, scrolled in both directions.
pub(super) fn kanban(f: &mut Frame, session: &Session, area: Rect, focused: bool) {
    if session.blocks.is_empty() {
        return empty(f, session, area, focused);
    }
    let theme = session.theme();
    let columns = kanban_columns(&session.blocks);
    let column_page = kanban_page(columns.len());
    let visible = session
        .viewports
        .kanban_columns
        .range(column_page, columns.len());
    let tallest = columns.iter().map(|c| c.entries.len()).max().unwrap_or(0);
    let row_page = session.page(ViewMode::Kanban);
    let rows = session.viewports.kanban_rows.range(row_page, tallest);
    let cursor_id = session.current_entry().map(|e| e.id);

    let outer = panel(session, focused, None);
    let inner = outer.inner(area);
    f.render_widget(outer, area);
    let [body, footer] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .areas(inner);

    let count = visible.len().max(1) as u32;
    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints((0..count).map(|_| Constraint::Ratio(1, count)))
        .split(body);

    for (slot, column) in slots.iter().zip(&columns[visible.clone()]) {
        let color = category_color(&column.category);
        let frame = Panel::default()
            .title(Span::styled(
                format!(" {} ({}) ", column.category.to_uppercase(), column.entries.len()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color));
        let width = usize::from(slot.width.saturating_sub(2));
        let start = rows.start.min(column.entries.len());
        let end = rows.end.min(column.entries.len());

        let mut lines = Vec::new();
        for entry in &column.entries[start..end] {
            let style = if focused && Some(entry.id) == cursor_id {
                theme.selection_style()
            } else {
                Style::default()
            };
            lines.push(
                Line::from(vec![
                    Span::styled(format!("#{} ", entry.id), theme.muted_style()),
                    Span::raw(clock(session, entry)),
                ])
                .style(style),
            );
            lines.push(Line::raw(truncate(first_line(&entry.text), width)).style(style));
            lines.push(Line::from(chips(entry, &theme)));
        }
        f.render_widget(Paragraph::new(lines).block(frame), *slot);
    }

    let mut hints = Vec::new();
    if Viewport::is_scrollable(column_page, columns.len()) {
        hints.push(format!(
            "columns {}-{} of {} · h/l scroll",
            visible.start + 1,
            visible.end,
            columns.len()
        ));
    }
    if Viewport::is_scrollable(row_page, tallest) {
        hints.push(format!("rows {}-{} of {tallest}", rows.start + 1, rows.end));
    }
    f.render_widget(
        Paragraph::new(Line::styled(hints.join("  "), theme.muted_style())),
        footer,
    );
}
