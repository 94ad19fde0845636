//! Single-row bars above and below the panels.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::components::{hint_line, StatusBar};
use crate::tui::modes::Mode;
use crate::tui::state::Session;
use crate::tui::theme::category_color;

const SEPARATOR: &str = " │ ";

const QUICK_ACTIONS: &str =
    "n new  r reply  e edit  d delete  / search  t scope  v view  tab focus  ctrl+k commands  ? help  q quit";

/// `pulse │ scope │ N threads │ filters │ countdown │ clock`.
pub(super) fn top_bar(f: &mut Frame, session: &Session, area: Rect) {
    let theme = session.theme();
    let mut parts = vec![
        session.scope.to_string(),
        format!("{} threads", session.blocks.len()),
    ];
    let filters = filter_summary(session);
    if !filters.is_empty() {
        parts.push(filters);
    }
    if session.pomodoro.active {
        parts.push(format!("🍅 {}", session.pomodoro.label()));
    }
    parts.push(session.now.format("%H:%M:%S").to_string());

    let line = Line::from(vec![
        Span::styled(" pulse", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(SEPARATOR),
        Span::raw(parts.join(SEPARATOR)),
    ]);
    f.render_widget(Paragraph::new(line).style(theme.top_bar_style()), area);
}

fn filter_summary(session: &Session) -> String {
    let filter = &session.filter;
    let mut parts = Vec::new();
    if !filter.text.is_empty() {
        parts.push(format!("/{}", filter.text));
    }
    if let Some(project) = &filter.project {
        parts.push(format!("@{project}"));
    }
    if let Some(category) = &filter.category {
        parts.push(category.clone());
    }
    if !filter.tags.is_empty() {
        let joiner = if filter.any_tags { " | " } else { " " };
        let tags: Vec<String> = filter.tags.iter().map(|t| format!("#{t}")).collect();
        parts.push(tags.join(joiner));
    }
    parts.join(" ")
}

/// Loaded counts per category plus the active view and ordering.
pub(super) fn summary_line(f: &mut Frame, session: &Session, area: Rect) {
    let theme = session.theme();
    let mut spans = vec![Span::raw(" ")];
    for (category, count) in session.category_counts() {
        spans.push(Span::styled(
            format!("{category} {count}"),
            Style::default().fg(category_color(category)),
        ));
        spans.push(Span::raw("  "));
    }
    let arrow = if session.descending { "↓" } else { "↑" };
    spans.push(Span::styled(
        format!("· {} view · sort {} {arrow}", session.view, session.sort),
        theme.muted_style(),
    ));
    if !session.bookmarks.is_empty() {
        spans.push(Span::styled(
            format!(" · ★ {}", session.bookmarks.len()),
            theme.muted_style(),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Key hints, or the input line of the live search and since modes.
pub(super) fn quick_actions(f: &mut Frame, session: &Session, area: Rect) {
    let theme = session.theme();
    let line = match &session.mode {
        Mode::Search => Line::from(vec![
            Span::styled(" / ", theme.title_style()),
            Span::raw(session.filter.text.clone()),
            Span::styled(" ", Style::default().bg(theme.primary)),
            Span::styled("  enter keep · esc clear", theme.muted_style()),
        ]),
        Mode::Since(state) => {
            let mut spans = vec![Span::styled(" since: ", theme.title_style())];
            spans.extend(state.input.spans(true, &theme));
            spans.push(Span::styled(
                "  e.g. yesterday, 3d, 2025-06-01 09:00",
                theme.muted_style(),
            ));
            Line::from(spans)
        }
        Mode::Focus(_) => hint_line(" focus mode · j/k move · esc or ctrl+f leave", &theme),
        _ => hint_line(&format!(" {QUICK_ACTIONS}"), &theme),
    };
    f.render_widget(Paragraph::new(line), area);
}

/// Last message on the left, focus and mode on the right.
pub(super) fn status_bar(f: &mut Frame, session: &Session, area: Rect) {
    let theme = session.theme();
    let left = match &session.status {
        Some(message) => vec![Span::raw(format!(" {message}"))],
        None => vec![Span::styled(" Ready", theme.muted_style())],
    };
    let right = vec![Span::styled(
        format!("Focus: {} | {} ", session.focus, session.mode.label()),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    StatusBar::new()
        .left(left)
        .right(right)
        .render(f, area, theme.status_bar_style());
}
