//! Filter sidebar and thread pane.

use chrono::Utc;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block as Panel, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::state::{Focus, Section, Session};
use crate::tui::theme::category_color;
use crate::util::{format_clock_time, format_relative_time, truncate};

const SECTIONS: [(Section, &str); 3] = [
    (Section::Projects, "Projects"),
    (Section::Categories, "Categories"),
    (Section::Tags, "Tags"),
];

/// Projects, categories and tags with counts. Active filters are marked.
pub(super) fn sidebar(f: &mut Frame, session: &Session, area: Rect) {
    let theme = session.theme();
    let focused = session.focus == Focus::Sidebar;
    let width = usize::from(area.width.saturating_sub(10));

    let mut lines = Vec::new();
    let mut cursor_line = 0;
    for (section, title) in SECTIONS {
        let items = session.section_items(section);
        lines.push(Line::styled(
            format!("{title} ({})", items.len()),
            theme.title_style(),
        ));
        if items.is_empty() {
            lines.push(Line::styled("  none", theme.muted_style()));
        }
        for (i, item) in items.iter().enumerate() {
            let active = match section {
                Section::Projects => session.filter.project.as_deref() == Some(item.label.as_str()),
                Section::Categories => session
                    .filter
                    .category
                    .as_deref()
                    .is_some_and(|c| c.eq_ignore_ascii_case(&item.label)),
                Section::Tags => session.filter.tags.contains(&item.label),
            };
            let marker = if active { "● " } else { "  " };
            let label = match section {
                Section::Tags => format!("#{}", item.label),
                _ => item.label.clone(),
            };
            let label_style = match section {
                Section::Categories => Style::default().fg(category_color(&item.label)),
                _ if active => theme.success_style(),
                _ => Style::default(),
            };
            let mut line = Line::from(vec![
                Span::raw(marker),
                Span::styled(truncate(&label, width), label_style),
                Span::styled(format!(" {}", item.count), theme.muted_style()),
            ]);
            if focused && session.sidebar.section == section && session.sidebar.index == i {
                line = line.style(theme.selection_style());
                cursor_line = lines.len();
            }
            lines.push(line);
        }
        lines.push(Line::raw(""));
    }

    let visible = usize::from(area.height.saturating_sub(2));
    let scroll = cursor_line.saturating_sub(visible.saturating_sub(1));
    let panel = Panel::default()
        .title(Span::styled(" Filters ", theme.title_style()))
        .borders(Borders::ALL)
        .border_style(theme.border_for(focused));
    f.render_widget(
        Paragraph::new(lines)
            .block(panel)
            .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0)),
        area,
    );
}

/// Every entry of the block under the cursor, full text.
pub(super) fn thread(f: &mut Frame, session: &Session, area: Rect) {
    let theme = session.theme();
    let focused = session.focus == Focus::Thread;
    let Some(block) = session.current_block() else {
        let panel = Panel::default()
            .title(" Thread ")
            .borders(Borders::ALL)
            .border_style(theme.border_for(focused));
        f.render_widget(
            Paragraph::new(Line::styled("Nothing selected", theme.muted_style())).block(panel),
            area,
        );
        return;
    };

    let now_utc = session.now.with_timezone(&Utc);
    let mut lines = Vec::new();
    for (i, entry) in block.entries.iter().enumerate() {
        let header_style = if i == session.cursor.entry {
            theme.selection_style()
        } else {
            theme.title_style()
        };
        let prefix = if i == 0 { "●" } else { "↳" };
        lines.push(Line::from(vec![
            Span::styled(
                format!(
                    "{prefix} #{} {} ({})",
                    entry.id,
                    format_clock_time(session.zone.localize(entry.timestamp), session.now),
                    format_relative_time(entry.timestamp, now_utc)
                ),
                header_style,
            ),
            Span::styled(
                format!(" {}", entry.category),
                Style::default().fg(category_color(&entry.category)),
            ),
        ]));
        for text_line in entry.text.lines() {
            lines.push(Line::raw(format!("  {text_line}")));
        }
        let mut meta = Vec::new();
        if !entry.project_str().is_empty() {
            meta.push(format!("@{}", entry.project_str()));
        }
        meta.extend(entry.tags.iter().map(|t| format!("#{t}")));
        if !meta.is_empty() {
            lines.push(Line::styled(
                format!("  {}", meta.join(" ")),
                theme.muted_style().add_modifier(Modifier::ITALIC),
            ));
        }
        lines.push(Line::raw(""));
    }

    let title = format!(
        " Thread #{} · {} replies ",
        block.root_id,
        block.reply_count()
    );
    let panel = Panel::default()
        .title(Span::styled(title, theme.title_style()))
        .borders(Borders::ALL)
        .border_style(theme.border_for(focused));
    f.render_widget(
        Paragraph::new(lines).block(panel).wrap(Wrap { trim: false }),
        area,
    );
}
