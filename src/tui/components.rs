//! Reusable TUI components.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::theme::Theme;

/// A single-line (or, with [`TextInput::multiline`], multi-line) text
/// buffer with a cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    /// Cursor position in characters.
    cursor: usize,
    multiline: bool,
}

impl TextInput {
    /// An input holding `value` with the cursor at the end.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            cursor: value.chars().count(),
            value,
            multiline: false,
        }
    }

    /// An input that accepts Enter as a newline.
    pub fn multiline(value: impl Into<String>) -> Self {
        Self {
            multiline: true,
            ..Self::new(value)
        }
    }

    /// Current text.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the text and move the cursor to the end.
    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.chars().count();
    }

    /// Empty the buffer.
    pub fn clear(&mut self) {
        self.set(String::new());
    }

    /// Whether the text is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Append text at the end.
    pub fn push_str(&mut self, text: &str) {
        self.value.push_str(text);
        self.cursor = self.value.chars().count();
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.value
            .char_indices()
            .nth(chars)
            .map_or(self.value.len(), |(i, _)| i)
    }

    /// Insert a character at the cursor.
    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Apply an editing key. Returns whether the key was consumed.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        match key.code {
            KeyCode::Char(c) if !ctrl && !alt => self.insert(c),
            KeyCode::Char('u') if ctrl => self.clear(),
            KeyCode::Enter if self.multiline => self.insert('\n'),
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.value.chars().count() {
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.value.chars().count()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.value.chars().count(),
            _ => return false,
        }
        true
    }

    /// Spans of the text with a block cursor when `focused`.
    pub fn spans(&self, focused: bool, theme: &Theme) -> Vec<Span<'static>> {
        if !focused {
            return vec![Span::styled(
                self.value.clone(),
                Style::default().fg(theme.foreground),
            )];
        }
        let at = self.byte_index(self.cursor);
        let (before, after) = self.value.split_at(at);
        let mut rest = after.chars();
        let under = rest.next().filter(|c| *c != '\n').map_or(" ".to_string(), String::from);
        vec![
            Span::styled(before.to_string(), Style::default().fg(theme.foreground)),
            Span::styled(under, Style::default().fg(theme.on_primary).bg(theme.primary)),
            Span::styled(rest.collect::<String>(), Style::default().fg(theme.foreground)),
        ]
    }
}

/// `Label: value` line for a form field.
pub fn field_line(label: &str, input: &TextInput, focused: bool, theme: &Theme) -> Line<'static> {
    let marker = if focused { "› " } else { "  " };
    let label_style = if focused {
        theme.title_style()
    } else {
        theme.muted_style()
    };
    let mut spans = vec![
        Span::styled(format!("{marker}{label:<12}"), label_style),
    ];
    spans.extend(input.spans(focused, theme));
    Line::from(spans)
}

/// Completion list shown under a form input.
///
/// Results are tagged with the query they answer; [`Suggestions::fill`]
/// drops any that no longer match the latest request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suggestions {
    items: Vec<String>,
    selected: usize,
    query: String,
}

impl Suggestions {
    /// Whether there is a list to show.
    pub fn is_showing(&self) -> bool {
        !self.items.is_empty()
    }

    /// Current candidates.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Index of the highlighted candidate.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Record that candidates for `query` were asked for.
    pub fn request(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Install candidates fetched for `query`. Returns whether they were
    /// still wanted.
    pub fn fill(&mut self, query: &str, items: Vec<String>) -> bool {
        if query != self.query {
            return false;
        }
        self.items = items;
        self.selected = 0;
        true
    }

    /// Highlight the next candidate, wrapping.
    pub fn next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1) % self.items.len();
        }
    }

    /// Highlight the previous candidate, wrapping.
    pub fn prev(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + self.items.len() - 1) % self.items.len();
        }
    }

    /// Hide the list and forget the pending query.
    pub fn dismiss(&mut self) {
        self.items.clear();
        self.selected = 0;
        self.query.clear();
    }

    /// Take the highlighted candidate and hide the list.
    pub fn accept(&mut self) -> Option<String> {
        let item = self.items.get(self.selected).cloned();
        self.dismiss();
        item
    }

    /// Indented rows for rendering under the input.
    pub fn lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                if i == self.selected {
                    Line::styled(format!("              ▸ {item}"), theme.selection_style())
                } else {
                    Line::styled(format!("                {item}"), theme.muted_style())
                }
            })
            .collect()
    }
}

/// A status bar component.
pub struct StatusBar<'a> {
    left: Vec<Span<'a>>,
    right: Vec<Span<'a>>,
}

impl<'a> StatusBar<'a> {
    /// Create a new status bar.
    pub fn new() -> Self {
        Self {
            left: Vec::new(),
            right: Vec::new(),
        }
    }

    /// Add left-aligned content.
    pub fn left(mut self, spans: Vec<Span<'a>>) -> Self {
        self.left = spans;
        self
    }

    /// Add right-aligned content.
    pub fn right(mut self, spans: Vec<Span<'a>>) -> Self {
        self.right = spans;
        self
    }

    /// Render the status bar.
    pub fn render(self, f: &mut Frame, area: Rect, style: Style) {
        let left_width: usize = self.left.iter().map(Span::width).sum();
        let right_width: usize = self.right.iter().map(Span::width).sum();
        let padding = usize::from(area.width).saturating_sub(left_width + right_width);

        let mut spans = self.left;
        spans.push(Span::raw(" ".repeat(padding.max(1))));
        spans.extend(self.right);

        f.render_widget(Paragraph::new(Line::from(spans)).style(style), area);
    }
}

impl Default for StatusBar<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper function to create a centered rect.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Clear `area` and draw a titled modal frame; returns the inner area.
pub fn modal(f: &mut Frame, area: Rect, title: &str, theme: &Theme) -> Rect {
    let block = Block::default()
        .title(Span::styled(format!(" {title} "), theme.title_style()))
        .borders(Borders::ALL)
        .border_style(theme.border_focused_style());
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);
    inner
}

/// Dimmed hint line, e.g. key help at the bottom of a modal.
pub fn hint_line(text: &str, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        theme.muted_style().add_modifier(Modifier::ITALIC),
    ))
}
