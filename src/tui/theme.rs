//! TUI theming and colors.

use ratatui::style::{Color, Modifier, Style};

/// Application theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Name of the theme.
    pub name: &'static str,
    /// Accent for the top bar, panel titles and focused borders.
    pub primary: Color,
    /// Foreground on top of `primary`.
    pub on_primary: Color,
    /// Body text.
    pub foreground: Color,
    /// Secondary text such as timestamps and hints.
    pub muted: Color,
    /// Border color (unfocused).
    pub border: Color,
    /// Background of the status bar and highlighted rows.
    pub surface: Color,
    /// Selection highlight.
    pub selection: Color,
    /// Error color.
    pub error: Color,
    /// Warning color.
    pub warning: Color,
    /// Success color.
    pub success: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::blue()
    }
}

const TEXT: Color = Color::Rgb(0xcd, 0xd6, 0xf4);
const SUBTEXT: Color = Color::Rgb(0xa6, 0xad, 0xc8);
const OVERLAY: Color = Color::Rgb(0x58, 0x5b, 0x70);
const SURFACE: Color = Color::Rgb(0x31, 0x32, 0x44);
const BASE: Color = Color::Rgb(0x1e, 0x1e, 0x2e);

impl Theme {
    fn with_accent(name: &'static str, primary: Color) -> Self {
        Self {
            name,
            primary,
            on_primary: BASE,
            foreground: TEXT,
            muted: SUBTEXT,
            border: OVERLAY,
            surface: SURFACE,
            selection: SURFACE,
            error: Color::Rgb(0xf3, 0x8b, 0xa8),
            warning: Color::Rgb(0xf9, 0xe2, 0xaf),
            success: Color::Rgb(0xa6, 0xe3, 0xa1),
        }
    }

    /// The default blue theme.
    pub fn blue() -> Self {
        Self::with_accent("default", Color::Rgb(0x89, 0xb4, 0xfa))
    }

    /// Green accent.
    pub fn green() -> Self {
        Self::with_accent("green", Color::Rgb(0xa6, 0xe3, 0xa1))
    }

    /// Purple accent.
    pub fn purple() -> Self {
        Self::with_accent("purple", Color::Rgb(0xcb, 0xa6, 0xf7))
    }

    /// Every theme in `ctrl+t` order.
    pub fn all() -> [Self; 3] {
        [Self::blue(), Self::green(), Self::purple()]
    }

    /// Index of the theme called `name`, if any.
    pub fn index_of(name: &str) -> Option<usize> {
        let name = name.trim().to_lowercase();
        let name = if name == "blue" { "default".to_string() } else { name };
        Self::all().iter().position(|t| t.name == name)
    }

    /// Theme at `index`, wrapping around.
    pub fn at(index: usize) -> Self {
        let themes = Self::all();
        themes[index % themes.len()].clone()
    }

    /// Display name.
    pub fn title(&self) -> &'static str {
        match self.name {
            "green" => "Green",
            "purple" => "Purple",
            _ => "Default",
        }
    }

    /// Style for borders (unfocused).
    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Style for focused borders.
    pub fn border_focused_style(&self) -> Style {
        Style::default().fg(self.primary)
    }

    /// Border style for a pane.
    pub fn border_for(&self, focused: bool) -> Style {
        if focused {
            self.border_focused_style()
        } else {
            self.border_style()
        }
    }

    /// Style for panel titles.
    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for the top bar.
    pub fn top_bar_style(&self) -> Style {
        Style::default()
            .fg(self.on_primary)
            .bg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for the status bar.
    pub fn status_bar_style(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.surface)
    }

    /// Style for selected items.
    pub fn selection_style(&self) -> Style {
        Style::default()
            .bg(self.selection)
            .fg(self.foreground)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for secondary text.
    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Style for errors.
    pub fn error_style(&self) -> Style {
        Style::default()
            .fg(self.error)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for success.
    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success)
    }
}

/// Badge color for a category.
pub fn category_color(category: &str) -> Color {
    match category.to_lowercase().as_str() {
        "task" => Color::Rgb(0xf9, 0xe2, 0xaf),
        "meeting" => Color::Rgb(0xf5, 0xc2, 0xe7),
        "timer" => Color::Rgb(0xa6, 0xe3, 0xa1),
        "note" => Color::Rgb(0x89, 0xb4, 0xfa),
        _ => Color::Rgb(0x94, 0xe2, 0xd5),
    }
}

/// Available themes list.
pub fn available_themes() -> Vec<&'static str> {
    Theme::all().iter().map(|t| t.name).collect()
}
