//! Markdown editor with a toolbar and a rendered preview.

use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::NewEntry;

use super::super::components::TextInput;
use super::super::effect::{Effect, Transition};
use super::super::state::Session;
use super::Mode;

/// Toolbar buttons: label and the snippet appended to the buffer.
pub const TOOLBAR: [(&str, &str); 6] = [
    ("Bold", "**bold**"),
    ("Italic", "*italic*"),
    ("Code", "`code`"),
    ("Link", "[text](url)"),
    ("List", "- item"),
    ("Quote", "> quote"),
];

/// Preview rendering mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextFormat {
    /// Rendered markdown.
    #[default]
    Markdown,
    /// Raw source labelled as HTML.
    Html,
    /// Raw source.
    Plain,
}

impl TextFormat {
    fn cycle(self) -> Self {
        match self {
            Self::Markdown => Self::Html,
            Self::Html => Self::Plain,
            Self::Plain => Self::Markdown,
        }
    }
}

impl fmt::Display for TextFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Plain => "plain",
        })
    }
}

/// Editor buffer and toolbar focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichTextState {
    /// Source text.
    pub buffer: TextInput,
    /// Whether the preview pane is shown.
    pub preview: bool,
    /// Preview rendering.
    pub format: TextFormat,
    /// Focused toolbar button, `None` while typing.
    pub toolbar: Option<usize>,
}

impl Default for RichTextState {
    fn default() -> Self {
        Self {
            buffer: TextInput::multiline(""),
            preview: false,
            format: TextFormat::default(),
            toolbar: None,
        }
    }
}

/// Editor keys.
pub fn handle(mut state: RichTextState, session: &mut Session, key: &KeyEvent) -> Transition {
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => return Transition::normal(),
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
            if state.buffer.is_blank() {
                session.set_status("cannot save empty entry");
            } else {
                let entry = NewEntry::new("note", state.buffer.value().trim());
                session.notify("Entry saved successfully");
                return Transition::normal().with(Effect::SaveRichText(entry)).reload();
            }
        }
        (KeyModifiers::CONTROL, KeyCode::Char('p')) => state.preview = !state.preview,
        (KeyModifiers::CONTROL, KeyCode::Char('m')) => {
            state.format = state.format.cycle();
            session.notify(format!("Format: {}", state.format));
        }
        (_, KeyCode::Tab) => {
            state.toolbar = match state.toolbar {
                Some(_) => None,
                None => Some(0),
            };
        }
        (_, KeyCode::Left) if state.toolbar.is_some() => {
            state.toolbar = state.toolbar.map(|i| (i + TOOLBAR.len() - 1) % TOOLBAR.len());
        }
        (_, KeyCode::Right) if state.toolbar.is_some() => {
            state.toolbar = state.toolbar.map(|i| (i + 1) % TOOLBAR.len());
        }
        (_, KeyCode::Enter) if state.toolbar.is_some() => {
            if let Some((_, snippet)) = state.toolbar.and_then(|i| TOOLBAR.get(i)) {
                state.buffer.push_str(snippet);
            }
        }
        _ => {
            state.buffer.handle_key(key);
        }
    }
    Transition::to(Mode::RichTextEditor(state))
}

/// One rendered preview line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewLine {
    /// `#` heading with its level.
    Heading(usize, String),
    /// Bullet item.
    Bullet(String),
    /// Block quote.
    Quote(String),
    /// Line inside a fenced code block.
    Code(String),
    /// Anything else.
    Text(String),
}

/// Render markdown source into preview lines. Inline markers are stripped
/// and links show as `text → url`.
pub fn preview_lines(source: &str) -> Vec<PreviewLine> {
    let mut in_code = false;
    let mut out = Vec::new();
    for line in source.lines() {
        if line.trim_start().starts_with("```") {
            in_code = !in_code;
            continue;
        }
        if in_code {
            out.push(PreviewLine::Code(line.to_string()));
            continue;
        }
        let trimmed = line.trim_start();
        let level = trimmed.chars().take_while(|c| *c == '#').count();
        let rendered = if level > 0 && trimmed[level..].starts_with(' ') {
            PreviewLine::Heading(level, strip_inline(trimmed[level..].trim()))
        } else if let Some(rest) = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
            PreviewLine::Bullet(strip_inline(rest))
        } else if let Some(rest) = trimmed.strip_prefix('>') {
            PreviewLine::Quote(strip_inline(rest.trim_start()))
        } else {
            PreviewLine::Text(strip_inline(line))
        };
        out.push(rendered);
    }
    out
}

fn strip_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        let link = after.find("](").and_then(|close| {
            let url_part = &after[close + 2..];
            url_part
                .find(')')
                .map(|end| (&after[..close], &url_part[..end], &url_part[end + 1..]))
        });
        match link {
            Some((label, url, tail)) => {
                out.push_str(&rest[..open]);
                out.push_str(label);
                out.push_str(" → ");
                out.push_str(url);
                rest = tail;
            }
            None => {
                out.push_str(&rest[..=open]);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out.replace("**", "").replace(['*', '`'], "")
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

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_toolbar_appends_snippet() {
        let mut s = session();
        let mut state = RichTextState::default();
        for code in [KeyCode::Tab, KeyCode::Right, KeyCode::Enter] {
            let Mode::RichTextEditor(next) = handle(state, &mut s, &key(code)).mode else {
                panic!("expected editor");
            };
            state = next;
        }
        assert_eq!(state.buffer.value(), "*italic*");
    }

    #[test]
    fn test_save_rejects_blank() {
        let mut s = session();
        let ctrl_s = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        let t = handle(RichTextState::default(), &mut s, &ctrl_s);
        assert!(t.effects.is_empty());
        assert_eq!(s.status.as_deref(), Some("cannot save empty entry"));

        let state = RichTextState {
            buffer: TextInput::multiline("# Title"),
            ..RichTextState::default()
        };
        let t = handle(state, &mut s, &ctrl_s);
        assert_eq!(t.mode, Mode::Normal);
        assert_eq!(
            t.effects[0],
            Effect::SaveRichText(NewEntry::new("note", "# Title"))
        );
    }

    #[test]
    fn test_preview_rendering() {
        let lines = preview_lines("## Plan\n- **ship** it\n> see [docs](http://x)\n```\nlet a;\n```\nplain `code`");
        assert_eq!(
            lines,
            vec![
                PreviewLine::Heading(2, "Plan".into()),
                PreviewLine::Bullet("ship it".into()),
                PreviewLine::Quote("see docs → http://x".into()),
                PreviewLine::Code("let a;".into()),
                PreviewLine::Text("plain code".into()),
            ]
        );
    }
}
