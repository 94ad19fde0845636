//! Interactive session state.
//!
//! [`Session`] owns everything the terminal shows: the active mode, pane
//! focus, scope and filter, the loaded blocks and facets, the cursor and one
//! [`Viewport`] per view. It is created once at launch from an explicit
//! [`Config`] and mutated only by mode handlers and by the executor applying
//! effect results.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use chrono::{DateTime, FixedOffset};

use crate::config::{Config, Zone};
use crate::error::Result;
use crate::model::{Entry, FacetItem, NewEntry, CANONICAL_CATEGORIES};
use crate::store::Facets;
use crate::templates::Library;
use crate::timeline::{
    flat_index, kanban_columns, position_of, sort_blocks, Block, Filter, Scope, SortKey,
};

use super::effect::Effect;
use super::modes::Mode;
use super::pomodoro::{Completion, Pomodoro};
use super::theme::Theme;
use super::viewport::{kanban_page, page_size, Viewport, CHROME_ROWS};

/// Notifications kept for the dashboard.
const MAX_NOTIFICATIONS: usize = 5;

/// Which pane receives movement keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    /// The main view.
    #[default]
    Timeline,
    /// Filter sidebar.
    Sidebar,
    /// Thread pane.
    Thread,
}

impl fmt::Display for Focus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Timeline => "Timeline",
            Self::Sidebar => "Sidebar",
            Self::Thread => "Thread",
        })
    }
}

/// How the main panel lays out the loaded blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ViewMode {
    /// Threads with tree glyphs and day separators.
    #[default]
    Timeline,
    /// One bordered card per entry.
    Cards,
    /// One row per entry.
    Table,
    /// One column per category.
    Kanban,
}

impl ViewMode {
    /// Next view in the `v` cycle.
    pub fn cycle(self) -> Self {
        match self {
            Self::Timeline => Self::Cards,
            Self::Cards => Self::Table,
            Self::Table => Self::Kanban,
            Self::Kanban => Self::Timeline,
        }
    }

    /// View named in the configuration.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "timeline" => Some(Self::Timeline),
            "cards" => Some(Self::Cards),
            "table" => Some(Self::Table),
            "kanban" => Some(Self::Kanban),
            _ => None,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Timeline => "Timeline",
            Self::Cards => "Cards",
            Self::Table => "Table",
            Self::Kanban => "Kanban",
        })
    }
}

/// Sidebar sections, top to bottom.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Section {
    /// Projects.
    #[default]
    Projects,
    /// Categories.
    Categories,
    /// Tags.
    Tags,
}

impl Section {
    fn next(self) -> Option<Self> {
        match self {
            Self::Projects => Some(Self::Categories),
            Self::Categories => Some(Self::Tags),
            Self::Tags => None,
        }
    }

    fn prev(self) -> Option<Self> {
        match self {
            Self::Projects => None,
            Self::Categories => Some(Self::Projects),
            Self::Tags => Some(Self::Categories),
        }
    }
}

/// Cursor into the block list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Block index.
    pub block: usize,
    /// Entry index within the block.
    pub entry: usize,
}

/// Cursor inside the sidebar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SidebarCursor {
    /// Current section.
    pub section: Section,
    /// Item within the section.
    pub index: usize,
}

/// One scroll window per view. Kanban scrolls in two directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewports {
    /// Blocks of the timeline view.
    pub timeline: Viewport,
    /// Cards over the flattened entries.
    pub cards: Viewport,
    /// Table rows over the flattened entries.
    pub table: Viewport,
    /// Visible kanban columns.
    pub kanban_columns: Viewport,
    /// Cards within the visible kanban columns.
    pub kanban_rows: Viewport,
}

/// A timeline query to run, tagged with the generation it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct ReloadRequest {
    /// Generation counter value at request time.
    pub generation: u64,
    /// Scope to load.
    pub scope: Scope,
    /// Filter to apply.
    pub filter: Filter,
    /// Reference instant for the scope.
    pub now: DateTime<FixedOffset>,
}

/// The live interactive state.
#[derive(Debug)]
pub struct Session {
    /// Resolved configuration.
    pub config: Config,
    /// Display and scope timezone.
    pub zone: Zone,
    /// Active mode.
    pub mode: Mode,
    /// Focused pane.
    pub focus: Focus,
    /// Main panel layout.
    pub view: ViewMode,
    /// Time window.
    pub scope: Scope,
    /// Active filters.
    pub filter: Filter,
    /// Block ordering.
    pub sort: SortKey,
    /// Whether the ordering is reversed.
    pub descending: bool,
    /// Loaded blocks.
    pub blocks: Vec<Block>,
    /// Loaded facets.
    pub facets: Facets,
    /// Timeline cursor.
    pub cursor: Cursor,
    /// Scroll windows.
    pub viewports: Viewports,
    /// Sidebar cursor.
    pub sidebar: SidebarCursor,
    /// Sidebar visibility.
    pub show_sidebar: bool,
    /// Thread pane visibility.
    pub show_thread: bool,
    /// Last status message.
    pub status: Option<String>,
    /// Recent notifications, oldest first.
    pub notifications: VecDeque<String>,
    /// Bookmarked entry ids, kept for this session only.
    pub bookmarks: BTreeSet<i64>,
    /// Work/break countdown.
    pub pomodoro: Pomodoro,
    /// Template library.
    pub templates: Library,
    /// Index of the active theme.
    pub theme: usize,
    /// Current time, advanced by the tick source.
    pub now: DateTime<FixedOffset>,
    /// Terminal width.
    pub width: u16,
    /// Terminal height.
    pub height: u16,
    generation: u64,
}

impl Session {
    /// Fresh state: today scope, no filters, normal mode.
    pub fn new(config: Config, now: DateTime<FixedOffset>) -> Self {
        let zone = config.zone();
        let view = ViewMode::from_name(&config.display.default_view).unwrap_or_default();
        let theme = Theme::index_of(&config.theme).unwrap_or(0);
        Self {
            zone,
            mode: Mode::Normal,
            focus: Focus::Timeline,
            view,
            scope: Scope::Today,
            filter: Filter::default(),
            sort: SortKey::Date,
            descending: true,
            blocks: Vec::new(),
            facets: Facets::default(),
            cursor: Cursor::default(),
            viewports: Viewports::default(),
            sidebar: SidebarCursor::default(),
            show_sidebar: config.display.show_sidebar,
            show_thread: false,
            status: None,
            notifications: VecDeque::new(),
            bookmarks: BTreeSet::new(),
            pomodoro: Pomodoro::new(&config.pomodoro),
            templates: Library::new(Vec::new()),
            theme,
            now,
            width: 80,
            height: 24,
            generation: 0,
            config,
        }
    }

    /// Active theme.
    pub fn theme(&self) -> Theme {
        Theme::at(self.theme)
    }

    // ----- geometry -------------------------------------------------------

    /// Record a new terminal size and pull the viewports back in range.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.clamp_viewports();
    }

    /// Rows available to the main panel.
    pub fn panel_height(&self) -> u16 {
        self.height.saturating_sub(CHROME_ROWS)
    }

    /// Items per page of `view` at the current size.
    pub fn page(&self, view: ViewMode) -> usize {
        page_size(view, self.panel_height())
    }

    // ----- cursor ---------------------------------------------------------

    /// Total entries across the loaded blocks.
    pub fn entry_count(&self) -> usize {
        self.blocks.iter().map(|b| b.entries.len()).sum()
    }

    /// Block under the cursor.
    pub fn current_block(&self) -> Option<&Block> {
        self.blocks.get(self.cursor.block)
    }

    /// Entry under the cursor.
    pub fn current_entry(&self) -> Option<&Entry> {
        self.current_block()
            .and_then(|b| b.entries.get(self.cursor.entry))
    }

    /// Flat index of the cursor.
    pub fn cursor_flat(&self) -> usize {
        flat_index(&self.blocks, self.cursor.block, self.cursor.entry)
    }

    /// Move down one entry, crossing into the next block at the end.
    pub fn cursor_down(&mut self) {
        let Some(block) = self.current_block() else {
            return;
        };
        if self.cursor.entry + 1 < block.entries.len() {
            self.cursor.entry += 1;
        } else if self.cursor.block + 1 < self.blocks.len() {
            self.cursor.block += 1;
            self.cursor.entry = 0;
        }
        self.follow_cursor();
    }

    /// Move up one entry, crossing into the previous block's last entry.
    pub fn cursor_up(&mut self) {
        if self.blocks.is_empty() {
            return;
        }
        if self.cursor.entry > 0 {
            self.cursor.entry -= 1;
        } else if self.cursor.block > 0 {
            self.cursor.block -= 1;
            self.cursor.entry = self.blocks[self.cursor.block].entries.len().saturating_sub(1);
        }
        self.follow_cursor();
    }

    /// Put the cursor on the first entry.
    pub fn cursor_home(&mut self) {
        self.cursor = Cursor::default();
        self.follow_cursor();
    }

    /// Put the cursor on the root of the last block.
    pub fn cursor_end(&mut self) {
        if self.blocks.is_empty() {
            return;
        }
        self.cursor = Cursor {
            block: self.blocks.len() - 1,
            entry: 0,
        };
        self.follow_cursor();
    }

    /// Position of the cursor entry in the kanban grid as `(column, row)`.
    pub fn kanban_position(&self) -> Option<(usize, usize)> {
        let id = self.current_entry()?.id;
        kanban_columns(&self.blocks)
            .iter()
            .enumerate()
            .find_map(|(c, col)| col.entries.iter().position(|e| e.id == id).map(|r| (c, r)))
    }

    /// Scroll the active view so the cursor is visible.
    pub fn follow_cursor(&mut self) {
        match self.view {
            ViewMode::Timeline => {
                let page = self.page(ViewMode::Timeline);
                self.viewports
                    .timeline
                    .ensure_visible(self.cursor.block, page, self.blocks.len());
            }
            ViewMode::Cards | ViewMode::Table => {
                let page = self.page(self.view);
                let (flat, total) = (self.cursor_flat(), self.entry_count());
                let viewport = if self.view == ViewMode::Cards {
                    &mut self.viewports.cards
                } else {
                    &mut self.viewports.table
                };
                viewport.ensure_visible(flat, page, total);
            }
            ViewMode::Kanban => {
                if let Some((col, row)) = self.kanban_position() {
                    let columns = kanban_columns(&self.blocks);
                    let total_cols = columns.len();
                    let tallest = columns.iter().map(|c| c.entries.len()).max().unwrap_or(0);
                    self.viewports
                        .kanban_columns
                        .ensure_visible(col, kanban_page(total_cols), total_cols);
                    self.viewports.kanban_rows.ensure_visible(
                        row,
                        self.page(ViewMode::Kanban),
                        tallest,
                    );
                }
            }
        }
    }

    /// Page the active view by `pages` (negative for up) and bring the
    /// cursor into the new window.
    pub fn page_by(&mut self, pages: isize) {
        if self.blocks.is_empty() {
            return;
        }
        let page = self.page(self.view);
        let step = pages * page.saturating_sub(1).max(1) as isize;
        match self.view {
            ViewMode::Timeline => {
                let vp = &mut self.viewports.timeline;
                vp.scroll_by(step, page, self.blocks.len());
                let range = vp.range(page, self.blocks.len());
                if !range.contains(&self.cursor.block) {
                    let block = self.cursor.block.clamp(range.start, range.end.saturating_sub(1));
                    self.cursor = Cursor { block, entry: 0 };
                }
            }
            ViewMode::Cards | ViewMode::Table => {
                let total = self.entry_count();
                let flat = self.cursor_flat();
                let vp = if self.view == ViewMode::Cards {
                    &mut self.viewports.cards
                } else {
                    &mut self.viewports.table
                };
                vp.scroll_by(step, page, total);
                let range = vp.range(page, total);
                if !range.contains(&flat) {
                    let flat = flat.clamp(range.start, range.end.saturating_sub(1));
                    let (block, entry) = position_of(&self.blocks, flat);
                    self.cursor = Cursor { block, entry };
                }
            }
            ViewMode::Kanban => {
                let tallest = kanban_columns(&self.blocks)
                    .iter()
                    .map(|c| c.entries.len())
                    .max()
                    .unwrap_or(0);
                self.viewports.kanban_rows.scroll_by(step, page, tallest);
            }
        }
    }

    /// Scroll the active view without moving the cursor (mouse wheel).
    pub fn scroll_view(&mut self, delta: isize) {
        let page = self.page(self.view);
        let total = match self.view {
            ViewMode::Timeline => self.blocks.len(),
            ViewMode::Cards | ViewMode::Table => self.entry_count(),
            ViewMode::Kanban => kanban_columns(&self.blocks)
                .iter()
                .map(|c| c.entries.len())
                .max()
                .unwrap_or(0),
        };
        let vp = match self.view {
            ViewMode::Timeline => &mut self.viewports.timeline,
            ViewMode::Cards => &mut self.viewports.cards,
            ViewMode::Table => &mut self.viewports.table,
            ViewMode::Kanban => &mut self.viewports.kanban_rows,
        };
        vp.scroll_by(delta, page, total);
    }

    /// Shift the visible kanban columns. Returns the visible category range
    /// when there are more columns than fit.
    pub fn scroll_kanban(&mut self, delta: isize) -> Option<String> {
        let columns = kanban_columns(&self.blocks);
        let page = kanban_page(columns.len());
        self.viewports
            .kanban_columns
            .scroll_by(delta, page, columns.len());
        if columns.len() <= page {
            return None;
        }
        let range = self.viewports.kanban_columns.range(page, columns.len());
        Some(format!(
            "Kanban: {} - {}",
            columns[range.start].category,
            columns[range.end - 1].category
        ))
    }

    /// Enforce the cursor invariant: both indices zero when there are no
    /// blocks, otherwise inside the current block.
    pub fn clamp_cursor(&mut self) {
        if self.blocks.is_empty() {
            self.cursor = Cursor::default();
            return;
        }
        self.cursor.block = self.cursor.block.min(self.blocks.len() - 1);
        let len = self.blocks[self.cursor.block].entries.len();
        self.cursor.entry = self.cursor.entry.min(len.saturating_sub(1));
    }

    fn clamp_viewports(&mut self) {
        let total = self.entry_count();
        let columns = kanban_columns(&self.blocks);
        let tallest = columns.iter().map(|c| c.entries.len()).max().unwrap_or(0);
        let vps = &mut self.viewports;
        let h = self.height.saturating_sub(CHROME_ROWS);
        vps.timeline
            .clamp(page_size(ViewMode::Timeline, h), self.blocks.len());
        vps.cards.clamp(page_size(ViewMode::Cards, h), total);
        vps.table.clamp(page_size(ViewMode::Table, h), total);
        vps.kanban_columns
            .clamp(kanban_page(columns.len()), columns.len());
        vps.kanban_rows
            .clamp(page_size(ViewMode::Kanban, h), tallest);
    }

    // ----- panes ----------------------------------------------------------

    /// Move focus to the next pane, skipping hidden ones. With both side
    /// panes hidden, the sidebar is opened.
    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Timeline if self.show_sidebar => Focus::Sidebar,
            Focus::Timeline if self.show_thread => Focus::Thread,
            Focus::Timeline => {
                self.show_sidebar = true;
                Focus::Sidebar
            }
            Focus::Sidebar if self.show_thread => Focus::Thread,
            Focus::Sidebar | Focus::Thread => Focus::Timeline,
        };
    }

    /// Facet list of a sidebar section.
    pub fn section_items(&self, section: Section) -> &[FacetItem] {
        match section {
            Section::Projects => &self.facets.projects,
            Section::Categories => &self.facets.categories,
            Section::Tags => &self.facets.tags,
        }
    }

    /// Move the sidebar cursor down, continuing into the next section.
    pub fn sidebar_down(&mut self) {
        let len = self.section_items(self.sidebar.section).len();
        if self.sidebar.index + 1 < len {
            self.sidebar.index += 1;
        } else if let Some(next) = self.sidebar.section.next() {
            self.sidebar = SidebarCursor {
                section: next,
                index: 0,
            };
        }
    }

    /// Move the sidebar cursor up, continuing into the previous section.
    pub fn sidebar_up(&mut self) {
        if self.sidebar.index > 0 {
            self.sidebar.index -= 1;
        } else if let Some(prev) = self.sidebar.section.prev() {
            let len = self.section_items(prev).len();
            self.sidebar = SidebarCursor {
                section: prev,
                index: len.saturating_sub(1),
            };
        }
    }

    /// Facet under the sidebar cursor.
    pub fn sidebar_item(&self) -> Option<&FacetItem> {
        self.section_items(self.sidebar.section)
            .get(self.sidebar.index)
    }

    // ----- loading --------------------------------------------------------

    /// Start a new timeline load. Results of earlier requests become stale.
    pub fn begin_reload(&mut self) -> ReloadRequest {
        self.generation += 1;
        ReloadRequest {
            generation: self.generation,
            scope: self.scope,
            filter: self.filter.clone(),
            now: self.now,
        }
    }

    /// Generation of the newest reload request.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply a finished load. Stale generations are ignored and return
    /// `false`. A failed load keeps the blocks on screen and reports the
    /// error in the status line.
    pub fn apply_blocks(&mut self, generation: u64, result: Result<Vec<Block>>) -> bool {
        if generation != self.generation {
            return false;
        }
        match result {
            Ok(mut blocks) => {
                sort_blocks(&mut blocks, self.sort, self.descending);
                self.blocks = blocks;
                self.clamp_cursor();
                self.clamp_viewports();
            }
            Err(e) => self.status = Some(format!("load error: {e}")),
        }
        true
    }

    /// Replace the facets and keep the sidebar cursor in range.
    pub fn set_facets(&mut self, facets: Facets) {
        self.facets = facets;
        let len = self.section_items(self.sidebar.section).len();
        self.sidebar.index = self.sidebar.index.min(len.saturating_sub(1));
    }

    // ----- messages -------------------------------------------------------

    /// Show `message` in the status line and remember it.
    pub fn notify(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.notifications.push_back(message.clone());
        while self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
        self.status = Some(message);
    }

    /// Show `message` in the status line only.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    // ----- time -----------------------------------------------------------

    /// Advance the clock used for relative times.
    pub fn tick(&mut self, now: DateTime<FixedOffset>) {
        self.now = now;
    }

    /// Advance the countdown by one second.
    pub fn countdown_tick(&mut self) -> Vec<Effect> {
        let Some(done) = self.pomodoro.tick() else {
            return Vec::new();
        };
        let mut effects = Vec::new();
        if self.pomodoro.auto_log {
            let entry = NewEntry::new("timer", self.pomodoro.log_text(&done))
                .duration(i64::from(self.pomodoro.log_minutes(&done)));
            effects.push(Effect::LogPomodoro(entry));
        }
        let message = match done {
            Completion::Work {
                long_break: true, ..
            } => "Work session completed! Time for a long break 🎉",
            Completion::Work { .. } => "Work session completed! Time for a break 🎉",
            Completion::Break { .. } => "Break completed! Back to work 💪",
        };
        self.notify(message);
        effects
    }

    // ----- summaries ------------------------------------------------------

    /// Loaded entry counts per canonical category.
    pub fn category_counts(&self) -> Vec<(&'static str, usize)> {
        CANONICAL_CATEGORIES
            .iter()
            .map(|cat| {
                let n = self
                    .blocks
                    .iter()
                    .flat_map(|b| &b.entries)
                    .filter(|e| e.category.eq_ignore_ascii_case(cat))
                    .count();
                (*cat, n)
            })
            .collect()
    }

    /// Every loaded entry in block order.
    pub fn loaded_entries(&self) -> Vec<Entry> {
        self.blocks
            .iter()
            .flat_map(|b| b.entries.iter().cloned())
            .collect()
    }
}
