//! Scroll window shared by every view.
//!
//! Each view owns one [`Viewport`] and decides, on every render, how many
//! items fit on a page with [`page_size`]. Only the offset is state; the page
//! size is recomputed from the current terminal height so a resize takes
//! effect immediately.

use std::ops::Range;

use super::state::ViewMode;

/// Rows taken by the top bar, summary line, quick actions and status bar.
pub const CHROME_ROWS: u16 = 4;

/// Estimated rows per card in the cards view.
pub const CARD_HEIGHT: usize = 8;

/// Rows per card in a kanban column.
pub const KANBAN_CARD_HEIGHT: usize = 3;

/// Kanban columns shown side by side.
pub const MAX_KANBAN_COLUMNS: usize = 4;

/// Items that fit in a main panel of `panel_height` rows for `view`.
///
/// For the kanban view this is the number of cards per column.
pub fn page_size(view: ViewMode, panel_height: u16) -> usize {
    let h = usize::from(panel_height);
    let size = match view {
        // Borders, title, separator and a blank line; roughly four rows a block.
        ViewMode::Timeline => h.saturating_sub(5) / 4,
        ViewMode::Cards => h.saturating_sub(5) / CARD_HEIGHT,
        // Same chrome plus the header row and its rule.
        ViewMode::Table => h.saturating_sub(7),
        // Column header, its rule and the footer line.
        ViewMode::Kanban => h.saturating_sub(8) / KANBAN_CARD_HEIGHT,
    };
    size.max(1)
}

/// Kanban columns visible at once for `total` categories.
pub fn kanban_page(total: usize) -> usize {
    total.clamp(1, MAX_KANBAN_COLUMNS)
}

/// A window of `page` items over a list of `total` items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    offset: usize,
}

impl Viewport {
    /// A viewport starting at `offset`.
    pub const fn at(offset: usize) -> Self {
        Self { offset }
    }

    /// First visible index, as stored.
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Largest offset that still fills a page.
    pub fn max_offset(page: usize, total: usize) -> usize {
        total.saturating_sub(page.max(1))
    }

    /// Pull the offset back inside `[0, max_offset]`.
    pub fn clamp(&mut self, page: usize, total: usize) {
        self.offset = self.offset.min(Self::max_offset(page, total));
    }

    /// Scroll the least amount needed for `index` to be visible.
    pub fn ensure_visible(&mut self, index: usize, page: usize, total: usize) {
        let page = page.max(1);
        if index < self.offset {
            self.offset = index;
        } else if index >= self.offset + page {
            self.offset = index + 1 - page;
        }
        self.clamp(page, total);
    }

    /// Move the window by `delta` items.
    pub fn scroll_by(&mut self, delta: isize, page: usize, total: usize) {
        self.offset = self.offset.saturating_add_signed(delta);
        self.clamp(page, total);
    }

    /// Jump to the first page.
    pub fn to_start(&mut self) {
        self.offset = 0;
    }

    /// Jump to the last page.
    pub fn to_end(&mut self, page: usize, total: usize) {
        self.offset = Self::max_offset(page, total);
    }

    /// Visible indices. A stale offset is clamped without being stored, so
    /// rendering never needs mutable state.
    pub fn range(&self, page: usize, total: usize) -> Range<usize> {
        let start = self.offset.min(Self::max_offset(page, total));
        start..(start + page.max(1)).min(total)
    }

    /// Whether items exist outside the window.
    pub fn is_scrollable(page: usize, total: usize) -> bool {
        total > page.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_ensure_visible_scrolls_minimally() {
        let mut vp = Viewport::default();
        vp.ensure_visible(7, 5, 20);
        assert_eq!(vp.offset(), 3);
        vp.ensure_visible(4, 5, 20);
        assert_eq!(vp.offset(), 3);
        vp.ensure_visible(1, 5, 20);
        assert_eq!(vp.offset(), 1);
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut vp = Viewport::at(15);
        vp.clamp(5, 8);
        assert_eq!(vp.offset(), 3);
        vp.clamp(5, 0);
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn test_range_clamps_without_mutation() {
        let vp = Viewport::at(50);
        assert_eq!(vp.range(4, 10), 6..10);
        assert_eq!(vp.range(4, 2), 0..2);
        assert_eq!(vp.offset(), 50);
    }

    #[test]
    fn test_scroll_by() {
        let mut vp = Viewport::default();
        vp.scroll_by(-3, 4, 10);
        assert_eq!(vp.offset(), 0);
        vp.scroll_by(100, 4, 10);
        assert_eq!(vp.offset(), 6);
        vp.to_start();
        vp.to_end(4, 10);
        assert_eq!(vp.offset(), 6);
    }

    #[rstest]
    #[case(ViewMode::Timeline, 30, 6)]
    #[case(ViewMode::Cards, 30, 3)]
    #[case(ViewMode::Table, 30, 23)]
    #[case(ViewMode::Kanban, 30, 7)]
    #[case(ViewMode::Timeline, 3, 1)]
    #[case(ViewMode::Table, 0, 1)]
    fn test_page_size(#[case] view: ViewMode, #[case] height: u16, #[case] expected: usize) {
        assert_eq!(page_size(view, height), expected);
    }

    #[test]
    fn test_kanban_page() {
        assert_eq!(kanban_page(0), 1);
        assert_eq!(kanban_page(3), 3);
        assert_eq!(kanban_page(9), 4);
    }
}
