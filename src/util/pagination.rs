//! Page arithmetic for CLI listings.

/// Pagination metadata for one page of a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Total number of items across all pages.
    pub total: usize,
    /// Items per page (at least 1).
    pub per_page: usize,
    /// Current page, 1-based and clamped to `1..=total_pages`.
    pub current: usize,
    /// Items skipped before the current page.
    pub offset: usize,
    /// Number of pages (at least 1).
    pub total_pages: usize,
}

impl Pagination {
    /// Compute pagination for `total` items.
    pub fn new(total: usize, per_page: usize, current: usize) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total.div_ceil(per_page).max(1);
        let current = current.clamp(1, total_pages);
        Self {
            total,
            per_page,
            current,
            offset: (current - 1) * per_page,
            total_pages,
        }
    }

    /// 1-based inclusive range of items shown on this page.
    pub fn range(&self) -> (usize, usize) {
        let start = self.offset + 1;
        let end = (self.offset + self.per_page).min(self.total);
        (start, end)
    }

    /// Whether a later page exists.
    pub fn has_next(&self) -> bool {
        self.current < self.total_pages
    }

    /// Whether an earlier page exists.
    pub fn has_prev(&self) -> bool {
        self.current > 1
    }

    /// `Showing 1-50 of 120 results (page 1 of 3)`.
    pub fn format_summary(&self) -> String {
        if self.total == 0 {
            return "No results".to_string();
        }
        let (start, end) = self.range();
        let plural = if self.total == 1 { "" } else { "s" };
        if self.total_pages == 1 {
            format!("Showing {start}-{end} of {} result{plural}", self.total)
        } else {
            format!(
                "Showing {start}-{end} of {} result{plural} (page {} of {})",
                self.total, self.current, self.total_pages
            )
        }
    }

    /// Hints such as `use --page 1 for previous, use --page 3 for next`.
    pub fn format_navigation(&self) -> String {
        if self.total_pages <= 1 {
            return String::new();
        }
        let mut hints = Vec::new();
        if self.has_prev() {
            hints.push(format!("use --page {} for previous", self.current - 1));
        }
        if self.has_next() {
            hints.push(format!("use --page {} for next", self.current + 1));
        }
        hints.join(", ")
    }
}
