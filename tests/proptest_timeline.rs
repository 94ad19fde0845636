//! Property-based tests for scrolling, paging and input parsing.
//!
//! Uses proptest to drive the viewport, pagination and cursor logic with
//! generated sizes and key sequences, and to fuzz the date and tag parsers.

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use proptest::prelude::*;
use pulse::config::{Config, Zone};
use pulse::model::{join_tags, split_tags, Entry};
use pulse::timeline::Block;
use pulse::tui::state::ViewMode;
use pulse::tui::viewport::Viewport;
use pulse::tui::Session;
use pulse::util::dateparse::parse_flexible;
use pulse::util::pagination::Pagination;

fn now() -> DateTime<FixedOffset> {
    Zone::utc().localize(Utc.with_ymd_and_hms(2025, 6, 11, 14, 30, 0).unwrap())
}

/// Blocks with the given member counts, ids assigned in order.
fn blocks(sizes: &[usize]) -> Vec<Block> {
    let base = Utc.with_ymd_and_hms(2025, 6, 11, 9, 0, 0).unwrap();
    let mut next_id = 1;
    sizes
        .iter()
        .enumerate()
        .filter_map(|(b, &size)| {
            let root = next_id;
            let entries = (0..size)
                .map(|i| {
                    let id = next_id;
                    next_id += 1;
                    Entry {
                        id,
                        timestamp: base - Duration::minutes((b * 10 + i) as i64),
                        category: ["note", "task", "meeting"][b % 3].to_string(),
                        text: format!("entry {id}"),
                        project: None,
                        tags: Vec::new(),
                        duration_minutes: None,
                        thread_id: (i > 0).then_some(root),
                        parent_id: (i > 0).then_some(root),
                    }
                })
                .collect();
            Block::from_thread(entries)
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
enum Move {
    Down,
    Up,
    Home,
    End,
    PageDown,
    PageUp,
}

fn any_move() -> impl Strategy<Value = Move> {
    prop_oneof![
        Just(Move::Down),
        Just(Move::Up),
        Just(Move::Home),
        Just(Move::End),
        Just(Move::PageDown),
        Just(Move::PageUp),
    ]
}

fn any_view() -> impl Strategy<Value = ViewMode> {
    prop_oneof![
        Just(ViewMode::Timeline),
        Just(ViewMode::Cards),
        Just(ViewMode::Table),
        Just(ViewMode::Kanban),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// After `ensure_visible` the index is inside the window and the offset
    /// never passes the last full page.
    #[test]
    fn ensure_visible_shows_index(
        start in 0usize..200,
        page in 0usize..30,
        total in 1usize..200,
        index_seed in any::<usize>(),
    ) {
        let index = index_seed % total;
        let mut vp = Viewport::at(start);
        vp.ensure_visible(index, page, total);
        prop_assert!(vp.offset() <= Viewport::max_offset(page, total));
        prop_assert!(vp.range(page, total).contains(&index));
    }

    /// Scrolling stays in bounds and the window is always as full as possible.
    #[test]
    fn scroll_stays_in_bounds(
        start in 0usize..200,
        delta in -300isize..300,
        page in 1usize..30,
        total in 0usize..200,
    ) {
        let mut vp = Viewport::at(start);
        vp.scroll_by(delta, page, total);
        prop_assert!(vp.offset() <= Viewport::max_offset(page, total));
        let range = vp.range(page, total);
        prop_assert_eq!(range.len(), page.min(total));
        prop_assert!(range.end <= total);
    }

    /// A stale offset is clamped on read.
    #[test]
    fn range_clamps_stale_offset(
        start in 0usize..1000,
        page in 1usize..30,
        total in 0usize..200,
    ) {
        let range = Viewport::at(start).range(page, total);
        prop_assert!(range.end <= total);
        prop_assert_eq!(range.len(), page.min(total));
    }

    /// Page arithmetic is consistent for any request.
    #[test]
    fn pagination_is_consistent(
        total in 0usize..10_000,
        per_page in 0usize..500,
        current in 0usize..500,
    ) {
        let p = Pagination::new(total, per_page, current);
        prop_assert!(p.per_page >= 1);
        prop_assert!(p.total_pages >= 1);
        prop_assert!((1..=p.total_pages).contains(&p.current));
        prop_assert_eq!(p.offset, (p.current - 1) * p.per_page);
        if total > 0 {
            prop_assert!(p.offset < total);
            let (start, end) = p.range();
            prop_assert!(start <= end);
            prop_assert!(end <= total);
        }
        prop_assert_eq!(p.has_next(), p.current < p.total_pages);
    }

    /// Date parsing never panics, whatever the input.
    #[test]
    fn dateparse_never_panics(input in ".*") {
        let _ = parse_flexible(&input, now(), &Zone::utc());
    }

    /// Relative spans always land before `now`.
    #[test]
    fn relative_spans_are_in_the_past(n in 1u32..500, unit in "[smhdw]") {
        let parsed = parse_flexible(&format!("{n}{unit} ago"), now(), &Zone::utc()).unwrap();
        prop_assert!(parsed < now());
    }

    /// Splitting is idempotent through a store round trip.
    #[test]
    fn split_tags_is_idempotent(csv in "[a-z ,]{0,40}") {
        let tags = split_tags(&csv);
        prop_assert_eq!(split_tags(&join_tags(&tags)), tags.clone());
        prop_assert!(tags.iter().all(|t| !t.is_empty() && t.trim() == t));
    }

    /// The cursor stays on a real entry, and the active view keeps it
    /// visible, across any sequence of moves and resizes.
    #[test]
    fn cursor_stays_in_bounds(
        sizes in prop::collection::vec(1usize..5, 0..25),
        view in any_view(),
        height in 0u16..60,
        moves in prop::collection::vec(any_move(), 0..60),
    ) {
        let mut session = Session::new(Config::default(), now());
        session.view = view;
        session.resize(100, height);
        let generation = session.begin_reload().generation;
        prop_assert!(session.apply_blocks(generation, Ok(blocks(&sizes))));

        for step in moves {
            match step {
                Move::Down => session.cursor_down(),
                Move::Up => session.cursor_up(),
                Move::Home => session.cursor_home(),
                Move::End => session.cursor_end(),
                Move::PageDown => session.page_by(1),
                Move::PageUp => session.page_by(-1),
            }

            if session.blocks.is_empty() {
                prop_assert!(session.current_entry().is_none());
                continue;
            }
            prop_assert!(session.current_entry().is_some());

            let page = session.page(session.view);
            match session.view {
                ViewMode::Timeline => {
                    let range = session.viewports.timeline.range(page, session.blocks.len());
                    prop_assert!(range.contains(&session.cursor.block));
                }
                ViewMode::Cards => {
                    let range = session.viewports.cards.range(page, session.entry_count());
                    prop_assert!(range.contains(&session.cursor_flat()));
                }
                ViewMode::Table => {
                    let range = session.viewports.table.range(page, session.entry_count());
                    prop_assert!(range.contains(&session.cursor_flat()));
                }
                ViewMode::Kanban => {}
            }
        }
    }

    /// Only the newest reload request is applied.
    #[test]
    fn stale_reloads_are_ignored(requests in 2usize..10, pick in any::<usize>()) {
        let mut session = Session::new(Config::default(), now());
        let generations: Vec<u64> = (0..requests)
            .map(|_| session.begin_reload().generation)
            .collect();
        let stale = generations[pick % (requests - 1)];
        prop_assert!(!session.apply_blocks(stale, Ok(blocks(&[2]))));
        prop_assert!(session.blocks.is_empty());
        prop_assert!(session.apply_blocks(session.generation(), Ok(blocks(&[2]))));
        prop_assert_eq!(session.entry_count(), 2);
    }
}
