//! Calendar: per-day entry counts in month, week and day layouts.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Duration, Months, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent};

use crate::model::Entry;

use super::super::effect::{Effect, Transition};
use super::super::state::Session;
use super::{CreateForm, Mode};

/// Calendar layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CalendarView {
    /// Month grid.
    #[default]
    Month,
    /// Seven days from Sunday.
    Week,
    /// A single day.
    Day,
}

impl CalendarView {
    fn cycle(self) -> Self {
        match self {
            Self::Month => Self::Week,
            Self::Week => Self::Day,
            Self::Day => Self::Month,
        }
    }
}

impl fmt::Display for CalendarView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Month => "Month",
            Self::Week => "Week",
            Self::Day => "Day",
        })
    }
}

/// Calendar state. Counts and the preview list are filled by the executor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalendarState {
    /// Layout.
    pub view: CalendarView,
    /// Date that anchors the visible period.
    pub anchor: NaiveDate,
    /// Highlighted date.
    pub selected: NaiveDate,
    /// Entries per local date within the visible period.
    pub counts: BTreeMap<NaiveDate, usize>,
    /// Whether the entry list of the selected date is open.
    pub preview: bool,
    /// Entries of the selected date.
    pub day_entries: Vec<Entry>,
}

impl CalendarState {
    /// Month view around `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            anchor: today,
            selected: today,
            ..Self::default()
        }
    }

    /// First visible date and the day after the last.
    pub fn range(&self) -> (NaiveDate, NaiveDate) {
        match self.view {
            CalendarView::Month => {
                let start = self.anchor.with_day(1).unwrap_or(self.anchor);
                let end = start
                    .checked_add_months(Months::new(1))
                    .unwrap_or(start + Duration::days(31));
                (start, end)
            }
            CalendarView::Week => {
                let start = week_start(self.anchor);
                (start, start + Duration::days(7))
            }
            CalendarView::Day => (self.anchor, self.anchor + Duration::days(1)),
        }
    }

    /// Entries on `date`.
    pub fn count(&self, date: NaiveDate) -> usize {
        self.counts.get(&date).copied().unwrap_or(0)
    }

    fn shift(&mut self, forward: bool) {
        let anchor = match (self.view, forward) {
            (CalendarView::Month, true) => self.anchor.checked_add_months(Months::new(1)),
            (CalendarView::Month, false) => self.anchor.checked_sub_months(Months::new(1)),
            (CalendarView::Week, true) => Some(self.anchor + Duration::days(7)),
            (CalendarView::Week, false) => Some(self.anchor - Duration::days(7)),
            (CalendarView::Day, true) => Some(self.anchor + Duration::days(1)),
            (CalendarView::Day, false) => Some(self.anchor - Duration::days(1)),
        };
        if let Some(anchor) = anchor {
            self.anchor = anchor;
            self.selected = anchor;
        }
    }

    fn reload(&self) -> [Effect; 2] {
        let (start, end) = self.range();
        [Effect::LoadCalendar { start, end }, Effect::LoadDay(self.selected)]
    }
}

/// Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// Calendar keys.
pub fn handle(mut state: CalendarState, session: &mut Session, key: &KeyEvent) -> Transition {
    let reload = match key.code {
        KeyCode::Esc if state.preview => {
            state.preview = false;
            false
        }
        KeyCode::Esc => return Transition::normal(),
        KeyCode::Left | KeyCode::Char('h') => {
            state.shift(false);
            true
        }
        KeyCode::Right | KeyCode::Char('l') => {
            state.shift(true);
            true
        }
        KeyCode::Char('v') => {
            state.view = state.view.cycle();
            state.anchor = state.selected;
            session.notify(format!("Calendar View: {}", state.view));
            true
        }
        KeyCode::Char('t') => {
            let today = session.now.date_naive();
            state.anchor = today;
            state.selected = today;
            true
        }
        KeyCode::Enter => {
            state.preview = true;
            session.notify(format!("Entries for {}", state.selected.format("%Y-%m-%d")));
            false
        }
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Down | KeyCode::Char('j')
            if !state.preview =>
        {
            let days = match state.view {
                CalendarView::Month => 7,
                CalendarView::Week => 1,
                CalendarView::Day => 0,
            };
            let delta = if matches!(key.code, KeyCode::Up | KeyCode::Char('k')) {
                -days
            } else {
                days
            };
            state.selected += Duration::days(delta);
            let (start, end) = state.range();
            if state.selected < start || state.selected >= end {
                state.anchor = state.selected;
            }
            true
        }
        KeyCode::Char('n') => {
            session.notify(format!(
                "Creating entry for {}",
                state.selected.format("%Y-%m-%d")
            ));
            return Transition::to(Mode::Create(CreateForm::new("note")));
        }
        _ => false,
    };
    let effects = if reload { state.reload().to_vec() } else { Vec::new() };
    Transition {
        mode: Mode::Calendar(state),
        effects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Zone};
    use chrono::{TimeZone, Utc};
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn session() -> Session {
        let now = Zone::utc().localize(Utc.with_ymd_and_hms(2025, 6, 11, 14, 0, 0).unwrap());
        Session::new(Config::default(), now)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_ranges() {
        let mut state = CalendarState::new(date(2025, 6, 11));
        assert_eq!(state.range(), (date(2025, 6, 1), date(2025, 7, 1)));
        state.view = CalendarView::Week;
        assert_eq!(state.range(), (date(2025, 6, 8), date(2025, 6, 15)));
        state.view = CalendarView::Day;
        assert_eq!(state.range(), (date(2025, 6, 11), date(2025, 6, 12)));
    }

    #[test]
    fn test_month_navigation_reloads_counts() {
        let mut s = session();
        let t = handle(CalendarState::new(date(2025, 1, 31)), &mut s, &key(KeyCode::Right));
        let Mode::Calendar(state) = &t.mode else {
            panic!("expected calendar");
        };
        assert_eq!(state.anchor, date(2025, 2, 28));
        assert_eq!(
            t.effects[0],
            Effect::LoadCalendar {
                start: date(2025, 2, 1),
                end: date(2025, 3, 1)
            }
        );
    }

    #[test]
    fn test_down_crosses_into_next_month() {
        let mut s = session();
        let t = handle(CalendarState::new(date(2025, 6, 28)), &mut s, &key(KeyCode::Down));
        let Mode::Calendar(state) = t.mode else {
            panic!("expected calendar");
        };
        assert_eq!(state.selected, date(2025, 7, 5));
        assert_eq!(state.range().0, date(2025, 7, 1));
    }

    #[test]
    fn test_esc_closes_preview_first() {
        let mut s = session();
        let mut state = CalendarState::new(date(2025, 6, 11));
        state.preview = true;
        let t = handle(state, &mut s, &key(KeyCode::Esc));
        assert!(matches!(t.mode, Mode::Calendar(ref c) if !c.preview));
        let Mode::Calendar(state) = t.mode else {
            unreachable!()
        };
        assert_eq!(handle(state, &mut s, &key(KeyCode::Esc)).mode, Mode::Normal);
    }
}
