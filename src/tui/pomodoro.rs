//! Work/break countdown.
//!
//! The countdown is advanced one second per [`Pomodoro::tick`]; the app
//! feeds it from a cancellable one-second source while it is active.

use std::fmt;

use crate::analytics::format_minutes;
use crate::config::PomodoroConfig;

/// Current countdown phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Focused work.
    #[default]
    Work,
    /// Short break.
    Break,
    /// Long break after a run of work sessions.
    LongBreak,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Work => "WORK",
            Self::Break => "BREAK",
            Self::LongBreak => "LONG BREAK",
        })
    }
}

/// What a finished phase produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// A work session ended and a break began.
    Work {
        /// Work sessions completed so far.
        sessions: u32,
        /// Whether the break that follows is a long one.
        long_break: bool,
    },
    /// A break ended and work resumed.
    Break {
        /// Length of the break that ended.
        minutes: u32,
    },
}

/// Countdown state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pomodoro {
    /// Whether the countdown is running.
    pub active: bool,
    /// Current phase.
    pub phase: Phase,
    /// Seconds left in the phase.
    pub remaining_secs: u32,
    /// Work sessions completed since launch.
    pub work_sessions: u32,
    /// Work sessions since the last long break.
    pub streak: u32,
    /// Focus minutes accumulated from completed work sessions.
    pub focus_minutes: u32,
    /// Log a timer entry when a phase completes.
    pub auto_log: bool,
    config: PomodoroConfig,
}

impl Pomodoro {
    /// Idle countdown configured by `config`.
    pub fn new(config: &PomodoroConfig) -> Self {
        Self {
            auto_log: config.auto_log,
            config: config.clone(),
            ..Self::default()
        }
    }

    /// Configured work length in minutes.
    pub fn work_minutes(&self) -> u32 {
        self.config.work_minutes
    }

    /// Begin a work session.
    pub fn start_work(&mut self) {
        self.active = true;
        self.phase = Phase::Work;
        self.remaining_secs = self.config.work_minutes * 60;
    }

    /// Begin a short break.
    pub fn start_break(&mut self) {
        self.active = true;
        self.phase = Phase::Break;
        self.remaining_secs = self.config.break_minutes * 60;
    }

    /// Stop counting. Counters are kept.
    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Advance one second. Returns the completion when the phase ran out,
    /// after switching to the next phase.
    pub fn tick(&mut self) -> Option<Completion> {
        if !self.active {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }
        match self.phase {
            Phase::Work => {
                self.work_sessions += 1;
                self.streak += 1;
                self.focus_minutes += self.config.work_minutes;
                let long_break = self.config.long_break_enabled
                    && self.streak >= self.config.sessions_before_long_break.max(1);
                if long_break {
                    self.streak = 0;
                    self.phase = Phase::LongBreak;
                    self.remaining_secs = self.config.long_break_minutes * 60;
                } else {
                    self.phase = Phase::Break;
                    self.remaining_secs = self.config.break_minutes * 60;
                }
                Some(Completion::Work {
                    sessions: self.work_sessions,
                    long_break,
                })
            }
            Phase::Break | Phase::LongBreak => {
                let minutes = if self.phase == Phase::LongBreak {
                    self.config.long_break_minutes
                } else {
                    self.config.break_minutes
                };
                self.phase = Phase::Work;
                self.remaining_secs = self.config.work_minutes * 60;
                Some(Completion::Break { minutes })
            }
        }
    }

    /// `WORK 24:59` style label for the top bar.
    pub fn label(&self) -> String {
        format!(
            "{} {:02}:{:02}",
            self.phase,
            self.remaining_secs / 60,
            self.remaining_secs % 60
        )
    }

    /// Minutes recorded on the timer entry logged for `completion`.
    pub fn log_minutes(&self, completion: &Completion) -> u32 {
        match completion {
            Completion::Work { .. } => self.config.work_minutes,
            Completion::Break { minutes } => *minutes,
        }
    }

    /// Text of the timer entry logged for `completion`.
    pub fn log_text(&self, completion: &Completion) -> String {
        match completion {
            Completion::Work { sessions, .. } => format!(
                "🍅 Completed Pomodoro work session #{sessions}\n\
                 Total work sessions today: {sessions}\n\
                 Total focus time: {}",
                format_minutes(i64::from(self.focus_minutes))
            ),
            Completion::Break { .. } => "☕ Completed Pomodoro break\nBack to work! 💪".to_string(),
        }
    }

    /// Multi-line statistics summary.
    pub fn stats(&self) -> String {
        let average = if self.work_sessions == 0 {
            0
        } else {
            self.focus_minutes / self.work_sessions
        };
        format!(
            "🍅 Pomodoro Statistics\nTotal Sessions: {}\nTotal Focus Time: {}\nAvg Session: {}",
            self.work_sessions,
            format_minutes(i64::from(self.focus_minutes)),
            format_minutes(i64::from(average))
        )
    }
}
