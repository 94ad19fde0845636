//! Configuration management for pulse.
//!
//! Settings live in a TOML file at `<config dir>/pulse/config.toml`. Every
//! section has defaults, so a missing or partial file is valid. The loaded
//! [`Config`] is passed explicitly to the CLI commands and the interactive
//! session; nothing reads it through global state.

mod reminder;
mod zone;

use std::path::{Path, PathBuf};

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::{PulseError, Result};
use crate::util::atomic_write;

pub use reminder::next_at as next_reminder_at;
pub use zone::Zone;

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Initial theme name for the interactive session.
    #[serde(default = "default_theme")]
    pub theme: String,

    /// IANA timezone name; empty means the host's local zone.
    #[serde(default)]
    pub timezone: String,

    /// Daily reminder schedule.
    #[serde(default)]
    pub reminder: ReminderConfig,

    /// Notification toggles.
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Pomodoro timer lengths and behaviour.
    #[serde(default)]
    pub pomodoro: PomodoroConfig,

    /// Interactive display settings.
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            timezone: String::new(),
            reminder: ReminderConfig::default(),
            notifications: NotificationConfig::default(),
            pomodoro: PomodoroConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        let config_path = default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PulseError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|e| PulseError::InvalidConfig {
            message: e.to_string(),
        })?;
        config.normalize();
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let config_path = default_config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| PulseError::InvalidConfig {
            message: format!("Failed to serialize config: {e}"),
        })?;

        atomic_write(path, content.as_bytes())
    }

    /// Resolved timezone for display and scope computation.
    pub fn zone(&self) -> Zone {
        Zone::resolve(&self.timezone)
    }

    /// Canonicalize free-form values after deserialization.
    pub fn normalize(&mut self) {
        self.reminder.workdays = self
            .reminder
            .workdays
            .iter()
            .filter_map(|d| normalize_workday(d))
            .collect();
        if self.pomodoro.sessions_before_long_break == 0 {
            self.pomodoro.sessions_before_long_break = default_sessions_before_long_break();
        }
    }

    /// Read a value by dotted key, e.g. `pomodoro.work_minutes`.
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "theme" => self.theme.clone(),
            "timezone" => self.timezone.clone(),

            "reminder.enabled" => self.reminder.enabled.to_string(),
            "reminder.time" => self.reminder.time.clone(),
            "reminder.workdays" => self.reminder.workdays.join(","),
            "reminder.holidays" => self.reminder.holidays.join(","),

            "notifications.enabled" => self.notifications.enabled.to_string(),
            "notifications.pomodoro_sessions" => self.notifications.pomodoro_sessions.to_string(),
            "notifications.reminders" => self.notifications.reminders.to_string(),

            "pomodoro.work_minutes" => self.pomodoro.work_minutes.to_string(),
            "pomodoro.break_minutes" => self.pomodoro.break_minutes.to_string(),
            "pomodoro.long_break_minutes" => self.pomodoro.long_break_minutes.to_string(),
            "pomodoro.sessions_before_long_break" => {
                self.pomodoro.sessions_before_long_break.to_string()
            }
            "pomodoro.long_break_enabled" => self.pomodoro.long_break_enabled.to_string(),
            "pomodoro.auto_log" => self.pomodoro.auto_log.to_string(),

            "display.tick_rate_ms" => self.display.tick_rate_ms.to_string(),
            "display.show_sidebar" => self.display.show_sidebar.to_string(),
            "display.default_view" => self.display.default_view.clone(),

            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set a value by dotted key. The config is normalized afterwards.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "theme" => self.theme = value.to_string(),
            "timezone" => self.timezone = value.trim().to_string(),

            "reminder.enabled" => self.reminder.enabled = parse_bool(value)?,
            "reminder.time" => self.reminder.time = value.trim().to_string(),
            "reminder.workdays" => self.reminder.workdays = split_list(value),
            "reminder.holidays" => self.reminder.holidays = split_list(value),

            "notifications.enabled" => self.notifications.enabled = parse_bool(value)?,
            "notifications.pomodoro_sessions" => {
                self.notifications.pomodoro_sessions = parse_bool(value)?;
            }
            "notifications.reminders" => self.notifications.reminders = parse_bool(value)?,

            "pomodoro.work_minutes" => self.pomodoro.work_minutes = parse_u32(value)?,
            "pomodoro.break_minutes" => self.pomodoro.break_minutes = parse_u32(value)?,
            "pomodoro.long_break_minutes" => self.pomodoro.long_break_minutes = parse_u32(value)?,
            "pomodoro.sessions_before_long_break" => {
                self.pomodoro.sessions_before_long_break = parse_u32(value)?;
            }
            "pomodoro.long_break_enabled" => self.pomodoro.long_break_enabled = parse_bool(value)?,
            "pomodoro.auto_log" => self.pomodoro.auto_log = parse_bool(value)?,

            "display.tick_rate_ms" => self.display.tick_rate_ms = u64::from(parse_u32(value)?),
            "display.show_sidebar" => self.display.show_sidebar = parse_bool(value)?,
            "display.default_view" => self.display.default_view = value.trim().to_lowercase(),

            _ => return Err(unknown_key(key)),
        }
        self.normalize();
        Ok(())
    }
}

/// Daily reminder configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Whether the reminder is active.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Time of day as `HH:MM`.
    #[serde(default = "default_reminder_time")]
    pub time: String,
    /// Three-letter weekday names (`Mon`..`Sun`).
    #[serde(default = "default_workdays")]
    pub workdays: Vec<String>,
    /// Dates (`YYYY-MM-DD`) on which no reminder fires.
    #[serde(default)]
    pub holidays: Vec<String>,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            time: default_reminder_time(),
            workdays: default_workdays(),
            holidays: Vec::new(),
        }
    }
}

/// Notification toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Master switch.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Announce pomodoro session transitions.
    #[serde(default = "default_true")]
    pub pomodoro_sessions: bool,
    /// Announce the daily reminder.
    #[serde(default = "default_true")]
    pub reminders: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pomodoro_sessions: true,
            reminders: true,
        }
    }
}

/// Pomodoro configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PomodoroConfig {
    /// Work session length in minutes.
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,
    /// Short break length in minutes.
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,
    /// Long break length in minutes.
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u32,
    /// Completed work sessions before a long break.
    #[serde(default = "default_sessions_before_long_break")]
    pub sessions_before_long_break: u32,
    /// Whether long breaks are used at all.
    #[serde(default = "default_true")]
    pub long_break_enabled: bool,
    /// Log a timer entry when a session completes.
    #[serde(default = "default_true")]
    pub auto_log: bool,
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            break_minutes: default_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            sessions_before_long_break: default_sessions_before_long_break(),
            long_break_enabled: true,
            auto_log: true,
        }
    }
}

/// Interactive display configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Input poll interval in milliseconds.
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Open the sidebar on startup.
    #[serde(default)]
    pub show_sidebar: bool,
    /// Initial view: timeline, cards, table or kanban.
    #[serde(default = "default_view")]
    pub default_view: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            show_sidebar: false,
            default_view: default_view(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_theme() -> String {
    "default".to_string()
}

fn default_reminder_time() -> String {
    "17:00".to_string()
}

fn default_workdays() -> Vec<String> {
    ["Mon", "Tue", "Wed", "Thu", "Fri"]
        .iter()
        .map(|d| (*d).to_string())
        .collect()
}

fn default_work_minutes() -> u32 {
    25
}

fn default_break_minutes() -> u32 {
    5
}

fn default_long_break_minutes() -> u32 {
    15
}

fn default_sessions_before_long_break() -> u32 {
    4
}

fn default_tick_rate() -> u64 {
    250
}

fn default_view() -> String {
    "timeline".to_string()
}

/// Three-letter weekday abbreviation as used in `reminder.workdays`.
pub(crate) fn weekday_abbrev(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

/// `monday`, `MON`, ` wed ` -> `Mon`, `Wed`. Unrecognized names are dropped.
fn normalize_workday(day: &str) -> Option<String> {
    let prefix: String = day.trim().chars().take(3).collect::<String>().to_lowercase();
    let weekday = match prefix.as_str() {
        "mon" => Weekday::Mon,
        "tue" => Weekday::Tue,
        "wed" => Weekday::Wed,
        "thu" => Weekday::Thu,
        "fri" => Weekday::Fri,
        "sat" => Weekday::Sat,
        "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday_abbrev(weekday).to_string())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn unknown_key(key: &str) -> PulseError {
    PulseError::ConfigError {
        message: format!("Unknown configuration key: {key}"),
    }
}

/// Parse boolean value.
pub fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(PulseError::ConfigError {
            message: format!("Invalid boolean value: {s}. Use true/false."),
        }),
    }
}

fn parse_u32(s: &str) -> Result<u32> {
    s.trim().parse().map_err(|_| PulseError::ConfigError {
        message: format!("Invalid number: {s}"),
    })
}

/// Get the default configuration file path.
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| PulseError::Unsupported {
        feature: "config directory discovery".to_string(),
    })?;

    Ok(config_dir.join("pulse").join("config.toml"))
}

/// Get the default database path.
pub fn default_db_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| PulseError::Unsupported {
        feature: "data directory discovery".to_string(),
    })?;

    Ok(data_dir.join("pulse").join("pulse.db"))
}

/// Log file used while the interactive session owns the terminal.
pub fn default_log_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| PulseError::Unsupported {
        feature: "data directory discovery".to_string(),
    })?;

    Ok(data_dir.join("pulse").join("pulse.log"))
}

/// Directory where exports are written.
pub fn default_exports_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| PulseError::Unsupported {
        feature: "config directory discovery".to_string(),
    })?;

    Ok(config_dir.join("pulse").join("exports"))
}
