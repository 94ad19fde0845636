//! CLI command implementations.
//!
//! Each command is implemented in its own module with a `run` function
//! that handles the command logic. Commands that touch the store receive a
//! [`Context`] and write to any [`std::io::Write`], so they can be driven
//! from tests without a terminal.

pub mod config;
pub mod delete;
pub mod edit;
pub mod list;
pub mod log;
pub mod output;
pub mod search;
pub mod summary;
pub mod timer;
pub mod tui;

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Utc};

use crate::cli::Cli;
use crate::config::{default_exports_dir, Config, Zone};
use crate::error::Result;
use crate::store::EntryStore;

/// Everything a command needs: settings, the open store and a fixed "now".
#[derive(Debug)]
pub struct Context {
    /// Loaded configuration.
    pub config: Config,
    /// Open entry store.
    pub store: EntryStore,
    /// Display timezone.
    pub zone: Zone,
    /// Reference instant for relative dates and timers.
    pub now: DateTime<FixedOffset>,
    /// Directory the interactive session exports into.
    pub exports_dir: PathBuf,
}

impl Context {
    /// Load configuration and open the store named by the CLI flags.
    pub fn open(cli: &Cli) -> Result<Self> {
        let config = load_config(cli.config.as_deref());
        let store = match &cli.db {
            Some(path) => EntryStore::open(path)?,
            None => EntryStore::open_default()?,
        };
        let exports_dir = default_exports_dir().unwrap_or_else(|_| PathBuf::from("exports"));
        Ok(Self::new(config, store, exports_dir))
    }

    /// Build a context around an already open store.
    pub fn new(config: Config, store: EntryStore, exports_dir: PathBuf) -> Self {
        let zone = config.zone();
        let now = zone.now();
        Self {
            config,
            store,
            zone,
            now,
            exports_dir,
        }
    }

    /// Pin the reference instant.
    #[must_use]
    pub fn at(mut self, now: DateTime<FixedOffset>) -> Self {
        self.now = now;
        self
    }

    /// The reference instant in UTC.
    pub fn now_utc(&self) -> DateTime<Utc> {
        self.now.with_timezone(&Utc)
    }
}

/// Load configuration from `path` or the default location.
///
/// A broken file is reported and replaced by defaults so a typo never
/// blocks logging.
pub fn load_config(path: Option<&Path>) -> Config {
    match path {
        Some(path) => Config::load_from(path).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config from {}: {}", path.display(), e);
            Config::default()
        }),
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load config, using defaults");
            Config::default()
        }),
    }
}

/// Join positional words into one text argument.
pub(crate) fn joined(words: &[String]) -> String {
    words.join(" ").trim().to_string()
}

#[cfg(test)]
pub(crate) mod testing {
    use chrono::DateTime;

    use super::Context;
    use crate::config::Config;
    use crate::store::EntryStore;

    /// An in-memory context pinned to Wednesday 2025-06-11 14:30 UTC.
    pub(crate) fn context() -> Context {
        let mut config = Config::default();
        config.timezone = "UTC".to_string();
        let store = EntryStore::open_in_memory().unwrap();
        Context::new(config, store, std::env::temp_dir())
            .at(DateTime::parse_from_rfc3339("2025-06-11T14:30:00+00:00").unwrap())
    }

    /// Captured output as a string.
    pub(crate) fn text(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }
}
