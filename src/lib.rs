//! pulse: personal time tracking and note logging from the terminal.
//!
//! Entries (notes, tasks, meetings, timers) live in an embedded SQLite
//! database with a full-text index. Replies form threads, and the
//! interactive timeline shows each thread as one block.
//!
//! # Features
//!
//! - **Threaded timeline**: a matching reply pulls in its whole conversation
//! - **Scopes and filters**: today, this week, a flexible `since` date, plus
//!   project, category, tag and text filters
//! - **Timers and pomodoro**: start/stop timers from the CLI, a countdown in
//!   the interactive session
//! - **Analytics**: time reports, project summaries and tag usage
//! - **Dual Interface**: Both CLI (scriptable) and TUI (interactive) modes
//!
//! # Quick Start
//!
//! ```rust
//! use chrono::Utc;
//! use pulse::config::Zone;
//! use pulse::model::NewEntry;
//! use pulse::store::EntryStore;
//! use pulse::timeline::{load_blocks, Filter, Scope};
//!
//! fn main() -> pulse::Result<()> {
//!     let store = EntryStore::open_in_memory()?;
//!     let root = store.insert(&NewEntry::new("task", "ship the release").project("pulse"))?;
//!     store.reply(root, "tagged v1.0", "", "")?;
//!
//!     let zone = Zone::utc();
//!     let now = zone.localize(Utc::now());
//!     let blocks = load_blocks(&store, &zone, now, &Scope::All, &Filter::default())?;
//!     assert_eq!(blocks[0].reply_count(), 1);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`model`]: Entries and the write-side requests for them
//! - [`store`]: SQLite persistence, full-text search, timers and templates
//! - [`timeline`]: Scopes, filters and thread blocks
//! - [`analytics`]: Time reports, project and tag summaries
//! - [`export`]: Markdown, JSON and CSV output
//! - [`templates`]: Built-in and user entry templates
//! - [`cli`]: Command-line interface
//! - [`tui`]: Terminal user interface
//! - [`config`]: Configuration management
//! - [`util`]: Date parsing, pagination and text helpers
//! - [`error`]: Error types and handling

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod analytics;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod store;
pub mod templates;
pub mod timeline;
pub mod tui;
pub mod util;

// Re-export commonly used types at the crate root
pub use error::{PulseError, Result};
pub use model::{Entry, NewEntry};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{Config, Zone};
    pub use crate::error::{PulseError, Result};
    pub use crate::model::{Entry, EntryUpdate, NewEntry};
    pub use crate::store::{EntryFilter, EntryStore};
    pub use crate::timeline::{load_blocks, Block, Filter, Scope};
}
