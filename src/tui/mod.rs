//! Interactive terminal session.
//!
//! One event queue feeds a single-threaded loop:
//!
//! - [`events`] posts key, mouse, resize, clock and countdown events, plus
//!   the results of background timeline loads.
//! - [`dispatch`] hands each key to the handler of the active [`modes::Mode`],
//!   which returns the next mode and a list of [`effect::Effect`]s.
//! - [`executor`] performs the effects against the store and the filesystem.
//! - [`render`] draws the [`state::Session`] after every event.
//!
//! Built with ratatui for cross-platform terminal support.

mod app;
pub mod components;
pub mod dispatch;
pub mod effect;
pub mod events;
pub mod executor;
pub mod modes;
pub mod palette;
pub mod pomodoro;
pub mod render;
pub mod state;
pub mod theme;
pub mod viewport;

pub use app::run;
pub use render::draw;
pub use state::Session;

use std::path::PathBuf;

use crate::config::Config;
use crate::error::Result;
use crate::store::EntryStore;

/// Launch the interactive session on `store`.
pub fn launch(config: Config, store: EntryStore, exports_dir: PathBuf) -> Result<()> {
    app::run(config, store, exports_dir)
}
