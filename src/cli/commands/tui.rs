//! TUI launcher command.

use crate::error::Result;

use super::Context;

/// Hand the loaded configuration and open store to the interactive session.
pub fn run(ctx: Context) -> Result<()> {
    let Context {
        config,
        store,
        exports_dir,
        ..
    } = ctx;
    crate::tui::launch(config, store, exports_dir)
}
