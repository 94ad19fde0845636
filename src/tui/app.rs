//! TUI application main loop.

use std::io;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::{
    cursor::Show,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{PulseError, Result};
use crate::store::EntryStore;

use super::dispatch;
use super::effect::Effect;
use super::events::{spawn_input, Event, Ticker};
use super::executor::Executor;
use super::render;
use super::state::Session;

/// Clock tick interval.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Run the interactive session until the user quits.
pub fn run(config: Config, store: EntryStore, exports_dir: PathBuf) -> Result<()> {
    enable_raw_mode().map_err(|e| {
        PulseError::io(
            "Cannot launch TUI - no interactive terminal available. \
             The TUI requires a terminal with keyboard input support",
            e,
        )
    })?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .map_err(|e| PulseError::io("Failed to enter alternate screen", e))?;

    restore_on_panic(|| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture, Show);
    });

    let backend = CrosstermBackend::new(stdout);
    let mut terminal =
        Terminal::new(backend).map_err(|e| PulseError::io("Failed to create terminal", e))?;

    let result = run_loop(&mut terminal, config, store, exports_dir);

    // Restore terminal
    disable_raw_mode().map_err(|e| PulseError::io("Failed to disable raw mode", e))?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .map_err(|e| PulseError::io("Failed to leave alternate screen", e))?;
    terminal
        .show_cursor()
        .map_err(|e| PulseError::io("Failed to show cursor", e))?;

    result
}

/// Run `restore` before the current panic hook, so a panic message lands
/// on a usable terminal.
fn restore_on_panic<F>(restore: F)
where
    F: Fn() + Send + Sync + 'static,
{
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore();
        previous(info);
    }));
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: Config,
    store: EntryStore,
    exports_dir: PathBuf,
) -> Result<()> {
    let zone = config.zone();
    let poll = Duration::from_millis(config.display.tick_rate_ms.max(10));
    let mut session = Session::new(config, zone.now());
    let size = terminal
        .size()
        .map_err(|e| PulseError::io("Failed to read terminal size", e))?;
    session.resize(size.width, size.height);

    let (tx, rx) = mpsc::channel();
    spawn_input(tx.clone(), poll);
    let _clock = Ticker::spawn(tx.clone(), TICK_INTERVAL, || Event::Tick);
    let mut executor = Executor::new(store, exports_dir, tx);

    info!(path = ?executor.store().path(), "interactive session started");
    let startup = vec![
        Effect::ReloadTimeline,
        Effect::ReloadFacets,
        Effect::LoadTemplates,
    ];
    if executor.run(&mut session, startup).is_break() {
        return Ok(());
    }

    loop {
        terminal
            .draw(|f| render::draw(f, &session))
            .map_err(|e| PulseError::io("Failed to draw TUI", e))?;

        // Every sender lives in this function, so the channel cannot close
        // while the loop runs; a closed channel still ends the session.
        let Ok(event) = rx.recv() else {
            break;
        };
        let effects = match event {
            Event::Tick => {
                session.tick(zone.now());
                Vec::new()
            }
            Event::Countdown => session.countdown_tick(),
            Event::Key(key) => dispatch::handle_key(&mut session, key),
            Event::Mouse(mouse) => {
                dispatch::handle_mouse(&mut session, mouse);
                Vec::new()
            }
            Event::Resize(width, height) => {
                session.resize(width, height);
                Vec::new()
            }
            Event::BlocksLoaded { generation, result } => {
                if !session.apply_blocks(generation, result) {
                    debug!(generation, "discarded stale timeline load");
                }
                Vec::new()
            }
        };
        if let ControlFlow::Break(()) = executor.run(&mut session, effects) {
            break;
        }
    }

    info!("interactive session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_panic_restores_before_reporting() {
        let restored = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&restored);
        restore_on_panic(move || flag.store(true, Ordering::SeqCst));

        let outcome = std::panic::catch_unwind(|| panic!("render failed"));
        let _ = std::panic::take_hook();

        assert!(outcome.is_err());
        assert!(restored.load(Ordering::SeqCst));
    }
}
