//! Event sources feeding the single UI queue.
//!
//! Terminal input, the one-second clock and the pomodoro countdown each run
//! on their own thread and only ever send [`Event`]s down one channel. The
//! UI loop is the only consumer and the only writer of session state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, MouseEvent};
use tracing::warn;

use crate::error::Result;
use crate::timeline::Block;

/// Application events.
#[derive(Debug)]
pub enum Event {
    /// One-second clock tick.
    Tick,
    /// One-second countdown tick.
    Countdown,
    /// Key press event.
    Key(KeyEvent),
    /// Mouse event.
    Mouse(MouseEvent),
    /// Terminal resize.
    Resize(u16, u16),
    /// A timeline load finished.
    BlocksLoaded {
        /// Generation the load was issued under.
        generation: u64,
        /// Loaded blocks or the failure.
        result: Result<Vec<Block>>,
    },
}

/// Spawn the terminal input reader.
///
/// The reader ends after the first event it cannot deliver.
pub fn spawn_input(tx: mpsc::Sender<Event>, poll_interval: Duration) {
    thread::spawn(move || loop {
        match event::poll(poll_interval) {
            Ok(false) => continue,
            Ok(true) => {
                let event = match event::read() {
                    Ok(CrosstermEvent::Key(key)) => Event::Key(key),
                    Ok(CrosstermEvent::Mouse(mouse)) => Event::Mouse(mouse),
                    Ok(CrosstermEvent::Resize(w, h)) => Event::Resize(w, h),
                    Ok(_) => continue,
                    Err(e) => {
                        warn!(error = %e, "terminal read failed");
                        break;
                    }
                };
                if tx.send(event).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!(error = %e, "terminal poll failed");
                break;
            }
        }
    });
}

/// A repeating event source, cancelled when dropped.
#[derive(Debug)]
pub struct Ticker {
    stop: Arc<AtomicBool>,
}

impl Ticker {
    /// Send `make()` every `interval` until dropped or the receiver is gone.
    pub fn spawn<F>(tx: mpsc::Sender<Event>, interval: Duration, make: F) -> Self
    where
        F: Fn() -> Event + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        thread::spawn(move || loop {
            thread::sleep(interval);
            if flag.load(Ordering::Relaxed) || tx.send(make()).is_err() {
                break;
            }
        });
        Self { stop }
    }

    /// Stop sending. Events already queued are still delivered.
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_sends_until_dropped() {
        let (tx, rx) = mpsc::channel();
        let ticker = Ticker::spawn(tx, Duration::from_millis(5), || Event::Countdown);
        assert!(matches!(
            rx.recv_timeout(Duration::from_secs(2)),
            Ok(Event::Countdown)
        ));
        drop(ticker);
        // Drain whatever was in flight, then the source goes quiet.
        thread::sleep(Duration::from_millis(30));
        while rx.try_recv().is_ok() {}
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }
}
