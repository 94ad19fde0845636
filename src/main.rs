//! pulse: personal time tracking and note logging from the terminal.
//!
//! Runs a scriptable CLI, or the interactive timeline when no subcommand is
//! given.

use std::process::ExitCode;

use pulse::cli;

fn main() -> ExitCode {
    // Logging is initialized by cli::run based on --log-level and --log-format
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");

            // Print cause chain in debug mode
            if std::env::var("RUST_BACKTRACE").is_ok() {
                if let Some(source) = std::error::Error::source(&e) {
                    eprintln!("Caused by: {source}");
                }
            }

            ExitCode::from(e.exit_code() as u8)
        }
    }
}
