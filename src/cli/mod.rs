//! Command-line interface for pulse.
//!
//! Scriptable access to the entry store:
//! - `log`, `start`, `stop`: record notes, tasks and timers
//! - `list`, `search`: read entries back in several output formats
//! - `edit`, `delete`: change or remove a single entry
//! - `summary`: today's per-category totals
//! - `tui`: the interactive timeline (the default when no command is given)

mod commands;

pub use commands::*;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

use crate::error::{PulseError, Result};

/// Personal time tracking and note logging from the terminal.
#[derive(Debug, Parser)]
#[command(name = "pulse")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to run; the interactive session when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the entries database (default: <data dir>/pulse/pulse.db).
    #[arg(long, global = true, env = "PULSE_DB")]
    pub db: Option<PathBuf>,

    /// Path to custom configuration file.
    #[arg(long, global = true, env = "PULSE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short = 'v', long, global = true, env = "PULSE_VERBOSE")]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short = 'q', long, global = true, env = "PULSE_QUIET")]
    pub quiet: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn", env = "PULSE_LOG_LEVEL")]
    pub log_level: LogLevel,

    /// Log format (text, json, compact, pretty).
    #[arg(long, global = true, default_value = "text", env = "PULSE_LOG_FORMAT")]
    pub log_format: LogFormat,

    /// Log output file (default: stderr, or pulse.log in the data directory
    /// while the interactive session runs).
    #[arg(long, global = true, env = "PULSE_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

/// Log level options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    /// Only errors.
    Error,
    /// Errors and warnings.
    #[default]
    Warn,
    /// Errors, warnings, and informational messages.
    Info,
    /// All of the above plus debug messages.
    Debug,
    /// All messages including trace-level details.
    Trace,
}

/// Log format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format.
    #[default]
    Text,
    /// Structured JSON format for machine consumption.
    Json,
    /// Compact single-line format.
    Compact,
    /// Pretty format with full details.
    Pretty,
}

impl LogLevel {
    /// Convert to tracing filter level.
    #[must_use]
    pub fn to_filter_string(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl Cli {
    /// Whether the invocation starts the interactive session.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        matches!(self.command, None | Some(Commands::Tui))
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log a quick entry.
    #[command(alias = "l")]
    Log(LogArgs),

    /// Start a timer.
    Start(StartArgs),

    /// Stop a running timer.
    Stop(StopArgs),

    /// List recent entries.
    #[command(alias = "ls")]
    List(ListArgs),

    /// Full-text search with highlighted snippets.
    #[command(alias = "s", alias = "find")]
    Search(SearchArgs),

    /// Edit an existing entry.
    Edit(EditArgs),

    /// Delete an entry; replies stay reachable.
    #[command(alias = "rm")]
    Delete(DeleteArgs),

    /// Today's per-category counts and minutes.
    Summary,

    /// Launch the interactive timeline.
    #[command(alias = "ui")]
    Tui,

    /// View and modify configuration.
    #[command(alias = "cfg")]
    Config(ConfigArgs),

    /// Generate shell completions.
    Completions(CompletionsArgs),
}

/// Arguments for the log command.
#[derive(Debug, Clone, clap::Args)]
pub struct LogArgs {
    /// Entry text; multiple words are joined with spaces.
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,

    /// Category (note, task, meeting, timer, or any label).
    #[arg(short = 'c', long, default_value = "note")]
    pub category: String,

    /// Project name.
    #[arg(short = 'p', long, default_value = "")]
    pub project: String,

    /// Comma-separated tags.
    #[arg(short = 't', long, default_value = "")]
    pub tags: String,
}

/// Arguments for the start command.
#[derive(Debug, Clone, clap::Args)]
pub struct StartArgs {
    /// What the timer is for.
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,

    /// Project name.
    #[arg(short = 'p', long, default_value = "")]
    pub project: String,

    /// Comma-separated tags.
    #[arg(short = 't', long, default_value = "")]
    pub tags: String,

    /// Start even if another timer is running.
    #[arg(long)]
    pub allow_multiple: bool,
}

/// Arguments for the stop command.
#[derive(Debug, Clone, clap::Args)]
pub struct StopArgs {
    /// Timer to stop (default: the most recently started one).
    #[arg(short = 'i', long)]
    pub id: Option<i64>,

    /// Note appended to the timer text.
    #[arg(short = 'm', long)]
    pub message: Option<String>,
}

/// Output format for list and search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable, grouped meta line then indented text.
    #[default]
    Default,
    /// Tab-separated columns.
    Table,
    /// JSON document with pagination metadata.
    Json,
    /// RFC 4180 CSV.
    Csv,
    /// One line per entry.
    Compact,
    /// Entry text only.
    Quiet,
}

/// Arguments for the list command.
#[derive(Debug, Clone, clap::Args)]
pub struct ListArgs {
    /// Start of the range (`yesterday`, `3d ago`, `2025-01-15`, ...).
    #[arg(long, conflicts_with = "preset")]
    pub since: Option<String>,

    /// Named range: today, yesterday, week, month, year, last7days,
    /// last30days, last90days.
    #[arg(long)]
    pub preset: Option<String>,

    /// Comma-separated projects (any of).
    #[arg(long, default_value = "")]
    pub projects: String,

    /// Comma-separated categories (any of).
    #[arg(long, default_value = "")]
    pub categories: String,

    /// Comma-separated tags (all required).
    #[arg(long, default_value = "")]
    pub tags: String,

    /// Entries per page (1-1000).
    #[arg(long, default_value_t = 50, allow_negative_numbers = true)]
    pub limit: i64,

    /// Page to show.
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Output format.
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Default)]
    pub format: OutputFormat,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,
}

/// Arguments for the search command.
#[derive(Debug, Clone, clap::Args)]
pub struct SearchArgs {
    /// Search words; each matches as a prefix of text or tags.
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Start of the range (default: 90 days ago).
    #[arg(long)]
    pub since: Option<String>,

    /// End of the range (default: now).
    #[arg(long)]
    pub until: Option<String>,

    /// Maximum results (1-1000).
    #[arg(long, default_value_t = 200, allow_negative_numbers = true)]
    pub limit: i64,

    /// Restrict to one project.
    #[arg(long, default_value = "")]
    pub project: String,

    /// Comma-separated tags to require.
    #[arg(long, default_value = "")]
    pub tags: String,

    /// Output format.
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Default)]
    pub format: OutputFormat,
}

/// Arguments for the edit command.
#[derive(Debug, Clone, clap::Args)]
pub struct EditArgs {
    /// Entry to edit.
    pub id: i64,

    /// New text.
    #[arg(short = 'm', long)]
    pub message: Option<String>,

    /// New category (note, task, meeting, timer).
    #[arg(short = 'c', long)]
    pub category: Option<String>,

    /// New project.
    #[arg(short = 'p', long)]
    pub project: Option<String>,

    /// New comma-separated tags.
    #[arg(short = 't', long)]
    pub tags: Option<String>,
}

/// Arguments for the delete command.
#[derive(Debug, Clone, clap::Args)]
pub struct DeleteArgs {
    /// Entry to delete.
    pub id: i64,
}

/// Arguments for the config command.
#[derive(Debug, Clone, clap::Args)]
pub struct ConfigArgs {
    /// Config action.
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config actions.
#[derive(Debug, Clone, Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,
    /// Get a configuration value.
    Get {
        /// Dotted key, e.g. `pomodoro.work_minutes`.
        key: String,
    },
    /// Set a configuration value.
    Set {
        /// Dotted key.
        key: String,
        /// New value.
        value: String,
    },
    /// Show configuration file path.
    Path,
    /// Write a default configuration file if none exists.
    Init,
    /// Reset configuration to defaults.
    Reset,
}

/// Arguments for the completions command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: CompletionShell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompletionShell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// PowerShell.
    Powershell,
    /// Elvish shell.
    Elvish,
}

impl From<CompletionShell> for Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Shell::Bash,
            CompletionShell::Zsh => Shell::Zsh,
            CompletionShell::Fish => Shell::Fish,
            CompletionShell::Powershell => Shell::PowerShell,
            CompletionShell::Elvish => Shell::Elvish,
        }
    }
}

/// Generate shell completions to stdout.
pub fn generate_completions(shell: CompletionShell) {
    let mut cmd = Cli::command();
    let shell: Shell = shell.into();
    generate(shell, &mut cmd, "pulse", &mut io::stdout());
}

/// Where log output goes. The interactive session owns the terminal, so it
/// logs to a file unless `--log-file` says otherwise.
fn log_destination(cli: &Cli) -> Option<PathBuf> {
    if let Some(path) = &cli.log_file {
        return Some(path.clone());
    }
    if cli.is_interactive() {
        return crate::config::default_log_path().ok();
    }
    None
}

/// Initialize logging based on CLI options.
fn init_logging(cli: &Cli) {
    use tracing_subscriber::{
        fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
        layer::SubscriberExt,
        util::SubscriberInitExt,
        EnvFilter,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_filter_string()));

    let (writer, ansi) = match log_destination(cli).map(|path| open_log_file(&path)) {
        Some(Ok(file)) => (BoxMakeWriter::new(std::sync::Mutex::new(file)), false),
        Some(Err(e)) => {
            eprintln!("Warning: Could not open log file: {e}");
            (BoxMakeWriter::new(io::sink), false)
        }
        None => (BoxMakeWriter::new(io::stderr), true),
    };

    let result = match cli.log_format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_span_events(FmtSpan::CLOSE)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(writer);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_target(false)
                .with_ansi(ansi)
                .with_writer(writer);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .pretty()
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(ansi)
                .with_writer(writer);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
        LogFormat::Text => {
            let layer = fmt::layer().with_ansi(ansi).with_writer(writer);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
        }
    };

    if let Err(e) = result {
        eprintln!("Warning: Could not initialize logging: {e}");
    }
}

fn open_log_file(path: &std::path::Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| PulseError::io(format!("failed to create {}", parent.display()), e))?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| PulseError::io(format!("failed to open {}", path.display()), e))
}

/// Run the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli);

    match &cli.command {
        Some(Commands::Completions(args)) => {
            generate_completions(args.shell);
            Ok(())
        }
        Some(Commands::Config(args)) => commands::config::run(&cli, args),
        command => {
            let ctx = Context::open(&cli)?;
            let mut out = io::stdout().lock();
            match command {
                Some(Commands::Log(args)) => commands::log::run(&cli, args, &ctx, &mut out),
                Some(Commands::Start(args)) => commands::timer::start(args, &ctx, &mut out),
                Some(Commands::Stop(args)) => commands::timer::stop(args, &ctx, &mut out),
                Some(Commands::List(args)) => commands::list::run(args, &ctx, &mut out),
                Some(Commands::Search(args)) => commands::search::run(args, &ctx, &mut out),
                Some(Commands::Edit(args)) => commands::edit::run(args, &ctx, &mut out),
                Some(Commands::Delete(args)) => commands::delete::run(&cli, args, &ctx, &mut out),
                Some(Commands::Summary) => commands::summary::run(&ctx, &mut out),
                _ => {
                    drop(out);
                    commands::tui::run(ctx)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_is_interactive() {
        let cli = Cli::try_parse_from(["pulse"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.is_interactive());

        let cli = Cli::try_parse_from(["pulse", "log", "hello"]).unwrap();
        assert!(!cli.is_interactive());
    }

    #[test]
    fn test_log_joins_words() {
        let cli =
            Cli::try_parse_from(["pulse", "log", "-c", "task", "fix", "the", "bug", "-p", "api"])
                .unwrap();
        let Some(Commands::Log(args)) = cli.command else {
            panic!("expected log command");
        };
        assert_eq!(args.text.join(" "), "fix the bug");
        assert_eq!(args.category, "task");
        assert_eq!(args.project, "api");
    }

    #[test]
    fn test_list_defaults() {
        let cli = Cli::try_parse_from(["pulse", "list"]).unwrap();
        let Some(Commands::List(args)) = cli.command else {
            panic!("expected list command");
        };
        assert_eq!(args.limit, 50);
        assert_eq!(args.page, 1);
        assert_eq!(args.format, OutputFormat::Default);
    }

    #[test]
    fn test_since_conflicts_with_preset() {
        let result = Cli::try_parse_from(["pulse", "list", "--since", "today", "--preset", "week"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_db_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["pulse", "summary", "--db", "/tmp/x.db"]).unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
    }

    #[test]
    fn test_log_format_variants() {
        assert_eq!(LogFormat::default(), LogFormat::Text);
        assert!(matches!(LogFormat::Json, LogFormat::Json));
        assert!(matches!(LogFormat::Compact, LogFormat::Compact));
        assert!(matches!(LogFormat::Pretty, LogFormat::Pretty));
    }

    #[test]
    fn test_log_level_to_filter() {
        assert_eq!(LogLevel::Error.to_filter_string(), "error");
        assert_eq!(LogLevel::Warn.to_filter_string(), "warn");
        assert_eq!(LogLevel::Info.to_filter_string(), "info");
        assert_eq!(LogLevel::Debug.to_filter_string(), "debug");
        assert_eq!(LogLevel::Trace.to_filter_string(), "trace");
    }

    #[test]
    fn test_log_destination() {
        let cli = Cli::try_parse_from(["pulse", "list"]).unwrap();
        assert_eq!(log_destination(&cli), None);

        let cli = Cli::try_parse_from(["pulse", "list", "--log-file", "/tmp/p.log"]).unwrap();
        assert_eq!(log_destination(&cli), Some(PathBuf::from("/tmp/p.log")));
    }
}
