//! Log command implementation.

use std::io::Write;

use crate::cli::{Cli, LogArgs};
use crate::error::Result;
use crate::model::NewEntry;

use super::{joined, Context};

/// Run the log command.
pub fn run<W: Write>(cli: &Cli, args: &LogArgs, ctx: &Context, out: &mut W) -> Result<()> {
    let entry = NewEntry::new(&args.category, joined(&args.text))
        .project(&args.project)
        .tags_csv(&args.tags)
        .at(ctx.now_utc());
    let id = ctx.store.insert(&entry)?;
    tracing::info!(id, category = %args.category, "logged entry");

    if cli.verbose {
        writeln!(out, "Saved entry #{id}.")?;
    } else if !cli.quiet {
        writeln!(out, "Saved.")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::testing::{context, text};
    use crate::cli::Commands;
    use clap::Parser;

    fn cli(args: &[&str]) -> (Cli, LogArgs) {
        let mut cli = Cli::try_parse_from(args).unwrap();
        let Some(Commands::Log(log)) = cli.command.take() else {
            panic!("expected log command");
        };
        (cli, log)
    }

    #[test]
    fn test_log_saves_entry() {
        let ctx = context();
        let (cli, args) = cli(&["pulse", "log", "-c", "Task", "-p", "api", "-t", "a, b", "ship", "it"]);
        let mut buf = Vec::new();
        run(&cli, &args, &ctx, &mut buf).unwrap();
        assert_eq!(text(buf), "Saved.\n");

        let entries = ctx.store.list(&Default::default(), 10, 0).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].text, "ship it");
        assert_eq!(entries[0].category, "task");
        assert_eq!(entries[0].project.as_deref(), Some("api"));
        assert_eq!(entries[0].tags, vec!["a", "b"]);
        assert_eq!(entries[0].timestamp, ctx.now_utc());
    }

    #[test]
    fn test_verbose_prints_id() {
        let ctx = context();
        let (cli, args) = cli(&["pulse", "-v", "log", "hello"]);
        let mut buf = Vec::new();
        run(&cli, &args, &ctx, &mut buf).unwrap();
        assert_eq!(text(buf), "Saved entry #1.\n");
    }

    #[test]
    fn test_blank_text_rejected() {
        let ctx = context();
        let (cli, args) = cli(&["pulse", "log", "   "]);
        let err = run(&cli, &args, &ctx, &mut Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "Text cannot be empty");
    }
}
