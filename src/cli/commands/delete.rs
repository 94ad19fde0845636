//! Delete command implementation.

use std::io::Write;

use crate::cli::{Cli, DeleteArgs};
use crate::error::Result;

use super::Context;

/// Run the delete command.
pub fn run<W: Write>(cli: &Cli, args: &DeleteArgs, ctx: &Context, out: &mut W) -> Result<()> {
    let promoted = ctx.store.delete(args.id)?;
    if cli.quiet {
        return Ok(());
    }
    match promoted {
        Some(root) => writeln!(
            out,
            "Entry {} deleted. Entry {root} now starts the thread.",
            args.id
        )?,
        None => writeln!(out, "Entry {} deleted.", args.id)?,
    }
    Ok(())
}
