//! Edit command implementation.

use std::io::Write;

use crate::cli::EditArgs;
use crate::error::Result;
use crate::model::{split_tags, validate_category, EntryUpdate};

use super::Context;

/// Run the edit command. Fields left out keep their stored values.
pub fn run<W: Write>(args: &EditArgs, ctx: &Context, out: &mut W) -> Result<()> {
    let update = EntryUpdate {
        text: args.message.clone(),
        project: args.project.as_deref().map(|p| p.trim().to_string()),
        tags: args.tags.as_deref().map(split_tags),
        category: args.category.as_deref().map(validate_category).transpose()?,
        duration_minutes: None,
    };
    ctx.store.update(args.id, &update)?;
    writeln!(out, "Entry {} updated successfully.", args.id)?;
    Ok(())
}
