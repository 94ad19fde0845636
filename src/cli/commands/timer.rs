//! Timer commands: `start` and `stop`.

use std::io::Write;

use crate::cli::{StartArgs, StopArgs};
use crate::error::Result;

use super::{joined, Context};

/// Start a timer entry.
pub fn start<W: Write>(args: &StartArgs, ctx: &Context, out: &mut W) -> Result<()> {
    let timer = ctx.store.start_timer(
        &joined(&args.text),
        &args.project,
        &args.tags,
        args.allow_multiple,
        ctx.now_utc(),
    )?;
    writeln!(
        out,
        "Timer #{} started at {}",
        timer.id,
        ctx.zone.localize(timer.timestamp).format("%H:%M")
    )?;
    Ok(())
}

/// Stop a running timer and record its duration.
pub fn stop<W: Write>(args: &StopArgs, ctx: &Context, out: &mut W) -> Result<()> {
    let timer = ctx
        .store
        .stop_timer(args.id, args.message.as_deref(), ctx.now_utc())?;
    let minutes = timer.duration_minutes.unwrap_or(0);
    writeln!(out, "Timer #{} stopped: {minutes} minutes", timer.id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::testing::{context, text};
    use crate::model::ACTIVE_TAG;
    use chrono::Duration;

    fn start_args(text: &str) -> StartArgs {
        StartArgs {
            text: vec![text.to_string()],
            project: "pulse".to_string(),
            tags: "deep".to_string(),
            allow_multiple: false,
        }
    }

    #[test]
    fn test_start_then_stop() {
        let ctx = context();
        let mut buf = Vec::new();
        start(&start_args("write docs"), &ctx, &mut buf).unwrap();
        assert_eq!(text(buf), "Timer #1 started at 14:30\n");

        let later = ctx.now + Duration::minutes(25);
        let ctx = ctx.at(later);
        let mut buf = Vec::new();
        let args = StopArgs {
            id: None,
            message: Some("done".to_string()),
        };
        stop(&args, &ctx, &mut buf).unwrap();
        assert_eq!(text(buf), "Timer #1 stopped: 25 minutes\n");

        let timer = ctx.store.get(1).unwrap();
        assert!(!timer.has_tag(ACTIVE_TAG));
        assert_eq!(timer.tags, vec!["deep"]);
        assert_eq!(timer.text, "write docs\nStop note: done");
    }

    #[test]
    fn test_second_start_needs_allow_multiple() {
        let ctx = context();
        start(&start_args("one"), &ctx, &mut Vec::new()).unwrap();
        assert!(start(&start_args("two"), &ctx, &mut Vec::new()).is_err());

        let mut args = start_args("two");
        args.allow_multiple = true;
        start(&args, &ctx, &mut Vec::new()).unwrap();
        assert_eq!(ctx.store.active_timers().unwrap().len(), 2);
    }

    #[test]
    fn test_stop_without_timers() {
        let ctx = context();
        let args = StopArgs {
            id: None,
            message: None,
        };
        let err = stop(&args, &ctx, &mut Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "no active timers");
    }
}
