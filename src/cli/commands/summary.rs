//! Summary command implementation.

use std::io::Write;

use chrono::Utc;

use crate::error::Result;
use crate::util::dateparse::Preset;

use super::Context;

/// Print today's per-category counts and minutes with a TOTAL row.
pub fn run<W: Write>(ctx: &Context, out: &mut W) -> Result<()> {
    let (start, end) = Preset::Today.range(ctx.now, &ctx.zone);
    let rows = ctx
        .store
        .category_summary(start.with_timezone(&Utc), end.with_timezone(&Utc))?;

    writeln!(out, "Today ({}):", start.format("%Y-%m-%d"))?;
    let (mut items, mut minutes) = (0, 0);
    for row in &rows {
        writeln!(
            out,
            "  {:<10} {:>3} items, {:>4} mins",
            row.category, row.items, row.minutes
        )?;
        items += row.items;
        minutes += row.minutes;
    }
    writeln!(out, "  {:<10} {items:>3} items, {minutes:>4} mins", "TOTAL")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::testing::{context, text};
    use crate::model::NewEntry;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_summary_totals_today_only() {
        let ctx = context();
        let now = ctx.now_utc();
        let add = |category: &str, minutes: Option<i64>, at| {
            let mut entry = NewEntry::new(category, "x").at(at);
            entry.duration_minutes = minutes;
            ctx.store.insert(&entry).unwrap();
        };
        add("timer", Some(25), now - Duration::hours(1));
        add("timer", Some(50), now - Duration::hours(2));
        add("task", None, now - Duration::hours(3));
        add("task", None, now - Duration::days(1));

        let mut buf = Vec::new();
        run(&ctx, &mut buf).unwrap();
        assert_eq!(
            text(buf),
            "Today (2025-06-11):\n\
             \x20 timer        2 items,   75 mins\n\
             \x20 task         1 items,    0 mins\n\
             \x20 TOTAL        3 items,   75 mins\n"
        );
    }

    #[test]
    fn test_empty_day_prints_zero_total() {
        let ctx = context();
        let mut buf = Vec::new();
        run(&ctx, &mut buf).unwrap();
        assert_eq!(
            text(buf),
            "Today (2025-06-11):\n  TOTAL        0 items,    0 mins\n"
        );
    }
}
