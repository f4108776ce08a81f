//! Colored terminal rendering for plans and reports.

use icsync_core::{ApplyReport, DiffKind, LoadedCalendar, RecordDiff, SyncPlan, WriteFailure};
use owo_colors::OwoColorize;

/// Show counts instead of individual records above this many writes.
const COMPACT_THRESHOLD: usize = 5;

pub trait Render {
    fn render(&self) -> String;
}

fn colorize_diff(kind: DiffKind, text: &str) -> String {
    match kind {
        DiffKind::Create => text.green().to_string(),
        DiffKind::Update => text.yellow().to_string(),
        DiffKind::Skip => text.dimmed().to_string(),
    }
}

impl Render for DiffKind {
    fn render(&self) -> String {
        colorize_diff(*self, &self.to_string())
    }
}

impl Render for RecordDiff {
    fn render(&self) -> String {
        let title = colorize_diff(self.kind, &self.record.to_string());
        let start = self.record.start.format("%Y-%m-%d %H:%M").to_string();
        format!("{} {} {}", self.kind.render(), title, start.dimmed())
    }
}

impl Render for WriteFailure {
    fn render(&self) -> String {
        let attempts = format!(
            "(after {} {})",
            self.attempts,
            pluralize("attempt", self.attempts as usize)
        );
        format!(
            "   {} {} {}: {} {}",
            "!".red(),
            self.kind,
            self.uid,
            self.message.red(),
            attempts.dimmed()
        )
    }
}

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else if word.ends_with("ch") {
        format!("{word}es")
    } else {
        format!("{word}s")
    }
}

/// One line per write, or counts when there are many and `verbose` is off.
pub fn render_plan(plan: &SyncPlan, verbose: bool) -> String {
    let counts = plan.counts();
    let writes = counts.create + counts.update;
    let mut lines = Vec::new();

    if writes == 0 {
        lines.push("   No changes".dimmed().to_string());
    } else if verbose || writes <= COMPACT_THRESHOLD {
        for diff in plan.writes() {
            lines.push(format!("   {}", diff.render()));
        }
    } else {
        if counts.create > 0 {
            let label = format!("({} new {})", counts.create, pluralize("match", counts.create));
            lines.push(format!("   {} {}", "+".green(), label.green()));
        }
        if counts.update > 0 {
            let label = format!("({} changed)", counts.update);
            lines.push(format!("   {} {}", "~".yellow(), label.yellow()));
        }
    }

    if verbose {
        for diff in plan.diffs.iter().filter(|d| d.kind == DiffKind::Skip) {
            lines.push(format!("   {}", diff.render()));
        }
    } else if counts.skip > 0 {
        lines.push(format!("   {}", format!("({} unchanged)", counts.skip).dimmed()));
    }

    lines.join("\n")
}

/// Summary line printed at the end of a sync.
pub fn render_summary(report: &ApplyReport, loaded: &LoadedCalendar, plan: &SyncPlan) -> String {
    format!(
        "OK: created={}, updated={}, skipped={}, failed={}, total_ics_events={}, total_remote_rows={}",
        report.created,
        report.updated,
        report.skipped,
        report.failures.len(),
        loaded.total_events,
        plan.total_remote_rows
    )
}

/// Events dropped before reconciliation, if any.
pub fn render_dropped(loaded: &LoadedCalendar) -> Option<String> {
    let mut lines = Vec::new();

    if loaded.without_uid > 0 {
        lines.push(format!(
            "Skipped {} {} without UID",
            loaded.without_uid,
            pluralize("event", loaded.without_uid)
        ));
    }
    if !loaded.missing_start.is_empty() {
        lines.push(format!(
            "Skipped {} {} without a usable start time: {}",
            loaded.missing_start.len(),
            pluralize("event", loaded.missing_start.len()),
            loaded.missing_start.join(", ")
        ));
    }

    (!lines.is_empty()).then(|| lines.join("\n").yellow().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("event", 1), "event");
        assert_eq!(pluralize("attempt", 3), "attempts");
        assert_eq!(pluralize("match", 2), "matches");
    }

    #[test]
    fn test_summary_line_format() {
        let report = ApplyReport {
            created: 2,
            updated: 1,
            skipped: 7,
            failures: Vec::new(),
        };
        let loaded = LoadedCalendar {
            total_events: 11,
            ..LoadedCalendar::default()
        };
        let plan = SyncPlan {
            diffs: Vec::new(),
            total_remote_rows: 40,
        };

        assert_eq!(
            render_summary(&report, &loaded, &plan),
            "OK: created=2, updated=1, skipped=7, failed=0, total_ics_events=11, total_remote_rows=40"
        );
    }

    #[test]
    fn test_nothing_dropped_renders_nothing() {
        assert!(render_dropped(&LoadedCalendar::default()).is_none());
    }
}
