//! Human-facing output for plans, diffs and deletes

use console::style;
use spinforge_platform::diff::LineType;
use spinforge_platform::{DeleteOutcome, ObjectRef, Outcome, ReconcileReport, SpecDiff};

pub fn print_diff(diff: &SpecDiff) {
    for (index, hunk) in diff.hunks.iter().enumerate() {
        if index > 0 {
            println!("{}", style("@@").cyan());
        }
        for line in hunk {
            match line.line_type {
                LineType::Added => println!("{}", style(format!("+{}", line.content)).green()),
                LineType::Removed => println!("{}", style(format!("-{}", line.content)).red()),
                LineType::Context => println!("{}", style(format!(" {}", line.content)).dim()),
            }
        }
    }
}

pub fn print_report(report: &ReconcileReport) {
    let object = &report.object;
    match (report.outcome, report.saved) {
        (Outcome::Unchanged, _) => {
            println!("{} {object}: no changes", style("=").dim());
        }
        (Outcome::New, true) => println!("{} {object}: created", style("+").green().bold()),
        (Outcome::New, false) => println!("{} {object}: will be created", style("+").green().bold()),
        (Outcome::Changed, true) => println!("{} {object}: updated", style("~").yellow().bold()),
        (Outcome::Changed, false) => println!("{} {object}: will be updated", style("~").yellow().bold()),
    }

    if let Some(diff) = &report.diff {
        print_diff(diff);
    }
}

pub fn print_summary(reports: &[ReconcileReport], dry_run: bool) {
    let count = |outcome: Outcome| reports.iter().filter(|r| r.outcome == outcome).count();
    let (new, changed, unchanged) = (count(Outcome::New), count(Outcome::Changed), count(Outcome::Unchanged));

    let verb = if dry_run { "Plan" } else { "Applied" };
    println!();
    println!(
        "{}: {} new, {} changed, {} unchanged",
        style(verb).bold(),
        style(new).green(),
        style(changed).yellow(),
        unchanged
    );
}

pub fn print_delete(object: &ObjectRef, outcome: DeleteOutcome) {
    match outcome {
        DeleteOutcome::Deleted => println!("{} {object}: deleted", style("-").red().bold()),
        DeleteOutcome::AlreadyAbsent => {
            println!("{} {object}: not found, nothing to delete", style("=").dim())
        }
    }
}
