//! Rendering of reports, plans and summaries

use chrono::{DateTime, Utc};
use console::style;
use driftsync_diff::ComparisonReport;
use driftsync_engine::{ActionKind, ActionReason, ExecutionSummary, UpdatePlan};
use std::time::Duration;

/// Display a comparison report as a summary table
pub fn display_report(report: &ComparisonReport) {
    println!();
    println!("{}", style("Drift Summary:").bold().underlined());
    println!("  Source: {}", style(report.source_root.display()).cyan());
    println!(
        "  Destination: {}",
        style(report.destination_root.display()).cyan()
    );
    println!(
        "  Scanned: {}",
        style(format_timestamp(&report.scanned_at)).dim()
    );
    println!(
        "  Deep scan: {}",
        style(if report.deep_scan { "yes" } else { "no" }).dim()
    );
    println!("  New files: {}", style(report.new.len()).green());
    println!(
        "  Modified files: {}",
        style(report.modified.len()).yellow()
    );
    println!(
        "  Unchanged files: {}",
        style(report.unchanged.len()).dim()
    );
    println!(
        "  Missing from source: {}",
        style(report.missing.len()).cyan()
    );
    if report.deep_scan {
        println!(
            "  Relocated files: {}",
            style(report.relocated.len()).cyan()
        );
        println!(
            "  Duplicate files: {}",
            style(report.duplicates.len()).yellow()
        );
    }

    let pending: u64 = report.new.iter().map(|r| r.size).sum::<u64>()
        + report.modified.iter().map(|p| p.source.size).sum::<u64>();
    println!("  Data to copy: {}", style(format_bytes(pending)).blue());

    let warnings = report.source_warnings.len() + report.destination_warnings.len();
    println!(
        "  Warnings: {}",
        if warnings > 0 {
            style(warnings).red()
        } else {
            style(warnings).green()
        }
    );
}

/// Display individual scan warnings below the summary
pub fn display_warnings(report: &ComparisonReport) {
    for warning in report
        .source_warnings
        .iter()
        .chain(report.destination_warnings.iter())
    {
        println!("  {} {}", style("⚠").yellow().bold(), style(warning).yellow());
    }
}

/// Display a plan without executing it
pub fn display_plan(plan: &UpdatePlan) {
    println!();
    println!("{}", style("Planned actions:").bold().underlined());
    for action in &plan.actions {
        let kind = match action.kind {
            ActionKind::Copy => style("copy   ").green(),
            ActionKind::CopyToAlternate => style("copy*  ").green(),
            ActionKind::Skip => style("skip   ").yellow(),
            ActionKind::Confirm => style("ask    ").cyan(),
        };
        println!(
            "  {} {} ({})",
            kind,
            style(&action.relative).cyan(),
            reason_label(action.reason)
        );
        if let Some(note) = &action.note {
            println!("          {}", style(note).dim());
        }
    }
    println!(
        "  {} action(s): {} copies, {} skips, {} confirmations",
        plan.len(),
        plan.copies(),
        plan.skips(),
        plan.confirms()
    );
}

/// Display the outcome of an update run
pub fn display_execution_summary(summary: &ExecutionSummary) {
    println!();
    println!("{}", style("Update Results:").bold().underlined());
    println!("  Copied: {}", style(summary.copied).green());
    println!("  Skipped: {}", style(summary.skipped).yellow());
    println!(
        "  Failed: {}",
        if summary.failed > 0 {
            style(summary.failed).red()
        } else {
            style(summary.failed).green()
        }
    );
    println!(
        "  Duration: {}",
        style(format_duration(summary.elapsed)).blue()
    );
    if summary.cancelled {
        println!("  {}", style("Run cancelled before completion").yellow());
    }
}

/// Display a success message with proper formatting
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), style(message).green());
}

/// Display a warning message with proper formatting
pub fn display_warning(message: &str) {
    println!("{} {}", style("⚠").yellow().bold(), style(message).yellow());
}

/// Display an error message with proper formatting
pub fn display_error(message: &str) {
    println!("{} {}", style("✗").red().bold(), style(message).red());
}

/// Display an info message with proper formatting
pub fn display_info(message: &str) {
    println!("{} {}", style("ℹ").blue().bold(), style(message).blue());
}

fn reason_label(reason: ActionReason) -> &'static str {
    match reason {
        ActionReason::New => "new",
        ActionReason::Modified => "modified",
        ActionReason::Duplicate => "duplicate",
        ActionReason::Relocated => "relocated",
    }
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Format bytes in human-readable form
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}

/// Format a duration in human-readable form
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{:.2}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
