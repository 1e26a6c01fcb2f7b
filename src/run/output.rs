//! Human-readable rendering of check results.

use std::fmt::Write;

use colored::*;

use super::CheckSummary;
use crate::domain::FailureReport;
use crate::redundant::HostReport;

/// Renders a summary as one block per host followed by a totals line.
pub fn render_plain(summary: &CheckSummary) -> String {
    let mut out = String::new();
    for report in &summary.reports {
        render_host(&mut out, report);
    }
    let _ = writeln!(
        out,
        "{} host{} checked in {:.1}s: {} valid, {} invalid, {} eligible for HTTPS",
        summary.total_hosts,
        if summary.total_hosts == 1 { "" } else { "s" },
        summary.elapsed_seconds,
        summary.valid.to_string().green(),
        summary.invalid.to_string().red(),
        summary.https_eligible
    );
    out
}

fn render_host(out: &mut String, report: &HostReport) {
    let name = report.host.as_deref().unwrap_or(&report.input);
    match &report.reason {
        None => {
            let _ = writeln!(
                out,
                "{} {} ({} name servers)",
                "✔".green(),
                name.bold(),
                report.winning_nameservers
            );
        }
        Some(reason) => {
            let _ = writeln!(out, "{} {}", "✘".red(), name.bold());
            render_failure(out, reason);
        }
    }

    match (&report.reason, &report.https_error) {
        (_, None) => {
            let _ = writeln!(out, "  HTTPS: {}", "eligible".green());
        }
        // Same failure already shown above
        (Some(reason), Some(error)) if reason.kind == error.kind => {
            let _ = writeln!(out, "  HTTPS: {}", "not eligible".yellow());
        }
        (_, Some(error)) => {
            let _ = writeln!(out, "  HTTPS: {}", "not eligible".yellow());
            render_failure(out, error);
        }
    }
}

fn render_failure(out: &mut String, failure: &FailureReport) {
    let _ = writeln!(out, "  {}", failure.message);
    let _ = writeln!(out, "  {}", failure.documentation_url.dimmed());
}
