//! Terminal display
//!
//! Status lines, job listings and doctor reports. Everything goes to stderr
//! except the job listing, so `list --non-interactive` can be piped.

use colored::Colorize;

use crate::doctor::{DiagnosticReport, Severity};
use crate::jobs::{Job, JobAction};

/// Print a success line.
pub fn print_ok(message: &str) {
    eprintln!("  {} {}", "✓".green().bold(), message);
}

/// Print an error line.
pub fn print_error(message: &str) {
    eprintln!("  {} {}", "✗".red().bold(), message.red());
}

/// Print a dimmed hint under an error.
pub fn print_hint(message: &str) {
    eprintln!("    {} {}", "hint:".dimmed(), message.dimmed());
}

/// Header printed before an action command runs.
pub fn print_action_header(action: JobAction, job: &Job) {
    eprintln!(
        "\n{} {}",
        "===".bold().cyan(),
        format!("{action}: {}", job.display_name()).bold().cyan()
    );
}

/// Print jobs to stdout, one per line: display name then URL.
pub fn print_jobs(jobs: &[Job]) {
    if jobs.is_empty() {
        eprintln!("  {}", "No jobs match.".dimmed());
        return;
    }
    let width = jobs
        .iter()
        .map(|job| job.display_name().chars().count())
        .max()
        .unwrap_or(0);
    for job in jobs {
        println!("{}", format_job_line(job, width));
    }
}

fn format_job_line(job: &Job, width: usize) -> String {
    format!("{:<width$}  {}", job.display_name(), job.url)
}

/// Render a doctor report as human-readable text.
#[must_use]
pub fn render_diagnostic_report(flow: &str, report: &DiagnosticReport) -> String {
    let mut out = String::new();
    if report.is_clean() {
        out.push_str(&format!("  {} {}\n", "✓".green().bold(), flow.bold()));
        return out;
    }

    out.push_str(&format!(
        "  {} {} ({} errors, {} warnings, {} info)\n",
        if report.error_count() > 0 {
            "✗".red().bold()
        } else {
            "•".yellow().bold()
        },
        flow.bold(),
        report.error_count(),
        report.warning_count(),
        report.info_count()
    ));
    for finding in &report.findings {
        let tag = match finding.severity {
            Severity::Error => finding.code.red().bold(),
            Severity::Warning => finding.code.yellow().bold(),
            Severity::Info => finding.code.blue(),
        };
        out.push_str(&format!("    {tag} {}\n", finding.message));
        if let Some(suggestion) = &finding.suggestion {
            out.push_str(&format!("         {}\n", suggestion.dimmed()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctor::Finding;
    use crate::testutil::make_job;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_format_job_line_pads_name() {
        let line = format_job_line(&make_job("api"), 6);
        assert_eq!(line, "api     https://jenkins.example.com/job/api/");
    }

    #[test]
    fn test_render_clean_report() {
        plain();
        let report = DiagnosticReport {
            findings: Vec::new(),
        };
        let out = render_diagnostic_report("build_post", &report);
        assert!(out.contains("build_post"));
        assert!(!out.contains("errors"));
    }

    #[test]
    fn test_render_report_with_findings() {
        plain();
        let report = DiagnosticReport {
            findings: vec![
                Finding {
                    severity: Severity::Error,
                    code: "F001".to_string(),
                    message: "State \"x\" has neither prompt nor entry handler".to_string(),
                    suggestion: Some("Add a prompt".to_string()),
                },
                Finding {
                    severity: Severity::Info,
                    code: "F007".to_string(),
                    message: "No root state".to_string(),
                    suggestion: None,
                },
            ],
        };
        let out = render_diagnostic_report("demo", &report);
        assert!(out.contains("1 errors, 0 warnings, 1 info"));
        assert!(out.contains("F001 State \"x\""));
        assert!(out.contains("Add a prompt"));
        assert!(out.contains("F007 No root state"));
    }

    #[test]
    fn test_print_helpers_no_panic() {
        print_ok("done");
        print_error("failed");
        print_hint("check the config");
        print_action_header(JobAction::Build, &make_job("api"));
        print_jobs(&[]);
    }
}
