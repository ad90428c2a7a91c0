//! `check` command
//!
//! Validates every built-in flow and runs the doctor over it.

use anyhow::{bail, Result};

use crate::cli::display::{print_error, render_diagnostic_report};
use crate::doctor::{diagnose_flow, DiagnosticReport};
use crate::flows::definition::{build_post, list_interactive, status_post};
use crate::flows::types::FlowDefinition;
use crate::flows::validate::{validate, ValidationError};

/// Outcome of checking one flow.
#[derive(Debug)]
pub struct FlowCheck {
    /// Flow id
    pub flow: String,
    /// Validation failure, if any
    pub validation: Option<ValidationError>,
    /// Doctor findings
    pub report: DiagnosticReport,
}

impl FlowCheck {
    /// True when the flow is unusable.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.validation.is_some() || self.report.error_count() > 0
    }
}

fn check_flow<C, H>(definition: &FlowDefinition<C, H>) -> FlowCheck {
    FlowCheck {
        flow: definition.id.clone(),
        validation: validate(definition).err(),
        report: diagnose_flow(definition),
    }
}

/// Check every built-in flow.
#[must_use]
pub fn check_builtin_flows() -> Vec<FlowCheck> {
    vec![
        check_flow(&list_interactive()),
        check_flow(&build_post()),
        check_flow(&status_post()),
    ]
}

/// `jenkins-flow check`
pub fn run() -> Result<()> {
    let checks = check_builtin_flows();
    for check in &checks {
        if let Some(err) = &check.validation {
            print_error(&err.to_string());
        }
        eprint!("{}", render_diagnostic_report(&check.flow, &check.report));
    }

    let failing = checks.iter().filter(|c| c.has_errors()).count();
    if failing > 0 {
        bail!("{failing} flow(s) failed checks");
    }
    Ok(())
}
