//! Flow doctor: lint pass over flow definitions
//!
//! Reports definitions that validate but are likely wrong. Returns a
//! structured report with categories: errors (must fix), warnings (should
//! fix), info (suggestions). Nothing here blocks a run.

use std::collections::{BTreeSet, HashSet, VecDeque};

use crate::flows::types::{
    select_event, FlowDefinition, PromptSpec, StateDefinition, Target, CONFIRM_NO_EVENT,
    CONFIRM_YES_EVENT, ESC_EVENT, TEXT_SUBMIT_EVENT, WILDCARD_EVENT,
};

/// Severity level for a diagnostic finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Severity {
    /// Must fix: the flow will fail at runtime
    Error,
    /// Should fix: dead or dangerous definition
    Warning,
    /// Suggestion
    Info,
}

/// A single diagnostic finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Severity of the finding
    pub severity: Severity,
    /// Short code for the finding (e.g., "F001")
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Suggested fix (optional)
    pub suggestion: Option<String>,
}

/// Diagnostic report for one flow
#[derive(Debug, Clone)]
pub struct DiagnosticReport {
    /// All findings, in order of severity (errors first)
    pub findings: Vec<Finding>,
}

impl DiagnosticReport {
    /// Returns true if the report has no findings at all
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Returns the number of errors
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.count(&Severity::Error)
    }

    /// Returns the number of warnings
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.count(&Severity::Warning)
    }

    /// Returns the number of info items
    #[must_use]
    pub fn info_count(&self) -> usize {
        self.count(&Severity::Info)
    }

    /// Codes of all findings, in report order
    #[must_use]
    pub fn codes(&self) -> Vec<&str> {
        self.findings.iter().map(|f| f.code.as_str()).collect()
    }

    fn count(&self, severity: &Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| &f.severity == severity)
            .count()
    }
}

/// Run all checks on a definition and return a report.
#[must_use]
pub fn diagnose_flow<C, H>(definition: &FlowDefinition<C, H>) -> DiagnosticReport {
    let mut findings = Vec::new();

    for state in &definition.states {
        check_state_shape(state, &mut findings);
        check_mechanical_events(state, &mut findings);
    }
    check_reachability(definition, &mut findings);
    check_root_marked(definition, &mut findings);

    findings.sort_by_key(|f| match f.severity {
        Severity::Error => 0,
        Severity::Warning => 1,
        Severity::Info => 2,
    });

    DiagnosticReport { findings }
}

/// F001-F003: prompt and handler combinations
fn check_state_shape<C, H>(state: &StateDefinition<C, H>, findings: &mut Vec<Finding>) {
    let has_prompt = state.prompt.is_some();
    let has_enter = state.on_enter.is_some();

    if !has_prompt && !has_enter {
        findings.push(Finding {
            severity: Severity::Error,
            code: "F001".to_string(),
            message: format!(
                "State '{}' has neither a prompt nor an entry handler",
                state.id
            ),
            suggestion: Some(
                "Entering it aborts the run; add a prompt or an entry handler".to_string(),
            ),
        });
    }

    if has_prompt && has_enter {
        findings.push(Finding {
            severity: Severity::Warning,
            code: "F002".to_string(),
            message: format!(
                "State '{}' has both a prompt and an entry handler; the prompt is never shown",
                state.id
            ),
            suggestion: Some(
                "Drop the prompt or move the entry logic to a select handler".to_string(),
            ),
        });
    }

    if state.on_select.is_some() && (has_enter || !has_prompt) {
        findings.push(Finding {
            severity: Severity::Warning,
            code: "F003".to_string(),
            message: format!("Select handler of state '{}' is never called", state.id),
            suggestion: None,
        });
    }
}

/// F005-F006: prompt states that rely on mechanical events
fn check_mechanical_events<C, H>(state: &StateDefinition<C, H>, findings: &mut Vec<Finding>) {
    if state.on_select.is_some() || state.on_enter.is_some() {
        return;
    }
    let Some(prompt) = &state.prompt else {
        return;
    };

    // `None` means any `select:` event is possible (computed options).
    let producible: Option<BTreeSet<String>> = match prompt {
        PromptSpec::Select { options, .. } => options
            .as_static()
            .map(|options| options.iter().map(|o| select_event(&o.value)).collect()),
        PromptSpec::Confirm { .. } => Some(BTreeSet::from([
            CONFIRM_YES_EVENT.to_string(),
            CONFIRM_NO_EVENT.to_string(),
        ])),
        PromptSpec::Text { .. } => Some(BTreeSet::from([TEXT_SUBMIT_EVENT.to_string()])),
    };

    for event in state.transitions.keys() {
        if event == ESC_EVENT || event == WILDCARD_EVENT {
            continue;
        }
        let fires = producible.as_ref().map_or_else(
            || event.starts_with("select:"),
            |events| events.contains(event),
        );
        if !fires {
            findings.push(Finding {
                severity: Severity::Info,
                code: "F005".to_string(),
                message: format!(
                    "Transition '{event}' of state '{}' can never fire from its {} prompt",
                    state.id,
                    prompt.kind()
                ),
                suggestion: Some(
                    "Add a select handler that produces it, or rename the key".to_string(),
                ),
            });
        }
    }

    if state.transitions.contains_key(WILDCARD_EVENT) {
        return;
    }
    if let PromptSpec::Select { options, .. } = prompt {
        for option in options.as_static().into_iter().flatten() {
            let event = select_event(&option.value);
            if !state.transitions.contains_key(&event) {
                findings.push(Finding {
                    severity: Severity::Warning,
                    code: "F006".to_string(),
                    message: format!(
                        "Option '{}' of state '{}' has no transition; picking it aborts the run",
                        option.value, state.id
                    ),
                    suggestion: Some(format!("Add a '{event}' or '*' transition")),
                });
            }
        }
    }
}

/// F004: states the initial state can never reach
fn check_reachability<C, H>(definition: &FlowDefinition<C, H>, findings: &mut Vec<Finding>) {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue = VecDeque::from([definition.initial_state.as_str()]);
    while let Some(current) = queue.pop_front() {
        if !visited.insert(current) {
            continue;
        }
        if let Some(state) = definition.find_state(current) {
            for target in state.transitions.values() {
                if let Target::State(next) = target {
                    queue.push_back(next);
                }
            }
        }
    }

    for state in &definition.states {
        if !visited.contains(state.id.as_str()) {
            findings.push(Finding {
                severity: Severity::Warning,
                code: "F004".to_string(),
                message: format!(
                    "State '{}' is unreachable from '{}'",
                    state.id, definition.initial_state
                ),
                suggestion: None,
            });
        }
    }
}

/// F007: nothing for an escape gesture to return to
fn check_root_marked<C, H>(definition: &FlowDefinition<C, H>, findings: &mut Vec<Finding>) {
    if !definition.states.iter().any(|s| s.root) {
        findings.push(Finding {
            severity: Severity::Info,
            code: "F007".to_string(),
            message: format!("Flow {} has no root state", definition.id),
            suggestion: Some("Mark the state escape should return to with `.root()`".to_string()),
        });
    }
}
