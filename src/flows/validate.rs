//! Flow definition validator
//!
//! Static checks run once per definition before its first use. A definition
//! that passes is wrapped in a `ValidatedFlow`, the only form the runner
//! accepts.

use std::collections::{HashMap, HashSet, VecDeque};

use thiserror::Error;

use super::types::{FlowDefinition, PromptSpec, StateDefinition, Target};

/// A structural defect in a flow definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Two states share an id.
    #[error("Flow {flow} declares state \"{state}\" more than once.")]
    DuplicateState {
        /// Flow id.
        flow: String,
        /// Repeated state id.
        state: String,
    },

    /// The initial state is not declared.
    #[error("Flow {flow} has unknown initial state \"{state}\".")]
    UnknownInitialState {
        /// Flow id.
        flow: String,
        /// Missing initial state id.
        state: String,
    },

    /// A state has an empty transition table.
    #[error("Flow {flow} state \"{state}\" has no transitions.")]
    NoTransitions {
        /// Flow id.
        flow: String,
        /// Offending state id.
        state: String,
    },

    /// A transition key is empty or blank.
    #[error("Flow {flow} state \"{state}\" has an empty transition key.")]
    EmptyTransitionKey {
        /// Flow id.
        flow: String,
        /// Offending state id.
        state: String,
    },

    /// A static select prompt repeats an option value.
    #[error("Flow {flow} state \"{state}\" has duplicate option value \"{value}\".")]
    DuplicateOption {
        /// Flow id.
        flow: String,
        /// Offending state id.
        state: String,
        /// Repeated option value.
        value: String,
    },

    /// A transition points at something that is neither a state nor a terminal tag.
    #[error(
        "Flow {flow} state \"{state}\" transitions to unknown target \"{target}\" for event \"{event}\"."
    )]
    UnknownTarget {
        /// Flow id.
        flow: String,
        /// Offending state id.
        state: String,
        /// Event whose target is unknown.
        event: String,
        /// The unknown target.
        target: String,
    },

    /// No terminal tag can be reached from the initial state.
    #[error("Flow {flow} has no reachable terminal state from \"{initial}\".")]
    NoReachableTerminal {
        /// Flow id.
        flow: String,
        /// Initial state id.
        initial: String,
    },
}

/// Check a definition. Returns the first defect found.
///
/// Checks run in a fixed order: unique state ids, initial state, then per
/// state (in declaration order) transition tables, static option values and
/// targets, and finally terminal reachability.
pub fn validate<C, H>(definition: &FlowDefinition<C, H>) -> Result<(), ValidationError> {
    let flow = definition.id.as_str();

    let mut state_ids = HashSet::new();
    for state in &definition.states {
        if !state_ids.insert(state.id.as_str()) {
            return Err(ValidationError::DuplicateState {
                flow: flow.to_string(),
                state: state.id.clone(),
            });
        }
    }

    if !state_ids.contains(definition.initial_state.as_str()) {
        return Err(ValidationError::UnknownInitialState {
            flow: flow.to_string(),
            state: definition.initial_state.clone(),
        });
    }

    for state in &definition.states {
        check_state(flow, state, &state_ids)?;
    }

    if !terminal_reachable(definition) {
        return Err(ValidationError::NoReachableTerminal {
            flow: flow.to_string(),
            initial: definition.initial_state.clone(),
        });
    }

    Ok(())
}

fn check_state<C, H>(
    flow: &str,
    state: &StateDefinition<C, H>,
    state_ids: &HashSet<&str>,
) -> Result<(), ValidationError> {
    if state.transitions.is_empty() {
        return Err(ValidationError::NoTransitions {
            flow: flow.to_string(),
            state: state.id.clone(),
        });
    }

    if let Some(PromptSpec::Select { options, .. }) = &state.prompt {
        // Computed option lists depend on the context and are checked by nobody.
        if let Some(options) = options.as_static() {
            let mut seen = HashSet::new();
            for option in options {
                if !seen.insert(option.value.as_str()) {
                    return Err(ValidationError::DuplicateOption {
                        flow: flow.to_string(),
                        state: state.id.clone(),
                        value: option.value.clone(),
                    });
                }
            }
        }
    }

    for (event, target) in &state.transitions {
        if event.trim().is_empty() {
            return Err(ValidationError::EmptyTransitionKey {
                flow: flow.to_string(),
                state: state.id.clone(),
            });
        }
        if let Target::State(target_id) = target {
            if !state_ids.contains(target_id.as_str()) {
                return Err(ValidationError::UnknownTarget {
                    flow: flow.to_string(),
                    state: state.id.clone(),
                    event: event.clone(),
                    target: target_id.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Breadth-first walk from the initial state looking for any terminal edge.
fn terminal_reachable<C, H>(definition: &FlowDefinition<C, H>) -> bool {
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([definition.initial_state.as_str()]);

    while let Some(current) = queue.pop_front() {
        if !visited.insert(current) {
            continue;
        }
        let Some(state) = definition.find_state(current) else {
            continue;
        };
        for target in state.transitions.values() {
            match target {
                Target::Terminal(_) => return true,
                Target::State(next) => {
                    if !visited.contains(next.as_str()) {
                        queue.push_back(next);
                    }
                }
            }
        }
    }

    false
}

/// A definition that passed `validate`, with a state index for the runner.
pub struct ValidatedFlow<C, H> {
    definition: FlowDefinition<C, H>,
    index: HashMap<String, usize>,
}

impl<C, H> ValidatedFlow<C, H> {
    /// The validated definition.
    #[must_use]
    pub const fn definition(&self) -> &FlowDefinition<C, H> {
        &self.definition
    }

    /// Flow id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.definition.id
    }

    /// Look up a state by id.
    #[must_use]
    pub fn state(&self, id: &str) -> Option<&StateDefinition<C, H>> {
        self.index.get(id).map(|&i| &self.definition.states[i])
    }
}

impl<C, H> FlowDefinition<C, H> {
    /// Validate and wrap the definition for use by the runner.
    pub fn validate(self) -> Result<ValidatedFlow<C, H>, ValidationError> {
        validate(&self)?;
        let index = self
            .states
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
        Ok(ValidatedFlow {
            definition: self,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::types::{PromptOption, Resolvable};

    type Def = FlowDefinition<(), ()>;
    type State = StateDefinition<(), ()>;

    fn confirm_state(id: &str) -> State {
        State::new(id).prompt(PromptSpec::confirm("Again?"))
    }

    #[test]
    fn test_well_formed_flow_passes() {
        let def = Def::new("demo", "menu")
            .state(
                State::new("menu")
                    .root()
                    .prompt(PromptSpec::select(
                        "Pick",
                        vec![PromptOption::new("a", "A"), PromptOption::new("b", "B")],
                    ))
                    .on("select:a", "again")
                    .on("*", "exit_command"),
            )
            .state(
                confirm_state("again")
                    .on("confirm:yes", "menu")
                    .on("confirm:no", "complete"),
            );
        assert_eq!(validate(&def), Ok(()));
        assert!(def.validate().is_ok());
    }

    #[test]
    fn test_rejects_unknown_target_naming_state_and_target() {
        let def = Def::new("list_interactive", "start")
            .state(State::new("start").on("next", "missing_state"));
        let err = validate(&def).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownTarget {
                flow: "list_interactive".to_string(),
                state: "start".to_string(),
                event: "next".to_string(),
                target: "missing_state".to_string(),
            }
        );
        let message = err.to_string();
        assert!(message.contains("\"start\""));
        assert!(message.contains("\"missing_state\""));
    }

    #[test]
    fn test_rejects_unknown_initial_state() {
        let def = Def::new("demo", "nowhere").state(confirm_state("a").on("esc", "root"));
        assert!(matches!(
            validate(&def),
            Err(ValidationError::UnknownInitialState { state, .. }) if state == "nowhere"
        ));
    }

    #[test]
    fn test_rejects_empty_transition_table() {
        let def = Def::new("demo", "a")
            .state(confirm_state("a").on("esc", "b"))
            .state(confirm_state("b"));
        assert!(matches!(
            validate(&def),
            Err(ValidationError::NoTransitions { state, .. }) if state == "b"
        ));
    }

    #[test]
    fn test_rejects_blank_transition_key() {
        let def = Def::new("demo", "a").state(confirm_state("a").on("  ", "root"));
        assert!(matches!(
            validate(&def),
            Err(ValidationError::EmptyTransitionKey { .. })
        ));
    }

    #[test]
    fn test_rejects_duplicate_static_option_values() {
        let def = Def::new("demo", "a").state(
            State::new("a")
                .prompt(PromptSpec::select(
                    "Pick",
                    vec![PromptOption::new("x", "First"), PromptOption::new("x", "Second")],
                ))
                .on("*", "root"),
        );
        assert!(matches!(
            validate(&def),
            Err(ValidationError::DuplicateOption { value, .. }) if value == "x"
        ));
    }

    #[test]
    fn test_computed_options_are_not_checked_for_duplicates() {
        fn duplicated(_: &()) -> Vec<PromptOption> {
            vec![PromptOption::new("x", "1"), PromptOption::new("x", "2")]
        }
        let def = Def::new("demo", "a").state(
            State::new("a")
                .prompt(PromptSpec::select("Pick", Resolvable::Computed(duplicated)))
                .on("*", "root"),
        );
        assert_eq!(validate(&def), Ok(()));
    }

    #[test]
    fn test_rejects_duplicate_state_ids() {
        let def = Def::new("demo", "a")
            .state(confirm_state("a").on("esc", "root"))
            .state(confirm_state("a").on("esc", "exit_command"));
        assert!(matches!(
            validate(&def),
            Err(ValidationError::DuplicateState { state, .. }) if state == "a"
        ));
    }

    #[test]
    fn test_rejects_flow_that_only_cycles() {
        let def = Def::new("demo", "a")
            .state(confirm_state("a").on("confirm:yes", "b").on("esc", "a"))
            .state(confirm_state("b").on("esc", "a"));
        assert!(matches!(
            validate(&def),
            Err(ValidationError::NoReachableTerminal { initial, .. }) if initial == "a"
        ));
    }

    #[test]
    fn test_rejects_flow_whose_exit_is_unreachable() {
        // `island` can exit but nothing reaches it from `a`.
        let def = Def::new("demo", "a")
            .state(confirm_state("a").on("esc", "b"))
            .state(confirm_state("b").on("esc", "a"))
            .state(confirm_state("island").on("esc", "exit_command"));
        assert!(matches!(
            validate(&def),
            Err(ValidationError::NoReachableTerminal { .. })
        ));
    }

    #[test]
    fn test_validated_flow_indexes_states() {
        let flow = Def::new("demo", "a")
            .state(confirm_state("a").on("esc", "b"))
            .state(confirm_state("b").on("esc", "complete"))
            .validate()
            .unwrap();
        assert_eq!(flow.id(), "demo");
        assert_eq!(flow.state("b").map(|s| s.id.as_str()), Some("b"));
        assert!(flow.state("c").is_none());
    }
}
