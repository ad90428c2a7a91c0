//! Flow definition types
//!
//! Declarative description of an interactive menu state machine: states,
//! prompts, transition tables and terminal tags. Pure data; validation lives
//! in `flows::validate` and interpretation in `flows::runner`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identifier of a state within one flow.
pub type StateId = String;

/// Identifier of an event produced by a prompt or a handler.
pub type EventId = String;

/// Event synthesized by the runner when the prompt adapter reports cancellation.
pub const ESC_EVENT: &str = "esc";

/// Transition key used when no exact event match exists.
pub const WILDCARD_EVENT: &str = "*";

/// Event produced by a confirm prompt answered with yes.
pub const CONFIRM_YES_EVENT: &str = "confirm:yes";

/// Event produced by a confirm prompt answered with no.
pub const CONFIRM_NO_EVENT: &str = "confirm:no";

/// Event produced by a submitted text prompt.
pub const TEXT_SUBMIT_EVENT: &str = "text:submit";

/// Build the mechanical event for a selected option value.
#[must_use]
pub fn select_event(value: &str) -> EventId {
    format!("select:{value}")
}

/// Reserved exit tags. Reaching one ends interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terminal {
    /// Leave the whole command.
    ExitCommand,
    /// Hand control back to an embedding flow.
    ReturnToCaller,
    /// Hand control back to an embedding flow, which should go to its root.
    ReturnToCallerRoot,
    /// Run the same flow again.
    Repeat,
    /// Go back to the caller's root menu.
    Root,
    /// Flow finished normally.
    Complete,
}

impl Terminal {
    /// Every terminal tag, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::ExitCommand,
        Self::ReturnToCaller,
        Self::ReturnToCallerRoot,
        Self::Repeat,
        Self::Root,
        Self::Complete,
    ];

    /// The tag as written in transition tables.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExitCommand => "exit_command",
            Self::ReturnToCaller => "return_to_caller",
            Self::ReturnToCallerRoot => "return_to_caller_root",
            Self::Repeat => "repeat",
            Self::Root => "root",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Terminal {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|t| t.as_str() == s).ok_or(())
    }
}

/// Where a transition leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Another state of the same flow.
    State(StateId),
    /// A terminal tag.
    Terminal(Terminal),
}

impl Target {
    /// Parse a transition target. Terminal tags take precedence over state ids.
    #[must_use]
    pub fn parse(target: &str) -> Self {
        target
            .parse::<Terminal>()
            .map_or_else(|()| Self::State(target.to_string()), Self::Terminal)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::State(id) => f.write_str(id),
            Self::Terminal(t) => write!(f, "{t}"),
        }
    }
}

impl From<&str> for Target {
    fn from(target: &str) -> Self {
        Self::parse(target)
    }
}

impl From<Terminal> for Target {
    fn from(terminal: Terminal) -> Self {
        Self::Terminal(terminal)
    }
}

/// A value that is either fixed or computed from the context on every visit.
pub enum Resolvable<C, T> {
    /// Fixed at definition time.
    Static(T),
    /// Recomputed from the current context each time the state is entered.
    Computed(fn(&C) -> T),
}

impl<C, T: Clone> Resolvable<C, T> {
    /// Evaluate against the current context.
    #[must_use]
    pub fn resolve(&self, context: &C) -> T {
        match self {
            Self::Static(value) => value.clone(),
            Self::Computed(f) => f(context),
        }
    }
}

impl<C, T> Resolvable<C, T> {
    /// The fixed value, if this is not context-computed.
    #[must_use]
    pub const fn as_static(&self) -> Option<&T> {
        match self {
            Self::Static(value) => Some(value),
            Self::Computed(_) => None,
        }
    }
}

impl<C, T> From<T> for Resolvable<C, T> {
    fn from(value: T) -> Self {
        Self::Static(value)
    }
}

impl<C> From<&str> for Resolvable<C, String> {
    fn from(value: &str) -> Self {
        Self::Static(value.to_string())
    }
}

impl<C, T: fmt::Debug> fmt::Debug for Resolvable<C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// One entry of a select prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptOption {
    /// Machine value, reported back by the adapter.
    pub value: String,
    /// Text shown to the operator.
    pub label: String,
}

impl PromptOption {
    /// Create an option from a value and label.
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// The three prompt primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Pick one option from a list.
    Select,
    /// Yes or no.
    Confirm,
    /// Free text.
    Text,
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Select => "select",
            Self::Confirm => "confirm",
            Self::Text => "text",
        })
    }
}

/// What a state asks the operator.
#[derive(Debug)]
pub enum PromptSpec<C> {
    /// Single-select menu.
    Select {
        /// Prompt message.
        message: Resolvable<C, String>,
        /// Menu entries.
        options: Resolvable<C, Vec<PromptOption>>,
    },
    /// Yes/no question.
    Confirm {
        /// Prompt message.
        message: Resolvable<C, String>,
        /// Preselected answer.
        initial_value: Option<Resolvable<C, bool>>,
    },
    /// Free-text input.
    Text {
        /// Prompt message.
        message: Resolvable<C, String>,
        /// Hint shown while the input is empty.
        placeholder: Option<Resolvable<C, String>>,
        /// Value used when the operator submits nothing.
        initial_value: Option<Resolvable<C, String>>,
    },
}

impl<C> PromptSpec<C> {
    /// A select prompt.
    pub fn select(
        message: impl Into<Resolvable<C, String>>,
        options: impl Into<Resolvable<C, Vec<PromptOption>>>,
    ) -> Self {
        Self::Select {
            message: message.into(),
            options: options.into(),
        }
    }

    /// A confirm prompt with no preselected answer.
    pub fn confirm(message: impl Into<Resolvable<C, String>>) -> Self {
        Self::Confirm {
            message: message.into(),
            initial_value: None,
        }
    }

    /// A text prompt with neither placeholder nor default.
    pub fn text(message: impl Into<Resolvable<C, String>>) -> Self {
        Self::Text {
            message: message.into(),
            placeholder: None,
            initial_value: None,
        }
    }

    /// Set the preselected answer of a confirm prompt. No-op for other kinds.
    #[must_use]
    pub fn with_initial_confirm(mut self, value: impl Into<Resolvable<C, bool>>) -> Self {
        if let Self::Confirm { initial_value, .. } = &mut self {
            *initial_value = Some(value.into());
        }
        self
    }

    /// Set the placeholder of a text prompt. No-op for other kinds.
    #[must_use]
    pub fn with_placeholder(mut self, value: impl Into<Resolvable<C, String>>) -> Self {
        if let Self::Text { placeholder, .. } = &mut self {
            *placeholder = Some(value.into());
        }
        self
    }

    /// Set the default value of a text prompt. No-op for other kinds.
    #[must_use]
    pub fn with_initial_text(mut self, value: impl Into<Resolvable<C, String>>) -> Self {
        if let Self::Text { initial_value, .. } = &mut self {
            *initial_value = Some(value.into());
        }
        self
    }

    /// Which primitive this prompt uses.
    #[must_use]
    pub const fn kind(&self) -> PromptKind {
        match self {
            Self::Select { .. } => PromptKind::Select,
            Self::Confirm { .. } => PromptKind::Confirm,
            Self::Text { .. } => PromptKind::Text,
        }
    }
}

/// A node of a flow graph.
#[derive(Debug)]
pub struct StateDefinition<C, H> {
    /// Unique within the flow.
    pub id: StateId,
    /// A state an escape gesture can safely return to.
    pub root: bool,
    /// Prompt shown when the state has no entry handler.
    pub prompt: Option<PromptSpec<C>>,
    /// Handler run on entry instead of prompting.
    pub on_enter: Option<H>,
    /// Handler that turns a prompt answer into an event.
    pub on_select: Option<H>,
    /// Event to target.
    pub transitions: BTreeMap<EventId, Target>,
}

impl<C, H> StateDefinition<C, H> {
    /// Start a state with no prompt, handlers or transitions.
    pub fn new(id: impl Into<StateId>) -> Self {
        Self {
            id: id.into(),
            root: false,
            prompt: None,
            on_enter: None,
            on_select: None,
            transitions: BTreeMap::new(),
        }
    }

    /// Mark the state as a root.
    #[must_use]
    pub const fn root(mut self) -> Self {
        self.root = true;
        self
    }

    /// Attach a prompt.
    #[must_use]
    pub fn prompt(mut self, prompt: PromptSpec<C>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Attach an entry handler.
    #[must_use]
    pub fn on_enter(mut self, handler: H) -> Self {
        self.on_enter = Some(handler);
        self
    }

    /// Attach a select handler.
    #[must_use]
    pub fn on_select(mut self, handler: H) -> Self {
        self.on_select = Some(handler);
        self
    }

    /// Add a transition. Later calls for the same event replace earlier ones.
    #[must_use]
    pub fn on(mut self, event: impl Into<EventId>, target: impl Into<Target>) -> Self {
        self.transitions.insert(event.into(), target.into());
        self
    }
}

/// A complete flow graph.
#[derive(Debug)]
pub struct FlowDefinition<C, H> {
    /// Flow identifier, used in every error message.
    pub id: String,
    /// State the runner starts in by default.
    pub initial_state: StateId,
    /// All states, in declaration order.
    pub states: Vec<StateDefinition<C, H>>,
}

impl<C, H> FlowDefinition<C, H> {
    /// Start an empty flow.
    pub fn new(id: impl Into<String>, initial_state: impl Into<StateId>) -> Self {
        Self {
            id: id.into(),
            initial_state: initial_state.into(),
            states: Vec::new(),
        }
    }

    /// Append a state.
    #[must_use]
    pub fn state(mut self, state: StateDefinition<C, H>) -> Self {
        self.states.push(state);
        self
    }

    /// Find a state by id (first match).
    #[must_use]
    pub fn find_state(&self, id: &str) -> Option<&StateDefinition<C, H>> {
        self.states.iter().find(|s| s.id == id)
    }
}

/// A coerced, non-cancelled prompt answer handed to select handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptValue {
    /// Answer of a select or text prompt.
    Text(String),
    /// Answer of a confirm prompt.
    Bool(bool),
}

impl PromptValue {
    /// String form. Booleans render as `true`/`false`.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
        }
    }

    /// Truthiness. Text is true when non-empty.
    #[must_use]
    pub fn as_bool(&self) -> bool {
        match self {
            Self::Text(s) => !s.is_empty(),
            Self::Bool(b) => *b,
        }
    }
}

/// Marker for per-flow handler id enums.
pub trait HandlerId: Copy + fmt::Debug + Send + Sync + 'static {
    /// Stable name used in logs and diagnostics.
    fn name(self) -> &'static str;
}

/// A handler registry: maps each handler id of a flow to behavior.
///
/// Implementations match exhaustively on `Id`, so a state can never name a
/// handler the registry lacks.
#[async_trait]
pub trait FlowHandlers: Send + Sync {
    /// Context threaded through the run.
    type Context: Send;
    /// Closed set of handler ids this registry answers to.
    type Id: HandlerId;

    /// Run a handler. Entry handlers receive `None` as input.
    async fn handle(
        &self,
        id: Self::Id,
        context: &mut Self::Context,
        input: Option<PromptValue>,
    ) -> Result<EventId>;
}

/// What a finished run hands back to the caller.
#[derive(Debug)]
pub struct FlowRunResult<C> {
    /// Terminal tag that ended the run.
    pub terminal: Terminal,
    /// State the terminal transition left from.
    pub state_id: StateId,
    /// The context, with every mutation made during the run.
    pub context: C,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_round_trips_through_str() {
        for terminal in Terminal::ALL {
            assert_eq!(terminal.as_str().parse::<Terminal>(), Ok(terminal));
        }
        assert!("exit".parse::<Terminal>().is_err());
    }

    #[test]
    fn test_target_parse_prefers_terminal() {
        assert_eq!(Target::parse("root"), Target::Terminal(Terminal::Root));
        assert_eq!(
            Target::parse("action_menu"),
            Target::State("action_menu".to_string())
        );
    }

    #[test]
    fn test_resolvable_computed_reads_context() {
        let value: Resolvable<u32, String> = Resolvable::Computed(|n: &u32| format!("n={n}"));
        assert_eq!(value.resolve(&3), "n=3");
        assert_eq!(value.resolve(&4), "n=4");
        assert!(value.as_static().is_none());
    }

    #[test]
    fn test_prompt_value_coercions() {
        assert_eq!(PromptValue::Bool(true).as_text(), "true");
        assert!(PromptValue::Text("x".to_string()).as_bool());
        assert!(!PromptValue::Text(String::new()).as_bool());
    }

    #[test]
    fn test_builder_replaces_duplicate_event() {
        let state: StateDefinition<(), ()> =
            StateDefinition::new("a").on("esc", "b").on("esc", "c");
        assert_eq!(state.transitions.len(), 1);
        assert_eq!(state.transitions["esc"], Target::State("c".to_string()));
    }

    #[test]
    fn test_prompt_builders_only_touch_matching_kind() {
        let prompt: PromptSpec<()> =
            PromptSpec::select("m", Vec::<PromptOption>::new()).with_initial_confirm(true);
        assert_eq!(prompt.kind(), PromptKind::Select);
        let prompt: PromptSpec<()> = PromptSpec::text("m").with_placeholder("e.g. api");
        match prompt {
            PromptSpec::Text { placeholder, .. } => {
                let placeholder = placeholder.and_then(|p| p.as_static().cloned());
                assert_eq!(placeholder.as_deref(), Some("e.g. api"));
            }
            _ => panic!("expected text prompt"),
        }
    }
}
