//! Flow runner
//!
//! Interprets a validated flow: resolves each state's prompt or entry
//! handler, turns the answer into an event, follows the transition table and
//! stops at the first terminal tag.

use thiserror::Error;
use tracing::debug;

use super::prompt::PromptAdapter;
use super::types::{
    select_event, EventId, FlowHandlers, FlowRunResult, HandlerId, PromptSpec, PromptValue,
    StateDefinition, Target, CONFIRM_NO_EVENT, CONFIRM_YES_EVENT, ESC_EVENT, TEXT_SUBMIT_EVENT,
    WILDCARD_EVENT,
};
use super::validate::ValidatedFlow;

/// A run aborted.
///
/// The first three variants mean the definition and its handlers disagree;
/// they are programming errors, not operator errors.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The runner was sent to a state the flow does not declare.
    #[error("Flow {flow} entered unknown state \"{state}\".")]
    UnknownState {
        /// Flow id.
        flow: String,
        /// Unknown state id.
        state: String,
    },

    /// A state has neither an entry handler nor a prompt.
    #[error("Flow {flow} state \"{state}\" has neither prompt nor entry handler.")]
    MissingPrompt {
        /// Flow id.
        flow: String,
        /// Offending state id.
        state: String,
    },

    /// No exact or wildcard transition for the event.
    #[error("Flow {flow} state \"{state}\" has no transition for event \"{event}\".")]
    UnhandledEvent {
        /// Flow id.
        flow: String,
        /// Current state id.
        state: String,
        /// Event that found no transition.
        event: String,
    },

    /// A handler or the prompt adapter failed. Passed through untouched.
    #[error(transparent)]
    External(#[from] anyhow::Error),
}

/// Run `flow` from `start_state` (or its initial state) until a terminal tag.
///
/// The context is moved in, mutated by handlers along the way and handed
/// back in the result.
pub async fn run_flow<R, P>(
    flow: &ValidatedFlow<R::Context, R::Id>,
    handlers: &R,
    prompts: &P,
    mut context: R::Context,
    start_state: Option<&str>,
) -> Result<FlowRunResult<R::Context>, FlowError>
where
    R: FlowHandlers + ?Sized,
    P: PromptAdapter + ?Sized,
{
    let mut state_id = start_state
        .unwrap_or(&flow.definition().initial_state)
        .to_string();

    loop {
        let state = flow.state(&state_id).ok_or_else(|| FlowError::UnknownState {
            flow: flow.id().to_string(),
            state: state_id.clone(),
        })?;

        let event = if let Some(handler) = state.on_enter {
            debug!(flow = flow.id(), state = %state_id, handler = handler.name(), "entry handler");
            handlers.handle(handler, &mut context, None).await?
        } else {
            let prompt = state.prompt.as_ref().ok_or_else(|| FlowError::MissingPrompt {
                flow: flow.id().to_string(),
                state: state_id.clone(),
            })?;
            match ask(prompt, &context, prompts).await? {
                None => ESC_EVENT.to_string(),
                Some(input) => prompt_event(state, prompt, handlers, &mut context, input).await?,
            }
        };

        let target = resolve_transition(flow, state, &event)?;
        debug!(flow = flow.id(), state = %state_id, event = %event, target = %target, "transition");

        match target {
            Target::Terminal(terminal) => {
                debug!(flow = flow.id(), state = %state_id, %terminal, "flow finished");
                return Ok(FlowRunResult {
                    terminal,
                    state_id,
                    context,
                });
            }
            Target::State(next) => state_id = next,
        }
    }
}

/// Show the prompt and coerce the answer. `None` means cancelled.
async fn ask<C, P>(
    prompt: &PromptSpec<C>,
    context: &C,
    prompts: &P,
) -> anyhow::Result<Option<PromptValue>>
where
    P: PromptAdapter + ?Sized,
{
    match prompt {
        PromptSpec::Select { message, options } => {
            let message = message.resolve(context);
            let options = options.resolve(context);
            let response = prompts.select(&message, &options).await?;
            if prompts.is_cancel(&response) {
                return Ok(None);
            }
            Ok(Some(PromptValue::Text(response.into_text())))
        }
        PromptSpec::Confirm {
            message,
            initial_value,
        } => {
            let message = message.resolve(context);
            let initial_value = initial_value.as_ref().map(|v| v.resolve(context));
            let response = prompts.confirm(&message, initial_value).await?;
            if prompts.is_cancel(&response) {
                return Ok(None);
            }
            Ok(Some(PromptValue::Bool(response.into_bool())))
        }
        PromptSpec::Text {
            message,
            placeholder,
            initial_value,
        } => {
            let message = message.resolve(context);
            let placeholder = placeholder.as_ref().map(|v| v.resolve(context));
            let default_value = initial_value.as_ref().map(|v| v.resolve(context));
            let response = prompts
                .text(&message, placeholder.as_deref(), default_value.as_deref())
                .await?;
            if prompts.is_cancel(&response) {
                return Ok(None);
            }
            Ok(Some(PromptValue::Text(response.into_text())))
        }
    }
}

/// Turn a prompt answer into an event: via the select handler when the state
/// names one, otherwise mechanically from the prompt kind.
async fn prompt_event<R>(
    state: &StateDefinition<R::Context, R::Id>,
    prompt: &PromptSpec<R::Context>,
    handlers: &R,
    context: &mut R::Context,
    input: PromptValue,
) -> anyhow::Result<EventId>
where
    R: FlowHandlers + ?Sized,
{
    if let Some(handler) = state.on_select {
        debug!(state = %state.id, handler = handler.name(), "select handler");
        return handlers.handle(handler, context, Some(input)).await;
    }

    Ok(match prompt {
        PromptSpec::Confirm { .. } => {
            if input.as_bool() {
                CONFIRM_YES_EVENT.to_string()
            } else {
                CONFIRM_NO_EVENT.to_string()
            }
        }
        PromptSpec::Select { .. } => select_event(&input.as_text()),
        PromptSpec::Text { .. } => TEXT_SUBMIT_EVENT.to_string(),
    })
}

fn resolve_transition<C, H>(
    flow: &ValidatedFlow<C, H>,
    state: &StateDefinition<C, H>,
    event: &str,
) -> Result<Target, FlowError> {
    state
        .transitions
        .get(event)
        .or_else(|| state.transitions.get(WILDCARD_EVENT))
        .cloned()
        .ok_or_else(|| FlowError::UnhandledEvent {
            flow: flow.id().to_string(),
            state: state.id.clone(),
            event: event.to_string(),
        })
}
