//! Handler registries for the built-in flows
//!
//! Each flow gets a closed enum of handler ids and a registry that matches on
//! it. Selection handlers record the operator's choice in the context; entry
//! handlers hand the recorded action to the context's action performer.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::definition::{EXIT_VALUE, SEARCH_AGAIN_VALUE};
use super::types::{
    select_event, EventId, FlowHandlers, HandlerId, PromptValue, Terminal, CONFIRM_NO_EVENT,
    CONFIRM_YES_EVENT,
};
use crate::jobs::{Job, JobAction};

/// Outcome of a performed action, used directly as the next event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionEffect {
    /// Action finished; back to the action menu.
    ActionOk,
    /// Operator interrupted a watch.
    WatchCancelled,
    /// Action failed; the error was already reported.
    ActionError,
    /// A nested flow asked to return to the root menu.
    Root,
    /// Leave the command.
    Exit,
}

impl ActionEffect {
    /// The event this effect produces.
    #[must_use]
    pub const fn as_event(self) -> &'static str {
        match self {
            Self::ActionOk => "action_ok",
            Self::WatchCancelled => "watch_cancelled",
            Self::ActionError => "action_error",
            Self::Root => "root",
            Self::Exit => "exit",
        }
    }
}

impl fmt::Display for ActionEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_event())
    }
}

/// Performs actions on any job (used by the list flow).
#[async_trait]
pub trait JobActions: Send + Sync {
    /// Run `action` against `job`.
    async fn perform(&self, action: JobAction, job: &Job) -> Result<ActionEffect>;
}

/// Performs actions on one job fixed in advance (used by the post flows).
#[async_trait]
pub trait TargetActions: Send + Sync {
    /// Run `action` against the bound job.
    async fn perform(&self, action: JobAction) -> Result<ActionEffect>;
}

/// Binds a `JobActions` to a single job.
pub struct BoundJob {
    actions: Arc<dyn JobActions>,
    job: Job,
}

impl BoundJob {
    /// Bind `actions` to `job`.
    #[must_use]
    pub fn new(actions: Arc<dyn JobActions>, job: Job) -> Self {
        Self { actions, job }
    }
}

#[async_trait]
impl TargetActions for BoundJob {
    async fn perform(&self, action: JobAction) -> Result<ActionEffect> {
        self.actions.perform(action, &self.job).await
    }
}

/// Record a picked action. `done` is its own event; values that are not
/// actions pass through as `select:<value>` without being recorded.
fn record_action(selected: &mut Option<JobAction>, input: Option<PromptValue>) -> EventId {
    let value = input.map(|v| v.as_text()).unwrap_or_default();
    if value == "done" {
        return "done".to_string();
    }
    if let Ok(action) = value.parse() {
        *selected = Some(action);
    }
    select_event(&value)
}

fn confirm_event(input: Option<&PromptValue>) -> EventId {
    if input.is_some_and(PromptValue::as_bool) {
        CONFIRM_YES_EVENT.to_string()
    } else {
        CONFIRM_NO_EVENT.to_string()
    }
}

/// Embedded runs hand control back with `exit`; standalone runs ask to repeat.
fn leave_event(return_to_caller: bool, exit: Terminal) -> EventId {
    if return_to_caller {
        exit.as_str().to_string()
    } else {
        "ask_repeat".to_string()
    }
}

/// State threaded through the `list_interactive` flow.
pub struct ListContext {
    /// Jobs offered in the job menu.
    pub jobs: Vec<Job>,
    /// Job picked in the job menu.
    pub selected_job: Option<Job>,
    /// Action picked in the action menu.
    pub selected_action: Option<JobAction>,
    /// Runs the picked action.
    pub actions: Arc<dyn JobActions>,
}

impl ListContext {
    /// Fresh context over `jobs`.
    #[must_use]
    pub fn new(jobs: Vec<Job>, actions: Arc<dyn JobActions>) -> Self {
        Self {
            jobs,
            selected_job: None,
            selected_action: None,
            actions,
        }
    }
}

/// Handler ids of the `list_interactive` flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListHandler {
    /// Job menu answer.
    SelectJob,
    /// Action menu answer.
    SelectAction,
    /// Perform the recorded action.
    RunAction,
}

impl HandlerId for ListHandler {
    fn name(self) -> &'static str {
        match self {
            Self::SelectJob => "list.selectJob",
            Self::SelectAction => "list.selectAction",
            Self::RunAction => "list.runAction",
        }
    }
}

/// Registry for the `list_interactive` flow.
pub struct ListHandlers;

#[async_trait]
impl FlowHandlers for ListHandlers {
    type Context = ListContext;
    type Id = ListHandler;

    async fn handle(
        &self,
        id: ListHandler,
        context: &mut ListContext,
        input: Option<PromptValue>,
    ) -> Result<EventId> {
        match id {
            ListHandler::SelectJob => {
                let value = input.map(|v| v.as_text()).unwrap_or_default();
                if value == SEARCH_AGAIN_VALUE {
                    return Ok("select:search_again".to_string());
                }
                if value == EXIT_VALUE {
                    return Ok("select:exit".to_string());
                }
                let Some(job) = context.jobs.iter().find(|job| job.url == value) else {
                    return Ok("select:search_again".to_string());
                };
                context.selected_job = Some(job.clone());
                Ok("select:job".to_string())
            }
            ListHandler::SelectAction => Ok(record_action(&mut context.selected_action, input)),
            ListHandler::RunAction => {
                let (Some(job), Some(action)) = (&context.selected_job, context.selected_action)
                else {
                    return Ok(ActionEffect::ActionError.as_event().to_string());
                };
                let effect = context.actions.perform(action, job).await?;
                Ok(effect.as_event().to_string())
            }
        }
    }
}

/// State threaded through the `build_post` flow.
pub struct BuildPostContext {
    /// Job label used in menu messages.
    pub job_label: String,
    /// Embedded in another flow: return instead of asking to build again.
    pub return_to_caller: bool,
    /// Action picked in the action menu.
    pub selected_action: Option<JobAction>,
    /// Runs the picked action against the built job.
    pub actions: Arc<dyn TargetActions>,
}

/// Handler ids of the `build_post` flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildHandler {
    /// Action menu answer.
    SelectAction,
    /// Perform the recorded action.
    RunAction,
    /// Leaving the menu normally.
    AfterMenu,
    /// Leaving the menu towards the root.
    AfterRoot,
    /// "Trigger another build?" answer.
    RepeatConfirm,
}

impl HandlerId for BuildHandler {
    fn name(self) -> &'static str {
        match self {
            Self::SelectAction => "build.selectAction",
            Self::RunAction => "build.runAction",
            Self::AfterMenu => "build.afterMenu",
            Self::AfterRoot => "build.afterRoot",
            Self::RepeatConfirm => "build.repeatConfirm",
        }
    }
}

/// Registry for the `build_post` flow.
pub struct BuildHandlers;

#[async_trait]
impl FlowHandlers for BuildHandlers {
    type Context = BuildPostContext;
    type Id = BuildHandler;

    async fn handle(
        &self,
        id: BuildHandler,
        context: &mut BuildPostContext,
        input: Option<PromptValue>,
    ) -> Result<EventId> {
        Ok(match id {
            BuildHandler::SelectAction => record_action(&mut context.selected_action, input),
            BuildHandler::RunAction => match context.selected_action {
                Some(action) => context.actions.perform(action).await?.as_event().to_string(),
                None => ActionEffect::ActionError.as_event().to_string(),
            },
            BuildHandler::AfterMenu => {
                leave_event(context.return_to_caller, Terminal::ReturnToCaller)
            }
            BuildHandler::AfterRoot => {
                leave_event(context.return_to_caller, Terminal::ReturnToCallerRoot)
            }
            BuildHandler::RepeatConfirm => confirm_event(input.as_ref()),
        })
    }
}

/// State threaded through the `status_post` flow.
pub struct StatusPostContext {
    /// Label of the job whose status was shown.
    pub target_label: String,
    /// Action picked in the action menu.
    pub selected_action: Option<JobAction>,
    /// Runs the picked action against the job.
    pub actions: Arc<dyn TargetActions>,
}

/// Handler ids of the `status_post` flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusHandler {
    /// Action menu answer.
    SelectAction,
    /// Perform the recorded action.
    RunAction,
    /// "Check another job?" answer.
    RepeatConfirm,
}

impl HandlerId for StatusHandler {
    fn name(self) -> &'static str {
        match self {
            Self::SelectAction => "status.selectAction",
            Self::RunAction => "status.runAction",
            Self::RepeatConfirm => "status.repeatConfirm",
        }
    }
}

/// Registry for the `status_post` flow.
pub struct StatusHandlers;

#[async_trait]
impl FlowHandlers for StatusHandlers {
    type Context = StatusPostContext;
    type Id = StatusHandler;

    async fn handle(
        &self,
        id: StatusHandler,
        context: &mut StatusPostContext,
        input: Option<PromptValue>,
    ) -> Result<EventId> {
        Ok(match id {
            StatusHandler::SelectAction => record_action(&mut context.selected_action, input),
            StatusHandler::RunAction => match context.selected_action {
                Some(action) => context.actions.perform(action).await?.as_event().to_string(),
                None => ActionEffect::ActionError.as_event().to_string(),
            },
            StatusHandler::RepeatConfirm => confirm_event(input.as_ref()),
        })
    }
}
