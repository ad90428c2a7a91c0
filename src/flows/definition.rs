//! Built-in flow definitions
//!
//! The three menus the CLI drives: the job browser behind `list`, and the
//! follow-up menus shown after `build` and `status`.

use super::handlers::{
    BuildHandler, BuildPostContext, ListContext, ListHandler, StatusHandler, StatusPostContext,
};
use super::types::{FlowDefinition, PromptOption, PromptSpec, Resolvable, StateDefinition};
use super::validate::{ValidatedFlow, ValidationError};

/// Job menu value for "Search again".
pub const SEARCH_AGAIN_VALUE: &str = "__jenkins_cli_search_again__";

/// Job menu value for "Exit".
pub const EXIT_VALUE: &str = "__jenkins_cli_exit__";

fn options(entries: &[(&str, &str)]) -> Vec<PromptOption> {
    entries
        .iter()
        .map(|(value, label)| PromptOption::new(*value, *label))
        .collect()
}

fn job_options(context: &ListContext) -> Vec<PromptOption> {
    context
        .jobs
        .iter()
        .map(|job| PromptOption::new(job.url.clone(), job.display_name()))
        .chain([
            PromptOption::new(SEARCH_AGAIN_VALUE, "Search again"),
            PromptOption::new(EXIT_VALUE, "Exit"),
        ])
        .collect()
}

fn list_action_message(context: &ListContext) -> String {
    let label = context
        .selected_job
        .as_ref()
        .map_or("job", |job| job.display_name());
    format!("Action for {label}")
}

fn build_action_message(context: &BuildPostContext) -> String {
    format!("Next action for {}", context.job_label)
}

fn status_action_message(context: &StatusPostContext) -> String {
    format!("Action for {}", context.target_label)
}

/// Job browser: pick a job, pick an action, run it, repeat.
#[must_use]
pub fn list_interactive() -> FlowDefinition<ListContext, ListHandler> {
    FlowDefinition::new("list_interactive", "select_job")
        .state(
            StateDefinition::new("select_job")
                .root()
                .prompt(PromptSpec::select(
                    "Select a job to operate on",
                    Resolvable::Computed(job_options),
                ))
                .on_select(ListHandler::SelectJob)
                .on("esc", "root")
                .on("select:search_again", "root")
                .on("select:exit", "exit_command")
                .on("select:job", "action_menu"),
        )
        .state(
            StateDefinition::new("action_menu")
                .prompt(PromptSpec::select(
                    Resolvable::Computed(list_action_message),
                    options(&[
                        ("build", "Build"),
                        ("status", "Status"),
                        ("watch", "Watch"),
                        ("logs", "Logs"),
                        ("cancel", "Cancel"),
                        ("rerun", "Rerun last failed"),
                        ("search", "Back to search"),
                        ("exit", "Exit"),
                    ]),
                ))
                .on_select(ListHandler::SelectAction)
                .on("esc", "select_job")
                .on("select:search", "root")
                .on("select:exit", "exit_command")
                .on("select:build", "run_action")
                .on("select:status", "run_action")
                .on("select:watch", "run_action")
                .on("select:logs", "run_action")
                .on("select:cancel", "run_action")
                .on("select:rerun", "run_action"),
        )
        .state(
            StateDefinition::new("run_action")
                .on_enter(ListHandler::RunAction)
                .on("action_ok", "action_menu")
                .on("watch_cancelled", "root")
                .on("action_error", "root")
                .on("root", "root")
                .on("exit", "exit_command"),
        )
}

/// Follow-up menu after triggering a build.
#[must_use]
pub fn build_post() -> FlowDefinition<BuildPostContext, BuildHandler> {
    FlowDefinition::new("build_post", "action_menu")
        .state(
            StateDefinition::new("action_menu")
                .prompt(PromptSpec::select(
                    Resolvable::Computed(build_action_message),
                    options(&[
                        ("watch", "Watch"),
                        ("logs", "Logs"),
                        ("cancel", "Cancel"),
                        ("rerun", "Rerun same inputs"),
                        ("done", "Done"),
                    ]),
                ))
                .on_select(BuildHandler::SelectAction)
                .on("esc", "after_menu")
                .on("done", "after_menu")
                .on("select:watch", "run_action")
                .on("select:logs", "run_action")
                .on("select:cancel", "run_action")
                .on("select:rerun", "run_action"),
        )
        .state(
            StateDefinition::new("run_action")
                .on_enter(BuildHandler::RunAction)
                .on("action_ok", "action_menu")
                .on("watch_cancelled", "after_root")
                .on("action_error", "after_root")
                .on("root", "after_root")
                .on("exit", "exit_command"),
        )
        .state(
            StateDefinition::new("after_menu")
                .on_enter(BuildHandler::AfterMenu)
                .on("ask_repeat", "repeat_confirm")
                .on("return_to_caller", "return_to_caller"),
        )
        .state(
            StateDefinition::new("after_root")
                .on_enter(BuildHandler::AfterRoot)
                .on("ask_repeat", "repeat_confirm")
                .on("return_to_caller_root", "return_to_caller_root"),
        )
        .state(
            StateDefinition::new("repeat_confirm")
                .root()
                .prompt(PromptSpec::confirm("Trigger another build?").with_initial_confirm(false))
                .on_select(BuildHandler::RepeatConfirm)
                .on("esc", "exit_command")
                .on("confirm:yes", "repeat")
                .on("confirm:no", "exit_command"),
        )
}

/// Follow-up menu after showing a job's status.
#[must_use]
pub fn status_post() -> FlowDefinition<StatusPostContext, StatusHandler> {
    FlowDefinition::new("status_post", "action_menu")
        .state(
            StateDefinition::new("action_menu")
                .prompt(PromptSpec::select(
                    Resolvable::Computed(status_action_message),
                    options(&[
                        ("watch", "Watch"),
                        ("logs", "Logs"),
                        ("cancel", "Cancel running/queued build"),
                        ("rerun", "Rerun last failed build"),
                        ("build", "Build now"),
                        ("done", "Done"),
                    ]),
                ))
                .on_select(StatusHandler::SelectAction)
                .on("esc", "again_confirm")
                .on("done", "again_confirm")
                .on("select:watch", "run_action")
                .on("select:logs", "run_action")
                .on("select:cancel", "run_action")
                .on("select:rerun", "run_action")
                .on("select:build", "run_action"),
        )
        .state(
            StateDefinition::new("run_action")
                .on_enter(StatusHandler::RunAction)
                .on("action_ok", "action_menu")
                .on("watch_cancelled", "again_confirm")
                .on("action_error", "again_confirm")
                .on("root", "again_confirm")
                .on("exit", "exit_command"),
        )
        .state(
            StateDefinition::new("again_confirm")
                .root()
                .prompt(PromptSpec::confirm("Check another job?").with_initial_confirm(false))
                .on_select(StatusHandler::RepeatConfirm)
                .on("esc", "exit_command")
                .on("confirm:yes", "repeat")
                .on("confirm:no", "exit_command"),
        )
}

/// The built-in flows, validated once at startup.
pub struct FlowCatalog {
    /// Job browser.
    pub list_interactive: ValidatedFlow<ListContext, ListHandler>,
    /// Follow-up after `build`.
    pub build_post: ValidatedFlow<BuildPostContext, BuildHandler>,
    /// Follow-up after `status`.
    pub status_post: ValidatedFlow<StatusPostContext, StatusHandler>,
}

impl FlowCatalog {
    /// Build and validate every built-in flow.
    pub fn load() -> Result<Self, ValidationError> {
        Ok(Self {
            list_interactive: list_interactive().validate()?,
            build_post: build_post().validate()?,
            status_post: status_post().validate()?,
        })
    }
}
