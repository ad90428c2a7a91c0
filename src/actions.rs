//! Action executor
//!
//! Runs the configured shell command for a job action and maps its exit
//! status onto an action effect the flows understand.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command as TokioCommand;
use tracing::{debug, info};

use crate::cli::display::{print_action_header, print_error, print_hint, print_ok};
use crate::config::{ActionsConfig, CliConfig};
use crate::flows::handlers::{ActionEffect, JobActions};
use crate::jobs::{Job, JobAction};
use crate::template::{expand_command, job_vars};

/// Exit code shells report for a command interrupted with Ctrl-C.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Map a command's exit code (`None` when killed by a signal) to an effect.
#[must_use]
pub const fn classify_exit(action: JobAction, code: Option<i32>) -> ActionEffect {
    match code {
        Some(0) => ActionEffect::ActionOk,
        Some(INTERRUPTED_EXIT_CODE) | None => {
            if matches!(action, JobAction::Watch) {
                ActionEffect::WatchCancelled
            } else {
                ActionEffect::ActionError
            }
        }
        Some(_) => ActionEffect::ActionError,
    }
}

/// Runs action commands from `[actions]` through the configured shell.
pub struct CommandActions {
    actions: ActionsConfig,
    shell: String,
}

impl CommandActions {
    /// Executor for the commands in `config`.
    #[must_use]
    pub fn new(config: &CliConfig) -> Self {
        Self {
            actions: config.actions.clone(),
            shell: config.global.shell.clone(),
        }
    }

    /// The fully expanded command line for `action` on `job`, if configured.
    #[must_use]
    pub fn command_line(&self, action: JobAction, job: &Job) -> Option<String> {
        self.actions
            .command(action)
            .map(|template| expand_command(template, &job_vars(job, action)))
    }

    /// Run the command and wait for it. Ctrl-C reaches the child through the
    /// shared process group and only ends the child.
    async fn run(&self, command: &str) -> Result<Option<i32>> {
        let mut child = TokioCommand::new(&self.shell)
            .arg("-c")
            .arg(command)
            .spawn()
            .with_context(|| format!("Failed to spawn '{}'", self.shell))?;

        let status = loop {
            tokio::select! {
                status = child.wait() => {
                    break status.context("Failed waiting for action command")?;
                }
                _ = tokio::signal::ctrl_c() => {
                    debug!("interrupt received while action running");
                }
            }
        };
        Ok(status.code())
    }
}

#[async_trait]
impl JobActions for CommandActions {
    async fn perform(&self, action: JobAction, job: &Job) -> Result<ActionEffect> {
        let Some(command) = self.command_line(action, job) else {
            print_error(&format!("No command configured for '{action}'"));
            print_hint(&format!(
                "Set `{action} = \"...\"` under [actions] in your config"
            ));
            return Ok(ActionEffect::ActionError);
        };

        print_action_header(action, job);
        info!(%action, job = %job.name, "running action");
        debug!(command = %command, shell = %self.shell, "action command");

        let code = self.run(&command).await?;
        let effect = classify_exit(action, code);
        debug!(%action, ?code, %effect, "action finished");

        match effect {
            ActionEffect::ActionOk => print_ok(&format!("{action} finished")),
            ActionEffect::WatchCancelled => print_hint("watch interrupted"),
            _ => {
                let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                print_error(&format!("{action} failed (exit {code})"));
                print_hint(&format!("command was: {command}"));
            }
        }
        Ok(effect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::make_job;

    fn executor(actions: &str) -> CommandActions {
        let config = CliConfig::parse(&format!("[actions]\n{actions}\n")).unwrap();
        CommandActions::new(&config)
    }

    #[test]
    fn test_classify_exit() {
        assert_eq!(classify_exit(JobAction::Build, Some(0)), ActionEffect::ActionOk);
        assert_eq!(classify_exit(JobAction::Build, Some(1)), ActionEffect::ActionError);
        assert_eq!(
            classify_exit(JobAction::Watch, Some(130)),
            ActionEffect::WatchCancelled
        );
        assert_eq!(classify_exit(JobAction::Watch, None), ActionEffect::WatchCancelled);
        assert_eq!(classify_exit(JobAction::Logs, Some(130)), ActionEffect::ActionError);
        assert_eq!(classify_exit(JobAction::Watch, Some(2)), ActionEffect::ActionError);
    }

    #[test]
    fn test_command_line_expands_job_vars() {
        let actions = executor("build = \"echo {{job_name}} {{action}}\"");
        assert_eq!(
            actions.command_line(JobAction::Build, &make_job("api")),
            Some("echo 'api' 'build'".to_string())
        );
        assert!(actions.command_line(JobAction::Logs, &make_job("api")).is_none());
    }

    #[tokio::test]
    async fn test_successful_command_is_action_ok() {
        let actions = executor("status = \"true\"");
        let effect = actions
            .perform(JobAction::Status, &make_job("api"))
            .await
            .unwrap();
        assert_eq!(effect, ActionEffect::ActionOk);
    }

    #[tokio::test]
    async fn test_failing_command_is_action_error() {
        let actions = executor("cancel = \"exit 3\"");
        let effect = actions
            .perform(JobAction::Cancel, &make_job("api"))
            .await
            .unwrap();
        assert_eq!(effect, ActionEffect::ActionError);
    }

    #[tokio::test]
    async fn test_interrupted_watch_is_watch_cancelled() {
        let actions = executor("watch = \"exit 130\"");
        let effect = actions
            .perform(JobAction::Watch, &make_job("api"))
            .await
            .unwrap();
        assert_eq!(effect, ActionEffect::WatchCancelled);
    }

    #[tokio::test]
    async fn test_missing_command_is_action_error() {
        let actions = executor("");
        let effect = actions
            .perform(JobAction::Rerun, &make_job("api"))
            .await
            .unwrap();
        assert_eq!(effect, ActionEffect::ActionError);
    }

    #[tokio::test]
    async fn test_spawn_failure_propagates() {
        let config = CliConfig::parse(
            "[global]\nshell = \"/nonexistent/shell\"\n[actions]\nbuild = \"true\"\n",
        )
        .unwrap();
        let actions = CommandActions::new(&config);
        let err = actions
            .perform(JobAction::Build, &make_job("api"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to spawn"));
    }
}
