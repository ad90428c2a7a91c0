//! CLI commands
//!
//! Each command drives one or more built-in flows over a shared `Session`.

pub mod build;
pub mod check;
pub mod list;
pub mod status;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::flows::definition::FlowCatalog;
use crate::flows::handlers::JobActions;
use crate::flows::prompt::PromptAdapter;
use crate::flows::types::{FlowRunResult, PromptOption};
use crate::jobs::{find_job, Job};
use crate::log::{FlowRunRecord, RunLog};

/// Everything a command needs, cheap to clone into nested action performers.
#[derive(Clone)]
pub struct Session {
    /// Validated built-in flows
    pub catalog: Arc<FlowCatalog>,
    /// Where prompts are answered
    pub prompts: Arc<dyn PromptAdapter>,
    /// Runs job actions
    pub actions: Arc<dyn JobActions>,
    /// History of finished runs
    pub run_log: Arc<RunLog>,
    /// Configured jobs
    pub jobs: Vec<Job>,
    /// False when prompting is not allowed
    pub interactive: bool,
}

impl Session {
    /// Append a finished run to the run log.
    pub fn record<C>(&self, command: &str, flow: &str, result: &FlowRunResult<C>) -> Result<()> {
        info!(
            command,
            flow,
            terminal = %result.terminal,
            state = %result.state_id,
            "flow run finished"
        );
        self.run_log
            .append(&FlowRunRecord::from_result(command, flow, result))
            .context("Failed to write run log")
    }

    /// Resolve `--job`, or ask for a job when none was given.
    ///
    /// `Ok(None)` means the operator cancelled the job menu.
    pub async fn resolve_job(&self, query: Option<&str>) -> Result<Option<Job>> {
        if let Some(query) = query {
            return match find_job(&self.jobs, query) {
                Some(job) => Ok(Some(job.clone())),
                None => bail!(
                    "Unknown job '{query}'. Use a job name, full name or URL from your config"
                ),
            };
        }
        if !self.interactive {
            bail!("--job is required with --non-interactive");
        }
        if self.jobs.is_empty() {
            bail!("No jobs configured. Add [[job]] entries to your config");
        }

        let options: Vec<PromptOption> = self
            .jobs
            .iter()
            .map(|job| PromptOption::new(job.url.clone(), job.display_name()))
            .collect();
        let response = self.prompts.select("Select a job", &options).await?;
        if self.prompts.is_cancel(&response) {
            return Ok(None);
        }
        let url = response.into_text();
        Ok(self.jobs.iter().find(|job| job.url == url).cloned())
    }
}


#[cfg(test)]
mod tests {
    use super::test_session::session;
    use super::*;
    use crate::flows::handlers::ActionEffect;
    use crate::flows::prompt::RawResponse;
    use crate::testutil::{make_job, FixedActions};

    #[tokio::test]
    async fn test_resolve_job_by_query() {
        let (session, prompts, _dir) = session(
            vec![make_job("api")],
            FixedActions::new(ActionEffect::ActionOk),
            vec![],
        );
        let job = session.resolve_job(Some("API")).await.unwrap();
        assert_eq!(job.map(|j| j.name), Some("api".to_string()));
        assert!(prompts.asked().is_empty());
        assert!(session.resolve_job(Some("worker")).await.is_err());
    }

    #[tokio::test]
    async fn test_resolve_job_prompts_without_query() {
        let (session, prompts, _dir) = session(
            vec![make_job("api"), make_job("worker")],
            FixedActions::new(ActionEffect::ActionOk),
            vec![
                RawResponse::Text(make_job("worker").url),
                RawResponse::Cancelled,
            ],
        );
        let job = session.resolve_job(None).await.unwrap();
        assert_eq!(job.map(|j| j.name), Some("worker".to_string()));
        assert!(session.resolve_job(None).await.unwrap().is_none());
        assert_eq!(prompts.asked()[0].options.len(), 2);
    }

    #[tokio::test]
    async fn test_resolve_job_non_interactive_needs_query() {
        let (mut session, _, _dir) = session(
            vec![make_job("api")],
            FixedActions::new(ActionEffect::ActionOk),
            vec![],
        );
        session.interactive = false;
        let err = session.resolve_job(None).await.unwrap_err();
        assert!(err.to_string().contains("--job is required"));
    }
}
