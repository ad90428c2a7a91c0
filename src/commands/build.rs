//! `build` command
//!
//! Triggers a build, then offers the follow-up menu until the operator is
//! done or asks for another build.

use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::debug;

use super::Session;
use crate::flows::handlers::{ActionEffect, BoundJob, BuildHandlers, BuildPostContext};
use crate::flows::runner::run_flow;
use crate::flows::types::Terminal;
use crate::jobs::{Job, JobAction};

/// Run the follow-up menu for a freshly triggered build of `job`.
///
/// Embedded runs (`return_to_caller`) hand control back instead of asking
/// to build again.
pub async fn follow_build(
    session: &Session,
    command: &str,
    job: &Job,
    return_to_caller: bool,
) -> Result<Terminal> {
    let flow = &session.catalog.build_post;
    let context = BuildPostContext {
        job_label: job.display_name().to_string(),
        return_to_caller,
        selected_action: None,
        actions: Arc::new(BoundJob::new(session.actions.clone(), job.clone())),
    };
    let result = run_flow(flow, &BuildHandlers, session.prompts.as_ref(), context, None).await?;
    session.record(command, flow.id(), &result)?;
    Ok(result.terminal)
}

/// `jenkins-flow build [--job NAME]`
pub async fn run(session: &Session, job: Option<&str>) -> Result<()> {
    let Some(job) = session.resolve_job(job).await? else {
        return Ok(());
    };

    loop {
        let effect = session.actions.perform(JobAction::Build, &job).await?;
        if effect != ActionEffect::ActionOk {
            bail!("Build of '{}' failed", job.display_name());
        }
        if !session.interactive {
            return Ok(());
        }

        let terminal = follow_build(session, "build", &job, false).await?;
        debug!(%terminal, job = %job.name, "build menu finished");
        if terminal != Terminal::Repeat {
            return Ok(());
        }
    }
}
