//! `status` command
//!
//! Shows a job's status, then offers follow-up actions. Answering yes to
//! "Check another job?" starts over with a job picker.

use std::sync::Arc;

use anyhow::{bail, Result};

use super::Session;
use crate::flows::handlers::{ActionEffect, BoundJob, StatusHandlers, StatusPostContext};
use crate::flows::runner::run_flow;
use crate::flows::types::Terminal;
use crate::jobs::JobAction;

/// `jenkins-flow status [--job NAME]`
pub async fn run(session: &Session, job: Option<&str>) -> Result<()> {
    let mut query = job.map(str::to_string);

    loop {
        let Some(job) = session.resolve_job(query.take().as_deref()).await? else {
            return Ok(());
        };

        let effect = session.actions.perform(JobAction::Status, &job).await?;
        if !session.interactive {
            if effect != ActionEffect::ActionOk {
                bail!("Status of '{}' failed", job.display_name());
            }
            return Ok(());
        }

        let flow = &session.catalog.status_post;
        let context = StatusPostContext {
            target_label: job.display_name().to_string(),
            selected_action: None,
            actions: Arc::new(BoundJob::new(session.actions.clone(), job.clone())),
        };
        let result =
            run_flow(flow, &StatusHandlers, session.prompts.as_ref(), context, None).await?;
        session.record("status", flow.id(), &result)?;
        if result.terminal != Terminal::Repeat {
            return Ok(());
        }
    }
}
