//! `list` command
//!
//! Prints configured jobs. Interactively it loops: ask for a search, show
//! the matches, then hand them to the job browser flow.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use super::build::follow_build;
use super::Session;
use crate::cli::display::{print_jobs, print_ok};
use crate::flows::handlers::{ActionEffect, JobActions, ListContext, ListHandlers};
use crate::flows::runner::run_flow;
use crate::flows::types::Terminal;
use crate::jobs::{filter_jobs, Job, JobAction};

/// Search answers that end the command.
const EXIT_WORDS: [&str; 3] = ["q", "quit", "exit"];

/// Performer for the job browser: `build` also runs the build follow-up
/// menu, embedded, before returning to the browser.
struct ListActions {
    session: Session,
}

#[async_trait]
impl JobActions for ListActions {
    async fn perform(&self, action: JobAction, job: &Job) -> Result<ActionEffect> {
        let effect = self.session.actions.perform(action, job).await?;
        if action != JobAction::Build || effect != ActionEffect::ActionOk {
            return Ok(effect);
        }

        Ok(match follow_build(&self.session, "list", job, true).await? {
            Terminal::ExitCommand => ActionEffect::Exit,
            Terminal::ReturnToCallerRoot | Terminal::Root => ActionEffect::Root,
            Terminal::ReturnToCaller | Terminal::Repeat | Terminal::Complete => {
                ActionEffect::ActionOk
            }
        })
    }
}

/// Ask for a search string. `None` ends the command.
async fn prompt_search(session: &Session) -> Result<Option<String>> {
    let response = session
        .prompts
        .text(
            "Search jobs (optional, q to exit)",
            Some("e.g. api prod"),
            None,
        )
        .await?;
    if session.prompts.is_cancel(&response) {
        return Ok(None);
    }
    let search = response.into_text().trim().to_string();
    if EXIT_WORDS.contains(&search.to_lowercase().as_str()) {
        return Ok(None);
    }
    Ok(Some(search))
}

/// `jenkins-flow list [--search Q]`
pub async fn run(session: &Session, search: Option<&str>) -> Result<()> {
    if !session.interactive {
        print_jobs(&filter_jobs(&session.jobs, search.unwrap_or_default()));
        return Ok(());
    }

    let mut pending = search.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
    let performer: Arc<dyn JobActions> = Arc::new(ListActions {
        session: session.clone(),
    });

    loop {
        let search = match pending.take() {
            Some(search) => search,
            None => match prompt_search(session).await? {
                Some(search) => search,
                None => return Ok(()),
            },
        };

        let jobs = filter_jobs(&session.jobs, &search);
        if jobs.is_empty() {
            print_ok(&format!("No jobs match \"{search}\"."));
            continue;
        }
        print_jobs(&jobs);

        let flow = &session.catalog.list_interactive;
        let context = ListContext::new(jobs, performer.clone());
        let result =
            run_flow(flow, &ListHandlers, session.prompts.as_ref(), context, None).await?;
        session.record("list", flow.id(), &result)?;
        if result.terminal == Terminal::ExitCommand {
            return Ok(());
        }
    }
}
