//! Shared test utilities
//!
//! Common helpers used across test modules. Only compiled in test builds.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::flows::handlers::{ActionEffect, JobActions};
use crate::flows::prompt::{PromptAdapter, RawResponse};
use crate::flows::types::PromptOption;
use crate::jobs::{Job, JobAction};

/// One prompt the runner asked for, as the adapter saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskedPrompt {
    /// `select`, `confirm` or `text`.
    pub kind: &'static str,
    /// Resolved message.
    pub message: String,
    /// Option values of a select prompt.
    pub options: Vec<String>,
    /// Placeholder of a text prompt.
    pub placeholder: Option<String>,
    /// Preselected answer of a confirm prompt.
    pub initial_confirm: Option<bool>,
    /// Default answer of a text prompt.
    pub default_text: Option<String>,
}

type CancelPredicate = Box<dyn Fn(&RawResponse) -> bool + Send + Sync>;

/// Prompt adapter that replays canned responses in order.
pub struct ScriptedPrompts {
    responses: Mutex<VecDeque<RawResponse>>,
    asked: Mutex<Vec<AskedPrompt>>,
    cancel: Option<CancelPredicate>,
}

impl ScriptedPrompts {
    /// Replay `responses`, one per prompt.
    #[must_use]
    pub fn new(responses: Vec<RawResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            asked: Mutex::new(Vec::new()),
            cancel: None,
        }
    }

    /// Replace the default cancellation predicate.
    #[must_use]
    pub fn cancel_when(
        mut self,
        predicate: impl Fn(&RawResponse) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.cancel = Some(Box::new(predicate));
        self
    }

    /// Every prompt shown so far.
    #[must_use]
    pub fn asked(&self) -> Vec<AskedPrompt> {
        self.asked.lock().unwrap().clone()
    }

    fn next(&self, asked: AskedPrompt) -> Result<RawResponse> {
        self.asked.lock().unwrap().push(asked);
        match self.responses.lock().unwrap().pop_front() {
            Some(response) => Ok(response),
            None => bail!("no scripted response left"),
        }
    }
}

#[async_trait]
impl PromptAdapter for ScriptedPrompts {
    async fn select(&self, message: &str, options: &[PromptOption]) -> Result<RawResponse> {
        self.next(AskedPrompt {
            kind: "select",
            message: message.to_string(),
            options: options.iter().map(|o| o.value.clone()).collect(),
            placeholder: None,
            initial_confirm: None,
            default_text: None,
        })
    }

    async fn confirm(&self, message: &str, initial_value: Option<bool>) -> Result<RawResponse> {
        self.next(AskedPrompt {
            kind: "confirm",
            message: message.to_string(),
            options: Vec::new(),
            placeholder: None,
            initial_confirm: initial_value,
            default_text: None,
        })
    }

    async fn text(
        &self,
        message: &str,
        placeholder: Option<&str>,
        default_value: Option<&str>,
    ) -> Result<RawResponse> {
        self.next(AskedPrompt {
            kind: "text",
            message: message.to_string(),
            options: Vec::new(),
            placeholder: placeholder.map(str::to_string),
            initial_confirm: None,
            default_text: default_value.map(str::to_string),
        })
    }

    fn is_cancel(&self, response: &RawResponse) -> bool {
        self.cancel.as_ref().map_or_else(
            || matches!(response, RawResponse::Cancelled),
            |predicate| predicate(response),
        )
    }
}

/// Action performer that answers every action with a fixed effect and
/// records what it was asked to do.
pub struct FixedActions {
    effect: ActionEffect,
    calls: Mutex<Vec<(JobAction, String)>>,
}

impl FixedActions {
    /// Always answer with `effect`.
    #[must_use]
    pub fn new(effect: ActionEffect) -> Arc<Self> {
        Arc::new(Self {
            effect,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// `(action, job url)` pairs performed so far.
    #[must_use]
    pub fn calls(&self) -> Vec<(JobAction, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobActions for FixedActions {
    async fn perform(&self, action: JobAction, job: &Job) -> Result<ActionEffect> {
        self.calls.lock().unwrap().push((action, job.url.clone()));
        Ok(self.effect)
    }
}

/// Create a job with the given short name and a URL derived from it.
#[must_use]
pub fn make_job(name: &str) -> Job {
    Job {
        name: name.to_string(),
        full_name: None,
        url: format!("https://jenkins.example.com/job/{name}/"),
    }
}
