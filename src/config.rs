//! Configuration parser
//!
//! Parses `jenkins-flow.toml` into the job list and the shell command
//! templates behind each menu action.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::jobs::{Job, JobAction};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "jenkins-flow.toml";

/// Global settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GlobalConfig {
    /// Directory holding the run log (default: `.jenkins-flow`)
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Shell used to run action commands (default: `sh`)
    #[serde(default = "default_shell")]
    pub shell: String,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(".jenkins-flow")
}

fn default_shell() -> String {
    "sh".to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            shell: default_shell(),
        }
    }
}

/// Command templates per action. Unset actions are reported when picked.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionsConfig {
    /// Trigger a build
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    /// Print the latest build status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Follow a running build
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch: Option<String>,
    /// Tail the console log
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<String>,
    /// Cancel a running or queued build
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel: Option<String>,
    /// Rerun the last failed build
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rerun: Option<String>,
}

impl ActionsConfig {
    /// Command template for `action`, if configured.
    #[must_use]
    pub fn command(&self, action: JobAction) -> Option<&str> {
        match action {
            JobAction::Build => self.build.as_deref(),
            JobAction::Status => self.status.as_deref(),
            JobAction::Watch => self.watch.as_deref(),
            JobAction::Logs => self.logs.as_deref(),
            JobAction::Cancel => self.cancel.as_deref(),
            JobAction::Rerun => self.rerun.as_deref(),
        }
    }
}

/// Top-level configuration parsed from jenkins-flow.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliConfig {
    /// Global settings
    #[serde(default)]
    pub global: GlobalConfig,
    /// Action command templates
    #[serde(default)]
    pub actions: ActionsConfig,
    /// Known jobs
    #[serde(default, rename = "job")]
    pub jobs: Vec<Job>,
}

impl CliConfig {
    /// Parse a config file from a path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse config content from a string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse jenkins-flow.toml")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        let mut urls = HashSet::new();
        for job in &self.jobs {
            if job.name.trim().is_empty() {
                bail!("Job name cannot be empty");
            }
            if job.url.trim().is_empty() {
                bail!("Job '{}' has an empty url", job.name);
            }
            if !names.insert(job.name.as_str()) {
                bail!("Duplicate job name: '{}'", job.name);
            }
            if !urls.insert(job.url.as_str()) {
                bail!("Duplicate job url: '{}' (job '{}')", job.url, job.name);
            }
        }

        for action in JobAction::ALL {
            if let Some(command) = self.actions.command(action) {
                if command.trim().is_empty() {
                    bail!("Command for action '{action}' cannot be blank");
                }
            }
        }

        if self.global.shell.trim().is_empty() {
            bail!("Shell cannot be empty");
        }

        Ok(())
    }
}
