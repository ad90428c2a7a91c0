//! Jenkins jobs and the actions the menus offer for them.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

/// A Jenkins job known to the tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Short job name.
    pub name: String,
    /// Folder-qualified name, when the job lives in a folder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Job URL. Also the job's identity in menus.
    pub url: String,
}

impl Job {
    /// Name shown to the operator: full name when known, else the short name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.name)
    }
}

/// An operation on a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobAction {
    /// Trigger a build.
    Build,
    /// Show the latest build status.
    Status,
    /// Follow a running build until it finishes.
    Watch,
    /// Tail the console log.
    Logs,
    /// Cancel a running or queued build.
    Cancel,
    /// Rerun the last failed build.
    Rerun,
}

impl JobAction {
    /// Every action, in menu order.
    pub const ALL: [Self; 6] = [
        Self::Build,
        Self::Status,
        Self::Watch,
        Self::Logs,
        Self::Cancel,
        Self::Rerun,
    ];

    /// Menu value and config key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Status => "status",
            Self::Watch => "watch",
            Self::Logs => "logs",
            Self::Cancel => "cancel",
            Self::Rerun => "rerun",
        }
    }
}

impl fmt::Display for JobAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::ALL.into_iter().find(|a| a.as_str() == s) {
            Some(action) => Ok(action),
            None => bail!("Unknown action '{s}'"),
        }
    }
}

/// Jobs matching `search`, sorted by display name.
///
/// Case-insensitive substring match over display name and URL; every search
/// term must match. An empty search returns all jobs.
#[must_use]
pub fn filter_jobs(jobs: &[Job], search: &str) -> Vec<Job> {
    let terms: Vec<String> = search.split_whitespace().map(str::to_lowercase).collect();
    let mut matched: Vec<Job> = jobs
        .iter()
        .filter(|job| {
            let haystack = format!("{} {}", job.display_name(), job.url).to_lowercase();
            terms.iter().all(|term| haystack.contains(term.as_str()))
        })
        .cloned()
        .collect();
    matched.sort_by(|a, b| a.display_name().cmp(b.display_name()));
    matched
}

/// Find a job by name, full name (both case-insensitive) or exact URL.
#[must_use]
pub fn find_job<'a>(jobs: &'a [Job], query: &str) -> Option<&'a Job> {
    let query = query.trim();
    jobs.iter().find(|job| {
        job.url == query
            || job.name.eq_ignore_ascii_case(query)
            || job
                .full_name
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(query))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::make_job;

    fn jobs() -> Vec<Job> {
        vec![
            Job {
                name: "api".to_string(),
                full_name: Some("team/api-prod".to_string()),
                url: "https://jenkins.example.com/job/team/job/api-prod/".to_string(),
            },
            make_job("worker"),
            make_job("api-staging"),
        ]
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        assert_eq!(jobs()[0].display_name(), "team/api-prod");
        assert_eq!(jobs()[1].display_name(), "worker");
    }

    #[test]
    fn test_filter_empty_search_returns_all_sorted() {
        let names: Vec<String> = filter_jobs(&jobs(), "")
            .iter()
            .map(|j| j.display_name().to_string())
            .collect();
        assert_eq!(names, vec!["api-staging", "team/api-prod", "worker"]);
    }

    #[test]
    fn test_filter_requires_every_term() {
        let matched = filter_jobs(&jobs(), "API prod");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].name, "api");
    }

    #[test]
    fn test_filter_no_match() {
        assert!(filter_jobs(&jobs(), "deploy").is_empty());
    }

    #[test]
    fn test_find_job_by_name_full_name_or_url() {
        let jobs = jobs();
        assert_eq!(find_job(&jobs, "WORKER").map(|j| j.name.as_str()), Some("worker"));
        assert_eq!(find_job(&jobs, "team/api-prod").map(|j| j.name.as_str()), Some("api"));
        assert_eq!(
            find_job(&jobs, "https://jenkins.example.com/job/api-staging/")
                .map(|j| j.name.as_str()),
            Some("api-staging")
        );
        assert!(find_job(&jobs, "missing").is_none());
    }

    #[test]
    fn test_job_action_parse() {
        assert_eq!("rerun".parse::<JobAction>().unwrap(), JobAction::Rerun);
        assert!("deploy".parse::<JobAction>().is_err());
    }
}
