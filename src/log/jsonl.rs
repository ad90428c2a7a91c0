//! JSONL (JSON Lines) run log
//!
//! Append-only record of finished flow runs in `<log_dir>/runs.jsonl`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use crate::flows::types::{FlowRunResult, Terminal};

/// One finished flow run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlowRunRecord {
    /// When the run ended
    pub timestamp: DateTime<Utc>,
    /// CLI command that started the run (`list`, `build`, `status`)
    pub command: String,
    /// Flow id
    pub flow: String,
    /// Terminal tag the run ended with
    pub terminal: Terminal,
    /// State the terminal transition left from
    pub state: String,
}

impl FlowRunRecord {
    /// Record a run result, stamped now.
    #[must_use]
    pub fn from_result<C>(command: &str, flow: &str, result: &FlowRunResult<C>) -> Self {
        Self {
            timestamp: Utc::now(),
            command: command.to_string(),
            flow: flow.to_string(),
            terminal: result.terminal,
            state: result.state_id.clone(),
        }
    }
}

/// Append-only JSONL log of flow runs
pub struct RunLog {
    log_path: PathBuf,
}

impl RunLog {
    /// Open the log in `log_dir`, creating the directory if needed.
    ///
    /// # Errors
    /// Returns an error if the log directory cannot be created
    pub fn new<P: AsRef<Path>>(log_dir: P) -> Result<Self> {
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

        Ok(Self {
            log_path: log_dir.join("runs.jsonl"),
        })
    }

    /// Append one record.
    pub fn append(&self, record: &FlowRunRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open log file: {}", self.log_path.display()))?;

        let json = serde_json::to_string(record).context("Failed to serialize run record")?;
        writeln!(file, "{json}").context("Failed to write to log file")?;

        Ok(())
    }

    /// Read every record in write order. A missing file is an empty log.
    ///
    /// # Errors
    /// Fails on the first line that is not a valid record, naming its line number
    pub fn read_all(&self) -> Result<Vec<FlowRunRecord>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.log_path)
            .with_context(|| format!("Failed to read log file: {}", self.log_path.display()))?;

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(line_num, line)| {
                serde_json::from_str(line)
                    .with_context(|| format!("Failed to parse line {} as JSON", line_num + 1))
            })
            .collect()
    }

    /// Path of the log file
    #[must_use]
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}
