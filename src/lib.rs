//! jenkins-flow - Interactive Jenkins client
//!
//! Menus are declarative flows: a definition lists states, prompts and
//! transitions; a runner interprets it against a prompt adapter and a
//! handler registry. The CLI drives three built-in flows over jobs and
//! action commands taken from the config file.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

pub mod actions;
pub mod cli;
pub mod commands;
pub mod config;
pub mod doctor;
pub mod flows;
pub mod jobs;
pub mod log;
pub mod template;

#[cfg(test)]
mod testutil;

// Re-export commonly used types
pub use config::CliConfig;
pub use doctor::{diagnose_flow, DiagnosticReport};
pub use flows::{run_flow, FlowCatalog, FlowError, ValidationError};
pub use jobs::{Job, JobAction};
