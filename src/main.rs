//! jenkins-flow - Interactive Jenkins client
//!
//! CLI entry point: parses arguments, loads the config, validates the
//! built-in flows and dispatches to a command.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jenkins_flow::actions::CommandActions;
use jenkins_flow::cli::{print_error, print_hint, TerminalPrompts};
use jenkins_flow::commands::{self, Session};
use jenkins_flow::config::{CliConfig, DEFAULT_CONFIG_FILE};
use jenkins_flow::flows::FlowCatalog;
use jenkins_flow::log::RunLog;

/// Interactive Jenkins client
///
/// Browse configured jobs and run build, status, watch, logs, cancel and
/// rerun actions through menu flows.
#[derive(Parser, Debug)]
#[command(name = "jenkins-flow", version, about)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Never prompt; print results and exit
    #[arg(long, global = true)]
    non_interactive: bool,

    /// Log filter used when RUST_LOG is unset (e.g. `debug`, `jenkins_flow=trace`)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// List jobs and browse them interactively (default)
    List {
        /// Only show jobs matching every word of this search
        #[arg(long)]
        search: Option<String>,
    },
    /// Trigger a build, then offer follow-up actions
    Build {
        /// Job name, full name or URL
        #[arg(long)]
        job: Option<String>,
    },
    /// Show a job's status, then offer follow-up actions
    Status {
        /// Job name, full name or URL
        #[arg(long)]
        job: Option<String>,
    },
    /// Validate and lint the built-in flows
    Check,
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_target(false)
        .init();
}

fn open_session(cli: &Cli) -> Result<Session> {
    let config = CliConfig::from_path(&cli.config)
        .with_context(|| format!("Failed to load config from '{}'", cli.config.display()))?;
    let catalog = FlowCatalog::load().context("Built-in flow definitions are invalid")?;
    let run_log = RunLog::new(&config.global.log_dir).context("Failed to initialize run log")?;

    Ok(Session {
        catalog: Arc::new(catalog),
        prompts: Arc::new(TerminalPrompts::stdin()),
        actions: Arc::new(CommandActions::new(&config)),
        run_log: Arc::new(run_log),
        jobs: config.jobs,
        interactive: !cli.non_interactive && std::io::stdin().is_terminal(),
    })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let command = cli
        .command
        .clone()
        .unwrap_or(Command::List { search: None });

    if command == Command::Check {
        return commands::check::run();
    }

    let session = open_session(&cli)?;
    match command {
        Command::List { search } => commands::list::run(&session, search.as_deref()).await,
        Command::Build { job } => commands::build::run(&session, job.as_deref()).await,
        Command::Status { job } => commands::status::run(&session, job.as_deref()).await,
        Command::Check => commands::check::run(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Err(err) = dispatch(cli).await {
        print_error(&format!("{err:#}"));
        if err.to_string().contains("Failed to load config") {
            print_hint(&format!(
                "Create {DEFAULT_CONFIG_FILE} or pass --config <path>"
            ));
        }
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_defaults_to_list() {
        let cli = Cli::try_parse_from(["jenkins-flow"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
        assert!(!cli.non_interactive);
    }

    #[test]
    fn test_parse_build_with_job_and_global_flags() {
        let cli = Cli::try_parse_from([
            "jenkins-flow",
            "build",
            "--job",
            "api",
            "--non-interactive",
            "--config",
            "/etc/jf.toml",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Build {
                job: Some("api".to_string())
            })
        );
        assert!(cli.non_interactive);
        assert_eq!(cli.config, PathBuf::from("/etc/jf.toml"));
    }

    #[test]
    fn test_parse_list_search() {
        let cli = Cli::try_parse_from(["jenkins-flow", "list", "--search", "api prod"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::List {
                search: Some("api prod".to_string())
            })
        );
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Cli::try_parse_from(["jenkins-flow", "deploy"]).is_err());
    }

    #[tokio::test]
    async fn test_missing_config_is_an_error() {
        let cli = Cli::try_parse_from([
            "jenkins-flow",
            "--config",
            "/nonexistent/jenkins-flow.toml",
            "list",
        ])
        .unwrap();
        let err = dispatch(cli).await.unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }

    #[tokio::test]
    async fn test_check_needs_no_config() {
        let cli = Cli::try_parse_from(["jenkins-flow", "--config", "/nonexistent.toml", "check"])
            .unwrap();
        assert!(dispatch(cli).await.is_ok());
    }
}
