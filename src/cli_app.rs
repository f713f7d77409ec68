//! Top-level CLI definition and session setup.

use std::io::{self, IsTerminal};
use std::sync::Arc;

use clap::Parser;
use colored::{Colorize, control};
use thiserror::Error;

use lambda_log_viewer::core::config::Config;
use lambda_log_viewer::core::errors::LlvError;
use lambda_log_viewer::logger::ActivityLog;
use lambda_log_viewer::logger::jsonl::{EventType, LogEntry, Severity};
use lambda_log_viewer::source::aws_cli::AwsCliBackend;
use lambda_log_viewer::source::startup_entities;
use lambda_log_viewer::tui::{DashboardRuntimeConfig, RefreshContext, run_dashboard};

/// Terminal dashboard for AWS Lambda functions and their CloudWatch logs.
///
/// Configuration is read from `$LLV_CONFIG` or `~/.config/llv/config.toml`;
/// `LLV_*` environment variables override individual settings.
#[derive(Debug, Parser)]
#[command(name = "llv", version, about, long_about = None)]
pub struct Cli {
    /// Only list functions whose name contains this text (case-sensitive).
    #[arg(value_name = "FILTER")]
    filter: Option<String>,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input or configuration.
    #[error("{0}")]
    User(String),
    /// Backend or terminal failure.
    #[error("{0}")]
    Runtime(String),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) => 2,
            Self::Internal(_) => 3,
        }
    }
}

impl From<LlvError> for CliError {
    fn from(err: LlvError) -> Self {
        match err {
            LlvError::InvalidConfig { .. }
            | LlvError::MissingConfig { .. }
            | LlvError::ConfigParse { .. } => Self::User(err.to_string()),
            LlvError::Serialization { .. } | LlvError::ChannelClosed { .. } => {
                Self::Internal(err.to_string())
            }
            LlvError::SourceUnavailable { .. }
            | LlvError::MalformedResponse { .. }
            | LlvError::Io { .. }
            | LlvError::Runtime { .. } => Self::Runtime(err.to_string()),
        }
    }
}

/// Load configuration, verify the backend, and run the dashboard until quit.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    let config = Config::load_from_env()?;
    let log = ActivityLog::open(&config);
    log.record(
        &LogEntry::info(EventType::SessionStart)
            .with_details(format!("llv {}", env!("CARGO_PKG_VERSION"))),
    );

    let backend = Arc::new(AwsCliBackend::new(&config.aws));
    let entities = match startup_entities(
        backend.as_ref(),
        backend.as_ref(),
        cli.filter.as_deref(),
    ) {
        Ok(entities) => entities,
        Err(err) => {
            log.record(&LogEntry::new(EventType::SetupFailed, Severity::Error).with_llv_error(&err));
            return Err(err.into());
        }
    };

    let mut loaded = LogEntry::info(EventType::EntitiesLoaded).with_counts(None, entities.len());
    if let Some(filter) = &cli.filter {
        loaded = loaded.with_details(format!("filter {filter:?}"));
    }
    log.record(&loaded);

    let context = RefreshContext::new(backend.clone(), backend);
    let result = run_dashboard(
        DashboardRuntimeConfig::new(entities, &config.dashboard),
        context,
        &log,
    );

    let mut stop = LogEntry::info(EventType::SessionStop);
    if let Err(err) = &result {
        stop = LogEntry::new(EventType::SessionStop, Severity::Error).with_llv_error(err);
    }
    log.record(&stop);

    result.map_err(CliError::from)
}

/// Print a fatal error to stderr, red when stderr is a terminal.
pub fn print_error(err: &CliError) {
    if !io::stderr().is_terminal() {
        control::set_override(false);
    }
    eprintln!("{} {err}", "llv:".red().bold());
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn filter_is_optional_positional() {
        let cli = Cli::try_parse_from(["llv"]).unwrap();
        assert_eq!(cli.filter, None);
        let cli = Cli::try_parse_from(["llv", "order"]).unwrap();
        assert_eq!(cli.filter.as_deref(), Some("order"));
    }

    #[test]
    fn flags_are_rejected() {
        assert!(Cli::try_parse_from(["llv", "--region", "eu-west-1"]).is_err());
        assert!(Cli::try_parse_from(["llv", "a", "b"]).is_err());
    }

    #[test]
    fn config_errors_are_user_errors() {
        let err = CliError::from(LlvError::MissingConfig {
            path: PathBuf::from("/nope.toml"),
        });
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn backend_errors_are_runtime_errors() {
        let err = CliError::from(LlvError::source_unavailable("list_entities", "denied"));
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("LLV-2001"));
    }

    #[test]
    fn channel_errors_are_internal() {
        let err = CliError::from(LlvError::ChannelClosed {
            component: "refresh_worker",
        });
        assert_eq!(err.exit_code(), 3);
    }
}
