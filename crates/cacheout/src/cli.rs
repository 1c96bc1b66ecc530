use crate::tracing::TracingFormat;
use cacheout_cache::CACHE_DIR_ENV;
use clap::Parser;
use miette::{Diagnostic, Report};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;
/// Cache I/O, launch or output copy error exit code
pub const EXIT_CACHE: i32 = 3;
/// Exit code used when a failed command reported no code of its own
pub const EXIT_COMMAND_KILLED: i32 = 1;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// CLI or configuration error (exit code 2)
    #[error("CLI/configuration error: {message}")]
    #[diagnostic(code(cacheout::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Declared operation without an implementation (exit code 2)
    #[error("Not Implemented: {operation}")]
    #[diagnostic(code(cacheout::cli::not_implemented))]
    NotImplemented {
        /// The operation that was requested
        operation: String,
        /// Why it is missing
        #[help]
        help: Option<String>,
    },
    /// Error from the cache core; exit code depends on the kind
    #[error(transparent)]
    #[diagnostic(transparent)]
    Cache(#[from] cacheout_cache::Error),
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new configuration error with help text
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a not-implemented error with help text
    #[must_use]
    pub fn not_implemented(operation: impl Into<String>, help: impl Into<String>) -> Self {
        Self::NotImplemented {
            operation: operation.into(),
            help: Some(help.into()),
        }
    }

    /// Whether stdout was closed by its reader mid-output.
    ///
    /// Reported through the exit code only, like any filter in a pipeline.
    #[must_use]
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, Self::Cache(err) if err.is_broken_pipe())
    }
}

/// Map CLI error to appropriate exit code.
///
/// A failed wrapped command passes its own exit code through.
#[must_use]
pub fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. }
        | CliError::NotImplemented { .. }
        | CliError::Cache(cacheout_cache::Error::Configuration { .. }) => EXIT_CLI,
        CliError::Cache(cacheout_cache::Error::CommandFailed { code, .. }) => code
            .filter(|c| *c != EXIT_OK)
            .unwrap_or(EXIT_COMMAND_KILLED),
        CliError::Cache(_) => EXIT_CACHE,
    }
}

/// Render error to stderr; stdout only ever carries command output
#[allow(clippy::print_stderr)]
pub fn render_error(err: CliError) {
    // Use miette for human-friendly error display
    let report = Report::new(err);
    eprintln!("{report:?}");
    // Ensure output is flushed before potential process exit
    let _ = io::stderr().flush();
}

/// Cache the output of a command and replay it while it is fresh.
///
/// Everything after the first positional argument belongs to the command,
/// including arguments that look like flags.
#[derive(Parser, Debug)]
#[command(name = "cacheout")]
#[command(about = "Cache the output of a command and replay it while it is fresh")]
#[command(long_about = None)]
pub struct Cli {
    /// How long the cache is valid in days.
    #[arg(short = 'V', long, value_name = "DAYS", default_value_t = 1)]
    pub validity: u32,

    /// Sets log level to debug.
    #[arg(short, long)]
    pub debug: bool,

    /// Log output format (logs always go to stderr).
    #[arg(long, value_enum, default_value_t = TracingFormat::Compact)]
    pub log_format: TracingFormat,

    /// Directory holding the cached results.
    #[arg(long, env = CACHE_DIR_ENV, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Delete all the cached results.
    #[arg(short = 'D', long)]
    pub delete_all: bool,

    /// Show where the cached results are stored.
    #[arg(short = 'C', long)]
    pub cache_path: bool,

    /// List all cached results.
    #[arg(short, long)]
    pub list: bool,

    /// Re-run every cached command (not implemented).
    #[arg(short, long)]
    pub recache: bool,

    /// The command to run, joined with single spaces.
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

impl Cli {
    /// The command line to cache, exactly as it is keyed
    #[must_use]
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

/// Parse CLI arguments from the process environment
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
