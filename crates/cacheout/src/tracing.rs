//! Tracing configuration for the cacheout CLI
//!
//! Logs always go to stderr so that stdout carries nothing but the cached or
//! live command output. The subscriber is built from an explicit
//! [`TracingConfig`] and installed by the caller for the duration of one
//! invocation, see [`tracing::subscriber::with_default`].

use crate::cli::{Cli, CliError};
use std::io;
pub use tracing::Level;
use tracing::Subscriber;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Crates whose events are shown
const TARGETS: [&str; 2] = ["cacheout", "cacheout_cache"];

/// Tracing output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TracingFormat {
    /// Pretty-printed human-readable format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
    /// Structured JSON format
    Json,
}

/// Tracing configuration
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Output format
    pub format: TracingFormat,
    /// Level used when neither `filter` nor `RUST_LOG` is set
    pub level: Level,
    /// Explicit filter directives, taking precedence over `RUST_LOG`
    pub filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            format: TracingFormat::Compact,
            level: Level::WARN, // Default to quiet operation
            filter: None,
        }
    }
}

impl TracingConfig {
    /// Configuration selected on the command line.
    ///
    /// `--debug` forces debug level for cacheout's own crates, otherwise
    /// `RUST_LOG` applies when set.
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.log_format,
            level: if cli.debug { Level::DEBUG } else { Level::WARN },
            filter: cli.debug.then(|| directives(Level::DEBUG)),
        }
    }
}

fn directives(level: Level) -> String {
    let level_str = level.as_str().to_ascii_lowercase();
    TARGETS
        .iter()
        .map(|target| format!("{target}={level_str}"))
        .collect::<Vec<_>>()
        .join(",")
}

type FmtLayer = Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

/// Build the subscriber for `config` without installing it
pub fn build_subscriber(
    config: TracingConfig,
) -> Result<impl Subscriber + Send + Sync + 'static, CliError> {
    // Create base filter
    let env_filter = if let Some(filter) = config.filter {
        EnvFilter::try_new(filter)
    } else {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(directives(config.level)))
    }
    .map_err(|e| CliError::config(format!("Failed to create tracing filter: {e}")))?;

    let layer: FmtLayer = match config.format {
        TracingFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(io::stderr)
            .with_target(true)
            .boxed(),
        TracingFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(io::stderr)
            .with_target(false)
            .boxed(),
        TracingFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
    };

    Ok(tracing_subscriber::registry().with(env_filter).with(layer))
}
