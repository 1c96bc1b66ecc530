//! Operations selected by the command line

mod maintenance;
mod run;

use crate::cli::{Cli, CliError};
use cacheout_cache::{CacheStore, Validity};
use std::io::Write;

pub use maintenance::{delete_all, list_all, show_cache_path};
pub use run::run_cached;

/// What a single invocation does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the resolved cache directory
    ShowCachePath,
    /// Re-run every cached command; declared but not implemented
    RecacheAll,
    /// Remove every cached result
    DeleteAll,
    /// List cached results
    ListAll,
    /// Serve or record the output of a command line
    Run {
        /// The command line, arguments joined with single spaces
        command: String,
    },
}

impl Command {
    /// Select the operation. Maintenance flags short-circuit running a
    /// command, in the order cache path, recache, delete, list.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let command = if cli.cache_path {
            Self::ShowCachePath
        } else if cli.recache {
            Self::RecacheAll
        } else if cli.delete_all {
            Self::DeleteAll
        } else if cli.list {
            Self::ListAll
        } else {
            let command = cli.command_line();
            if command.trim().is_empty() {
                return Err(CliError::config_with_help(
                    "No command provided",
                    "Usage: cacheout [OPTIONS] <COMMAND>...",
                ));
            }
            Self::Run { command }
        };
        Ok(command)
    }
}

/// Execute `command` against `store`, writing user-facing output to `out`
pub fn execute(
    command: Command,
    store: &CacheStore,
    validity: Validity,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        Command::ShowCachePath => show_cache_path(store, out),
        Command::RecacheAll => Err(CliError::not_implemented(
            "recache",
            "Cache entries are keyed by a one-way hash, so the commands to re-run are not recorded",
        )),
        Command::DeleteAll => delete_all(store, out),
        Command::ListAll => list_all(store, validity, out),
        Command::Run { command } => run_cached(store, &command, validity, out),
    }
}

/// Run one invocation described by `cli`
pub fn run(cli: &Cli, out: &mut dyn Write) -> Result<(), CliError> {
    let command = Command::from_cli(cli)?;
    let store = CacheStore::locate(cli.cache_dir.clone())?;
    tracing::debug!(?command, root = %store.root().display(), "Dispatching");
    execute(command, &store, Validity::days(cli.validity), out)
}
